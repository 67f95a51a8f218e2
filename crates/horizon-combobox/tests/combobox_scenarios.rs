//! Keyboard, pointer and selection behavior of the combobox engine.

use std::sync::Arc;

use horizon_combobox::{Combobox, ComboboxConfig, CommitEvent, aria};
use horizon_combobox_core::{
    DomEvent, ElementId, Key, KeyboardModifiers, ScrollRequest, SharedDocument,
};
use parking_lot::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    doc: SharedDocument,
    input: ElementId,
    list: ElementId,
    combobox: Combobox,
    commits: Arc<Mutex<Vec<CommitEvent>>>,
}

impl Harness {
    fn new(options: &[(&str, &[(&str, &str)])], config: ComboboxConfig) -> (Self, Vec<ElementId>) {
        init_tracing();
        let doc = SharedDocument::new();
        let input = doc.create_element("input");
        let list = doc.create_element("ul");
        let elements = options
            .iter()
            .map(|(label, attrs)| {
                let mut all = vec![("role", "option")];
                all.extend_from_slice(attrs);
                doc.create_child(list, "li", all, label).unwrap()
            })
            .collect();

        let combobox = Combobox::new(doc.clone(), input, list, config).unwrap();
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = commits.clone();
        combobox
            .committed()
            .connect(move |commit| sink.lock().push(commit.clone()));

        (
            Self {
                doc,
                input,
                list,
                combobox,
                commits,
            },
            elements,
        )
    }

    fn press(&self, key: Key) -> bool {
        self.doc
            .dispatch(&mut DomEvent::key_down(self.input, key, KeyboardModifiers::NONE))
    }

    fn commit_count(&self) -> usize {
        self.commits.lock().len()
    }

    fn selected(&self, option: ElementId) -> bool {
        self.doc.attribute(option, aria::ARIA_SELECTED).as_deref() == Some("true")
    }
}

fn plain(labels: &[&'static str]) -> Vec<(&'static str, &'static [(&'static str, &'static str)])> {
    labels
        .iter()
        .map(|&label| (label, &[] as &[(&str, &str)]))
        .collect()
}

#[test]
fn test_start_assigns_identifiers_and_tabindex() {
    let (h, options) = Harness::new(&plain(&["a", "b", "c"]), ComboboxConfig::new());
    h.combobox.start();

    for option in options {
        let id = h.doc.attribute(option, aria::ID).unwrap();
        assert!(!id.is_empty());
        assert_eq!(h.doc.attribute(option, aria::TABINDEX).as_deref(), Some("-1"));
        assert_eq!(h.doc.attribute(option, aria::ARIA_SELECTED).as_deref(), Some("false"));
    }
    assert_eq!(h.doc.attribute(h.input, aria::ARIA_EXPANDED).as_deref(), Some("true"));

    h.combobox.stop();
    assert_eq!(h.doc.attribute(h.input, aria::ARIA_EXPANDED).as_deref(), Some("false"));
}

#[test]
fn test_arrow_down_full_cycle() {
    let (h, options) = Harness::new(
        &[
            ("a", &[]),
            ("b", &[("hidden", "")]),
            ("c", &[]),
            ("d", &[("aria-disabled", "true")]),
        ],
        ComboboxConfig::new(),
    );
    h.combobox.start();
    h.combobox.activate(Some(options[2]), false);

    let visible = h.combobox.visible_options();
    assert_eq!(visible, vec![options[0], options[2], options[3]]);
    for _ in 0..visible.len() {
        assert!(!h.press(Key::ArrowDown));
        assert_ne!(h.combobox.active_option(), Some(options[1]));
    }
    assert_eq!(h.combobox.active_option(), Some(options[2]));
}

#[test]
fn test_arrow_up_full_cycle() {
    let (h, options) = Harness::new(&plain(&["a", "b", "c"]), ComboboxConfig::new());
    h.combobox.start();

    assert!(!h.press(Key::ArrowUp));
    assert_eq!(h.combobox.active_option(), Some(options[2]));
    for _ in 0..options.len() {
        h.press(Key::ArrowUp);
    }
    assert_eq!(h.combobox.active_option(), Some(options[2]));

    let active_id = h.doc.attribute(options[2], aria::ID);
    assert_eq!(h.doc.attribute(h.input, aria::ARIA_ACTIVEDESCENDANT), active_id);
    assert!(h.doc.has_attribute(options[2], aria::DATA_ACTIVE));
    assert!(!h.doc.has_attribute(options[0], aria::DATA_ACTIVE));
}

#[test]
fn test_scenario_a_disabled_is_activatable_hidden_is_skipped() {
    let (h, options) = Harness::new(
        &[
            ("P1", &[]),
            ("P2", &[("aria-disabled", "true")]),
            ("P3", &[("hidden", "")]),
        ],
        ComboboxConfig::new(),
    );
    h.combobox.start();

    let mut sequence = Vec::new();
    for _ in 0..3 {
        h.press(Key::ArrowDown);
        sequence.push(h.combobox.active_option());
    }
    assert_eq!(
        sequence,
        vec![Some(options[0]), Some(options[1]), Some(options[0])]
    );
}

#[test]
fn test_scenario_b_enter_on_disabled_does_not_commit() {
    let (h, options) = Harness::new(
        &[("P1", &[]), ("P2", &[("disabled", "")]), ("P3", &[("hidden", "")])],
        ComboboxConfig::new(),
    );
    h.combobox.start();
    h.press(Key::ArrowDown);
    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), Some(options[1]));

    h.press(Key::Enter);
    assert_eq!(h.commit_count(), 0);
    assert_eq!(h.combobox.active_option(), Some(options[1]));
    assert!(h.combobox.selected_options().is_empty());
}

#[test]
fn test_scenario_c_multiple_toggles() {
    let (h, options) = Harness::new(
        &plain(&["A", "B"]),
        ComboboxConfig::new().with_multiple(true),
    );
    h.combobox.start();
    let (a, b) = (options[0], options[1]);

    h.doc.dispatch(&mut DomEvent::click(a));
    assert!(h.selected(a));
    assert_eq!(h.commit_count(), 1);

    h.doc.dispatch(&mut DomEvent::click(a));
    assert!(!h.selected(a));
    assert_eq!(h.commit_count(), 2);

    h.doc.dispatch(&mut DomEvent::click(a));
    h.doc.dispatch(&mut DomEvent::click(b));
    assert_eq!(h.combobox.selected_options(), vec![a, b]);

    let commits = h.commits.lock();
    assert!(commits[..3].iter().all(|c| c.option == a));
    assert_eq!(commits[3].option, b);
    assert_eq!(Some(commits[3].identifier.clone()), h.doc.attribute(b, aria::ID));
}

#[test]
fn test_scenario_d_single_select_is_exclusive() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    h.combobox.start();

    assert!(h.combobox.select(options[0]));
    assert!(h.combobox.select(options[1]));
    assert!(!h.selected(options[0]));
    assert!(h.selected(options[1]));
    assert_eq!(h.combobox.selected_options(), vec![options[1]]);
}

#[test]
fn test_scenario_e_mouseover_needs_real_movement() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    h.combobox.start();

    let passed = h.doc.dispatch(&mut DomEvent::mouse_over(options[1]));
    assert!(!passed);
    assert_eq!(h.combobox.active_option(), None);

    h.doc.dispatch(&mut DomEvent::mouse_move(options[1]));
    assert!(h.doc.dispatch(&mut DomEvent::mouse_over(options[1])));
    assert_eq!(h.combobox.active_option(), Some(options[1]));

    // Keyboard input resets the flag.
    h.press(Key::ArrowDown);
    assert!(!h.doc.dispatch(&mut DomEvent::mouse_over(options[1])));
    assert_eq!(h.combobox.active_option(), Some(options[0]));
}

#[test]
fn test_multiple_select_only_touches_target() {
    let (h, options) = Harness::new(
        &plain(&["A", "B", "C"]),
        ComboboxConfig::new().with_multiple(true),
    );
    h.combobox.start();

    h.combobox.select(options[0]);
    h.combobox.select(options[2]);
    h.combobox.deselect(options[0]);
    assert!(!h.selected(options[0]));
    assert!(!h.selected(options[1]));
    assert!(h.selected(options[2]));
}

#[test]
fn test_multiple_cap_rejects_extra_selection() {
    let (h, options) = Harness::new(
        &plain(&["A", "B", "C"]),
        ComboboxConfig::new().with_multiple(true).with_max_selected(2),
    );
    h.combobox.start();

    h.doc.dispatch(&mut DomEvent::click(options[0]));
    h.doc.dispatch(&mut DomEvent::click(options[1]));
    h.doc.dispatch(&mut DomEvent::click(options[2]));
    assert_eq!(h.combobox.selected_options(), vec![options[0], options[1]]);
    assert_eq!(h.commit_count(), 2);

    // Deselecting below the cap is always allowed.
    h.doc.dispatch(&mut DomEvent::click(options[0]));
    assert_eq!(h.commit_count(), 3);
    assert!(h.combobox.select(options[2]));
}

#[test]
fn test_commit_once_per_enter_and_tab() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    h.combobox.start();

    h.press(Key::ArrowDown);
    assert!(!h.press(Key::Enter));
    assert_eq!(h.commit_count(), 1);

    h.press(Key::ArrowDown);
    assert!(!h.press(Key::Tab));
    assert_eq!(h.commit_count(), 2);
    assert_eq!(h.combobox.selected_options(), vec![options[1]]);

    // Escape drops the highlight but keeps the selection and the open list.
    h.press(Key::Escape);
    assert_eq!(h.combobox.active_option(), None);
    assert_eq!(h.combobox.selected_options(), vec![options[1]]);
    assert_eq!(
        h.doc.attribute(h.input, aria::ARIA_EXPANDED).as_deref(),
        Some("true")
    );

    // Nothing active: Enter passes through.
    assert!(h.press(Key::Enter));
    assert_eq!(h.commit_count(), 2);
}

#[test]
fn test_enter_on_hidden_highlight_passes_through() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    h.combobox.start();

    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), Some(options[0]));
    h.doc.set_attribute(options[0], "hidden", "").unwrap();

    assert!(h.press(Key::Enter));
    assert!(h.press(Key::Tab));
    assert_eq!(h.commit_count(), 0);
    assert!(!h.selected(options[0]));
}

#[test]
fn test_click_on_disabled_never_commits() {
    let (h, options) = Harness::new(
        &[("A", &[("aria-disabled", "true")]), ("B", &[])],
        ComboboxConfig::new(),
    );
    h.combobox.start();

    h.doc.dispatch(&mut DomEvent::click(options[0]));
    assert_eq!(h.commit_count(), 0);
    assert!(!h.doc.has_attribute(options[0], aria::ARIA_SELECTED));
}

#[test]
fn test_click_inside_option_resolves_to_option() {
    let (h, options) = Harness::new(&plain(&["A"]), ComboboxConfig::new());
    let icon = h.doc.create_child(options[0], "span", [], "*").unwrap();
    h.combobox.start();

    h.doc.dispatch(&mut DomEvent::click(icon));
    assert_eq!(h.commit_count(), 1);
    assert!(h.selected(options[0]));

    // Clicking the list itself is not an option.
    h.doc.dispatch(&mut DomEvent::click(h.list));
    assert_eq!(h.commit_count(), 1);
}

#[test]
fn test_stop_start_does_not_double_fire() {
    let (h, options) = Harness::new(&plain(&["A", "B", "C"]), ComboboxConfig::new());
    h.combobox.start();
    h.combobox.stop();

    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), None);

    h.combobox.start();
    h.combobox.start();
    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), Some(options[0]));
    h.press(Key::Enter);
    assert_eq!(h.commit_count(), 1);
}

#[test]
fn test_scroll_requested_for_keyboard_navigation_only() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    let requests: Arc<Mutex<Vec<ScrollRequest>>> = Arc::default();
    let sink = requests.clone();
    h.doc
        .scroll_requested()
        .connect(move |request| sink.lock().push(*request));
    h.combobox.start();

    h.press(Key::ArrowDown);
    h.doc.dispatch(&mut DomEvent::mouse_move(options[1]));
    h.combobox.activate(Some(options[0]), false);

    let requests = requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].element, options[0]);
}

#[test]
fn test_options_replaced_while_started() {
    let (h, options) = Harness::new(&plain(&["A", "B"]), ComboboxConfig::new());
    h.combobox.start();
    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), Some(options[0]));

    let fresh = h.doc.create_element("li");
    h.doc.set_attribute(fresh, aria::ROLE, aria::ROLE_OPTION).unwrap();
    h.doc.set_text(fresh, "C").unwrap();
    h.doc.replace_children(h.list, &[fresh]).unwrap();
    h.combobox.initialize_options(&[]);

    assert_eq!(h.combobox.options(), vec![fresh]);
    assert_eq!(h.combobox.active_option(), None);
    h.press(Key::ArrowDown);
    assert_eq!(h.combobox.active_option(), Some(fresh));
}
