//! Option records and the listbox state machine.
//!
//! [`ListboxState`] is a snapshot of every option in a list, read from the
//! element tree. Selection, activation and navigation rules operate on the
//! snapshot only; [`project`] then writes the fields that changed back to the
//! option attributes and the input's active-descendant link. Keeping the two
//! apart lets the rules be tested without a document.

use horizon_combobox_core::{Document, DocumentResult, ElementId, branded_id};
use serde::{Deserialize, Serialize};

use crate::aria;

/// How many options may be selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one selected option.
    #[default]
    Single,
    /// Any subset of enabled options.
    Multiple,
}

/// Navigation direction for [`ListboxState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the list.
    Next,
    /// Towards the start of the list.
    Previous,
}

/// The state of a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionState {
    /// The option element.
    pub element: ElementId,
    /// The `id` attribute; empty until options are initialized.
    pub identifier: String,
    /// Not `disabled` and not `aria-disabled="true"`.
    pub enabled: bool,
    /// Effectively visible in the tree.
    pub visible: bool,
    /// `aria-selected="true"`.
    pub selected: bool,
    /// Carries the highlight marker.
    pub active: bool,
}

impl OptionState {
    /// Read the state of `element` from the tree.
    pub fn read(doc: &Document, element: ElementId) -> DocumentResult<Self> {
        Ok(Self {
            element,
            identifier: doc.attribute(element, aria::ID).unwrap_or_default().to_owned(),
            enabled: is_enabled(doc, element),
            visible: doc.is_effectively_visible(element)?,
            selected: doc.attribute(element, aria::ARIA_SELECTED) == Some(aria::TRUE),
            active: doc.has_attribute(element, aria::DATA_ACTIVE),
        })
    }
}

/// Whether `element` has the option role.
pub fn is_option(doc: &Document, element: ElementId) -> bool {
    doc.attribute(element, aria::ROLE) == Some(aria::ROLE_OPTION)
}

/// Whether `element` is neither `disabled` nor `aria-disabled="true"`.
pub fn is_enabled(doc: &Document, element: ElementId) -> bool {
    !doc.has_attribute(element, aria::DISABLED)
        && doc.attribute(element, aria::ARIA_DISABLED) != Some(aria::TRUE)
}

/// Option elements under `list`, in document order.
pub fn option_elements(doc: &Document, list: ElementId) -> DocumentResult<Vec<ElementId>> {
    doc.query_by_attribute(list, aria::ROLE, aria::ROLE_OPTION)
}

/// The option containing `target` (inclusive), if it lies inside `list`.
pub fn closest_option(
    doc: &Document,
    list: ElementId,
    target: ElementId,
) -> DocumentResult<Option<ElementId>> {
    let option = doc.closest(target, is_option)?;
    Ok(option.filter(|&o| o != list && doc.is_inclusive_ancestor(list, o)))
}

/// The submitted value of an option: its `value` attribute, else its text.
pub fn option_value(doc: &Document, option: ElementId) -> DocumentResult<String> {
    match doc.attribute(option, aria::VALUE) {
        Some(value) => Ok(value.to_owned()),
        None => Ok(doc.text_content(option)?.trim().to_owned()),
    }
}

/// The display label of an option: its `data-label` attribute, else its text.
pub fn option_label(doc: &Document, option: ElementId) -> DocumentResult<String> {
    match doc.attribute(option, aria::DATA_LABEL) {
        Some(label) => Ok(label.to_owned()),
        None => Ok(doc.text_content(option)?.trim().to_owned()),
    }
}

/// Snapshot of every option in a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListboxState {
    options: Vec<OptionState>,
}

impl ListboxState {
    /// Build a state from option records, in list order.
    pub fn new(options: Vec<OptionState>) -> Self {
        Self { options }
    }

    /// Read every option under `list`.
    pub fn read(doc: &Document, list: ElementId) -> DocumentResult<Self> {
        let options = option_elements(doc, list)?
            .into_iter()
            .map(|element| OptionState::read(doc, element))
            .collect::<DocumentResult<Vec<_>>>()?;
        Ok(Self { options })
    }

    /// All options in list order.
    pub fn options(&self) -> &[OptionState] {
        &self.options
    }

    /// The state of `element`, if it is one of the options.
    pub fn get(&self, element: ElementId) -> Option<&OptionState> {
        self.options.iter().find(|o| o.element == element)
    }

    fn get_mut(&mut self, element: ElementId) -> Option<&mut OptionState> {
        self.options.iter_mut().find(|o| o.element == element)
    }

    /// The active option.
    pub fn active(&self) -> Option<&OptionState> {
        self.options.iter().find(|o| o.active)
    }

    /// Options marked selected.
    pub fn selected(&self) -> impl Iterator<Item = &OptionState> {
        self.options.iter().filter(|o| o.selected)
    }

    /// Options eligible for navigation.
    pub fn visible(&self) -> impl Iterator<Item = &OptionState> {
        self.options.iter().filter(|o| o.visible)
    }

    /// Select `element`.
    ///
    /// In single mode every other enabled option is deselected. In multiple
    /// mode only `element` changes, and selecting it is refused when
    /// `max_selected` options are already selected. Returns `false` when
    /// refused or when `element` is not one of the options.
    pub fn select(
        &mut self,
        element: ElementId,
        mode: SelectionMode,
        max_selected: Option<usize>,
    ) -> bool {
        let Some(target) = self.get(element) else {
            return false;
        };

        match mode {
            SelectionMode::Single => {
                for option in &mut self.options {
                    if option.element == element {
                        option.selected = true;
                    } else if option.enabled {
                        option.selected = false;
                    }
                }
            }
            SelectionMode::Multiple => {
                if !target.selected
                    && max_selected.is_some_and(|max| self.selected().count() >= max)
                {
                    return false;
                }
                if let Some(option) = self.get_mut(element) {
                    option.selected = true;
                }
            }
        }
        true
    }

    /// Deselect `element`.
    pub fn deselect(&mut self, element: ElementId) {
        if let Some(option) = self.get_mut(element) {
            option.selected = false;
        }
    }

    /// Deselect every option.
    pub fn deselect_all(&mut self) {
        for option in &mut self.options {
            option.selected = false;
        }
    }

    /// Make `element` the only active option, or clear the highlight for
    /// `None` or an element that is not an option. Returns the active option.
    pub fn activate(&mut self, element: Option<ElementId>) -> Option<ElementId> {
        let target = element.filter(|&e| self.get(e).is_some());
        for option in &mut self.options {
            option.active = Some(option.element) == target;
        }
        target
    }

    /// The option a navigation step in `direction` lands on.
    ///
    /// Only visible options are considered and movement wraps around. With
    /// no visible active option the step lands on the first (next) or last
    /// (previous) visible option.
    pub fn step(&self, direction: Direction) -> Option<ElementId> {
        let visible: Vec<&OptionState> = self.visible().collect();
        if visible.is_empty() {
            return None;
        }

        let last = visible.len() - 1;
        let index = match (visible.iter().position(|o| o.active), direction) {
            (Some(i), Direction::Next) => if i == last { 0 } else { i + 1 },
            (Some(i), Direction::Previous) => if i == 0 { last } else { i - 1 },
            (None, Direction::Next) => 0,
            (None, Direction::Previous) => last,
        };
        Some(visible[index].element)
    }

    /// The first visible option.
    pub fn first_visible(&self) -> Option<ElementId> {
        self.visible().next().map(|o| o.element)
    }

    /// The last visible option.
    pub fn last_visible(&self) -> Option<ElementId> {
        self.visible().last().map(|o| o.element)
    }
}

/// Write the differences between `before` and `after` to the tree.
///
/// `after` must be derived from `before` (same options, same order). Enabled
/// options always end up with an explicit `aria-selected`; an active option
/// without an identifier receives one so the input can reference it.
pub fn project(
    doc: &mut Document,
    input: ElementId,
    before: &ListboxState,
    after: &ListboxState,
) -> DocumentResult<()> {
    let mut active_identifier = None;

    for (old, new) in before.options.iter().zip(&after.options) {
        let element = new.element;
        if !doc.contains(element) {
            continue;
        }

        if old.selected != new.selected
            || (new.enabled && !doc.has_attribute(element, aria::ARIA_SELECTED))
        {
            doc.set_attribute(element, aria::ARIA_SELECTED, aria::bool_value(new.selected))?;
        }

        if old.active != new.active {
            doc.toggle_attribute(element, aria::DATA_ACTIVE, new.active)?;
        }

        if new.active {
            let identifier = if new.identifier.is_empty() {
                let generated = branded_id();
                doc.set_attribute(element, aria::ID, generated.clone())?;
                generated
            } else {
                new.identifier.clone()
            };
            active_identifier = Some(identifier);
        }
    }

    match active_identifier {
        Some(identifier) => {
            doc.set_attribute(input, aria::ARIA_ACTIVEDESCENDANT, identifier)?;
        }
        None => {
            doc.remove_attribute(input, aria::ARIA_ACTIVEDESCENDANT)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn option(n: u64, enabled: bool, visible: bool) -> OptionState {
        OptionState {
            element: ElementId::from(KeyData::from_ffi(n)),
            identifier: format!("opt-{n}"),
            enabled,
            visible,
            selected: false,
            active: false,
        }
    }

    fn element(n: u64) -> ElementId {
        ElementId::from(KeyData::from_ffi(n))
    }

    fn state() -> ListboxState {
        ListboxState::new(vec![
            option(1, true, true),
            option(2, true, false),
            option(3, false, true),
            option(4, true, true),
        ])
    }

    #[test]
    fn test_step_wraps_over_visible_options() {
        let mut state = state();
        assert_eq!(state.step(Direction::Next), Some(element(1)));
        assert_eq!(state.step(Direction::Previous), Some(element(4)));

        state.activate(Some(element(1)));
        assert_eq!(state.step(Direction::Next), Some(element(3)));
        state.activate(Some(element(4)));
        assert_eq!(state.step(Direction::Next), Some(element(1)));
        state.activate(Some(element(1)));
        assert_eq!(state.step(Direction::Previous), Some(element(4)));
    }

    #[test]
    fn test_step_from_hidden_active_restarts() {
        let mut state = state();
        state.activate(Some(element(2)));
        assert_eq!(state.step(Direction::Next), Some(element(1)));
        assert_eq!(state.step(Direction::Previous), Some(element(4)));
    }

    #[test]
    fn test_step_on_empty_list() {
        let state = ListboxState::default();
        assert_eq!(state.step(Direction::Next), None);
        assert_eq!(state.first_visible(), None);
    }

    #[test]
    fn test_single_select_is_exclusive_among_enabled() {
        let mut state = state();
        state.options[2].selected = true; // disabled, stays untouched
        assert!(state.select(element(1), SelectionMode::Single, None));
        assert!(state.select(element(4), SelectionMode::Single, Some(1)));

        let selected: Vec<ElementId> = state.selected().map(|o| o.element).collect();
        assert_eq!(selected, vec![element(3), element(4)]);
    }

    #[test]
    fn test_multiple_select_respects_cap() {
        let mut state = state();
        assert!(state.select(element(1), SelectionMode::Multiple, Some(2)));
        assert!(state.select(element(2), SelectionMode::Multiple, Some(2)));
        assert!(!state.select(element(4), SelectionMode::Multiple, Some(2)));
        // Re-selecting an already selected option is not a new selection.
        assert!(state.select(element(1), SelectionMode::Multiple, Some(2)));
        assert_eq!(state.selected().count(), 2);

        state.deselect(element(1));
        assert!(state.select(element(4), SelectionMode::Multiple, Some(2)));
        state.deselect_all();
        assert_eq!(state.selected().count(), 0);
    }

    #[test]
    fn test_select_unknown_element_is_refused() {
        let mut state = state();
        assert!(!state.select(element(99), SelectionMode::Single, None));
    }

    #[test]
    fn test_activate_keeps_single_active() {
        let mut state = state();
        assert_eq!(state.activate(Some(element(1))), Some(element(1)));
        assert_eq!(state.activate(Some(element(2))), Some(element(2)));
        assert_eq!(state.options().iter().filter(|o| o.active).count(), 1);
        assert_eq!(state.activate(Some(element(99))), None);
        assert!(state.active().is_none());
    }

    #[test]
    fn test_project_writes_changes() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        let list = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        for (el, id) in [(a, "a"), (b, "b")] {
            doc.set_attribute(el, aria::ROLE, aria::ROLE_OPTION).unwrap();
            doc.set_attribute(el, aria::ID, id).unwrap();
            doc.append_child(list, el).unwrap();
        }

        let before = ListboxState::read(&doc, list).unwrap();
        let mut after = before.clone();
        after.select(b, SelectionMode::Single, None);
        after.activate(Some(b));
        project(&mut doc, input, &before, &after).unwrap();

        assert_eq!(doc.attribute(a, aria::ARIA_SELECTED), Some("false"));
        assert_eq!(doc.attribute(b, aria::ARIA_SELECTED), Some("true"));
        assert!(doc.has_attribute(b, aria::DATA_ACTIVE));
        assert_eq!(doc.attribute(input, aria::ARIA_ACTIVEDESCENDANT), Some("b"));

        let before = ListboxState::read(&doc, list).unwrap();
        let mut after = before.clone();
        after.activate(None);
        project(&mut doc, input, &before, &after).unwrap();
        assert!(!doc.has_attribute(b, aria::DATA_ACTIVE));
        assert!(!doc.has_attribute(input, aria::ARIA_ACTIVEDESCENDANT));
    }
}
