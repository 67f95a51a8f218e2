//! Autocomplete widget built on the combobox engine.
//!
//! [`AutoComplete`] wraps a container element holding a text input, a list
//! of options and an optional clear button (`[data-clear]`). It opens and
//! closes the list, filters or fetches options as the user types, and turns
//! engine commits into a selected value through a [`Selection`] variant.
//!
//! # Events
//!
//! Everything the widget does is announced on [`AutoComplete::events`]:
//!
//! | Event | When |
//! |-------|------|
//! | `Show` / `Shown` | Before / after the list opens |
//! | `Hide` / `Hidden` | Before / after the list closes |
//! | `Select` / `Deselect` | A value was added / removed by a commit |
//! | `Commit` | After every commit of an enabled option |
//! | `Clear` | The clear button was pressed |
//! | `LoadStart` / `Success` / `Error` / `LoadEnd` | Option source lifecycle |
//!
//! # Typing
//!
//! `input` events are debounced by [`AutoCompleteConfig::input_debounce_ms`].
//! The host polls [`AutoComplete::time_until_next`] and calls
//! [`AutoComplete::process_timers`] once it elapses; a zero delay filters on
//! every event.
//!
//! # Example
//!
//! ```
//! use horizon_combobox::{AutoComplete, AutoCompleteConfig, AutoCompleteEvent};
//! use horizon_combobox_core::{DomEvent, SharedDocument};
//!
//! let doc = SharedDocument::new();
//! let container = doc.create_element("auto-complete");
//! let input = doc.create_child(container, "input", [], "").unwrap();
//! let list = doc.create_child(container, "ul", [], "").unwrap();
//! for fruit in ["Apple", "Banana"] {
//!     doc.create_child(list, "li", [("role", "option")], fruit).unwrap();
//! }
//!
//! let autocomplete = AutoComplete::new(doc.clone(), container, input, list, AutoCompleteConfig::new()).unwrap();
//! autocomplete.events().connect(|event| {
//!     if let AutoCompleteEvent::Commit(detail) = event {
//!         println!("picked {}", detail.value);
//!     }
//! });
//!
//! doc.set_value(input, "ban").unwrap();
//! doc.dispatch(&mut DomEvent::input(input));
//! assert!(!autocomplete.is_open());
//! assert!(autocomplete.time_until_next().is_some());
//!
//! autocomplete.flush_input();
//! assert!(autocomplete.is_open());
//! assert_eq!(autocomplete.visible_options().len(), 1);
//! ```

mod multi;
mod selection;
mod single;
mod source;
mod value;

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use horizon_combobox_core::logging::targets;
use horizon_combobox_core::{
    ConnectionGuard, DomEvent, ElementId, EventKind, Key, ListenerId, PerfSpan, SharedDocument,
    Signal, TimerId, TimerQueue, branded_id,
};
use parking_lot::Mutex;

pub use multi::MultiSelection;
pub use selection::{CommitOutcome, FollowUp, Selection, SelectionContext};
pub use single::SingleSelection;
pub use source::{OptionSource, OptionSpec, StaticOptionSource};
pub use value::{SetValue, decode_values, encode_values};

use crate::aria;
use crate::combobox::{Combobox, CommitEvent};
use crate::config::AutoCompleteConfig;
use crate::error::Result;
use crate::option;

/// Payload of commit, select and deselect events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetail {
    /// The committed option element.
    pub option: ElementId,
    /// Its value (`value` attribute or text).
    pub value: String,
    /// Its label (`data-label` attribute or text).
    pub label: String,
}

/// Events emitted by [`AutoComplete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCompleteEvent {
    Show,
    Shown,
    Hide,
    Hidden,
    Commit(CommitDetail),
    Select(CommitDetail),
    Deselect(CommitDetail),
    Clear,
    LoadStart,
    Success,
    /// The option source failed; carries the error message.
    Error(String),
    LoadEnd,
}

#[derive(Debug)]
struct FetchState {
    /// Query of the last fetch; `None` after the list closes.
    current_query: Option<String>,
    /// Whether opening the list should fetch with an empty query.
    should_fetch: bool,
}

/// Typed query waiting for its debounce timer.
#[derive(Debug, Default)]
struct InputDebounce {
    timers: TimerQueue,
    pending: Option<(TimerId, String)>,
}

impl InputDebounce {
    fn cancel(&mut self) -> Option<String> {
        let (id, query) = self.pending.take()?;
        self.timers.cancel(id);
        Some(query)
    }
}

struct AutoCompleteInner {
    doc: SharedDocument,
    container: ElementId,
    input: ElementId,
    list: ElementId,
    clear_button: Option<ElementId>,
    config: AutoCompleteConfig,
    combobox: Combobox,
    source: Option<Arc<dyn OptionSource>>,
    selection: Mutex<Box<dyn Selection>>,
    fetch: Mutex<FetchState>,
    debounce: Mutex<InputDebounce>,
    listeners: Mutex<Vec<ListenerId>>,
    commit_connection: Mutex<Option<ConnectionGuard<CommitEvent>>>,
    events: Signal<AutoCompleteEvent>,
}

impl Drop for AutoCompleteInner {
    fn drop(&mut self) {
        let listeners = std::mem::take(self.listeners.get_mut());
        self.doc.with_write(|d| {
            for id in listeners {
                d.remove_listener(id);
            }
        });
    }
}

/// The autocomplete widget.
///
/// Cloning yields another handle to the same widget.
#[derive(Clone)]
pub struct AutoComplete {
    inner: Arc<AutoCompleteInner>,
}

impl AutoComplete {
    /// Create a widget that filters the options already in `list`.
    pub fn new(
        doc: SharedDocument,
        container: ElementId,
        input: ElementId,
        list: ElementId,
        config: AutoCompleteConfig,
    ) -> Result<Self> {
        Self::build(doc, container, input, list, config, None)
    }

    /// Create a widget whose options come from `source`.
    pub fn with_source(
        doc: SharedDocument,
        container: ElementId,
        input: ElementId,
        list: ElementId,
        config: AutoCompleteConfig,
        source: impl OptionSource + 'static,
    ) -> Result<Self> {
        let source: Arc<dyn OptionSource> = Arc::new(source);
        Self::build(doc, container, input, list, config, Some(source))
    }

    fn build(
        doc: SharedDocument,
        container: ElementId,
        input: ElementId,
        list: ElementId,
        config: AutoCompleteConfig,
        source: Option<Arc<dyn OptionSource>>,
    ) -> Result<Self> {
        let combobox = Combobox::new(doc.clone(), input, list, config.combobox())?;
        let selection: Box<dyn Selection> = if config.multiple {
            Box::new(MultiSelection::new())
        } else {
            Box::new(SingleSelection::new())
        };

        let clear_button = doc.with_read(|d| {
            d.descendants(container).map(|ids| {
                ids.into_iter()
                    .find(|&id| d.has_attribute(id, aria::DATA_CLEAR))
            })
        })?;

        let inner = Arc::new(AutoCompleteInner {
            doc: doc.clone(),
            container,
            input,
            list,
            clear_button,
            config,
            combobox,
            source,
            selection: Mutex::new(selection),
            fetch: Mutex::new(FetchState {
                current_query: None,
                should_fetch: true,
            }),
            debounce: Mutex::new(InputDebounce::default()),
            listeners: Mutex::new(Vec::new()),
            commit_connection: Mutex::new(None),
            events: Signal::new(),
        });

        inner.with_selection(|selection, ctx| selection.initialize(ctx))?;

        let open = doc.has_attribute(container, aria::OPEN);
        doc.with_write(|d| -> Result<()> {
            d.set_attribute(list, aria::HIDDEN, "")?;
            d.remove_attribute(container, aria::OPEN)?;
            d.set_attribute(input, aria::SPELLCHECK, aria::FALSE)?;
            d.set_attribute(input, aria::AUTOCOMPLETE, "off")?;
            d.set_attribute(list, aria::TABINDEX, "-1")?;
            d.set_attribute(list, aria::ARIA_ORIENTATION, "vertical")?;
            if let Some(button) = clear_button
                && !d.has_attribute(button, aria::ARIA_LABEL)
            {
                d.set_attribute(button, aria::ARIA_LABEL, "Clear autocomplete")?;
            }
            Ok(())
        })?;

        inner.attach(Arc::downgrade(&inner))?;

        tracing::debug!(
            target: targets::AUTOCOMPLETE,
            ?container,
            multiple = inner.config.multiple,
            remote = inner.source.is_some(),
            "autocomplete created"
        );

        let autocomplete = Self { inner };
        if open {
            autocomplete.show_list()?;
        }
        Ok(autocomplete)
    }

    // =========================================================================
    // Open state
    // =========================================================================

    /// Open the list. Does nothing if it is already open.
    pub fn show_list(&self) -> Result<()> {
        self.inner.show_list()
    }

    /// Close the list. Does nothing if it is already closed.
    pub fn hide_list(&self) -> Result<()> {
        self.inner.hide_list()
    }

    /// Open or close the list.
    pub fn set_open(&self, open: bool) -> Result<()> {
        self.inner.set_open(open)
    }

    /// Whether the list is open.
    pub fn is_open(&self) -> bool {
        self.inner.doc.has_attribute(self.inner.container, aria::OPEN)
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// Replace (single) or extend (multiple) the selected value.
    ///
    /// An empty slice clears the value. While the list is open the matching
    /// options are selected immediately.
    pub fn set_value(&self, values: &[SetValue]) -> Result<()> {
        let inner = &self.inner;
        inner.with_selection(|selection, ctx| selection.set_value(ctx, values))?;
        if !self.is_open() {
            return Ok(());
        }

        if values.is_empty() {
            inner.combobox.deselect_all();
            return Ok(());
        }
        for option in inner.combobox.options() {
            let value = inner.option_value(option);
            if values.iter().any(|v| v.value == value) {
                inner.combobox.select(option);
            }
        }
        Ok(())
    }

    /// Remove `value` from the selection and deselect its option.
    pub fn remove_value(&self, value: &str) -> Result<()> {
        let inner = &self.inner;
        inner.with_selection(|selection, ctx| selection.remove_value(ctx, value))?;
        if let Some(option) = inner
            .combobox
            .options()
            .into_iter()
            .find(|&o| inner.option_value(o) == value)
        {
            inner.combobox.deselect(option);
        }
        Ok(())
    }

    /// The selected value(s).
    pub fn values(&self) -> Vec<String> {
        self.inner.with_selection(|selection, ctx| selection.values(ctx))
    }

    /// Forget the query, clear the value and close the list.
    pub fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    /// Close the list, clear the value and detach every listener.
    pub fn destroy(&self) -> Result<()> {
        let inner = &self.inner;
        inner.debounce.lock().cancel();
        inner.hide_list()?;
        inner.with_selection(|selection, ctx| selection.destroy(ctx))?;
        inner.detach();
        tracing::debug!(target: targets::AUTOCOMPLETE, container = ?inner.container, "autocomplete destroyed");
        Ok(())
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Highlight `option`, optionally scrolling it into view.
    pub fn activate(&self, option: ElementId, scroll: bool) {
        self.inner.combobox.activate(Some(option), scroll);
    }

    /// Clear the highlight.
    pub fn deactivate(&self) {
        self.inner.combobox.deactivate();
    }

    /// All options in list order.
    pub fn options(&self) -> Vec<ElementId> {
        self.inner.combobox.options()
    }

    /// Options without their own `hidden` attribute.
    pub fn visible_options(&self) -> Vec<ElementId> {
        self.inner.visible_options()
    }

    /// The highlighted option.
    pub fn active_option(&self) -> Option<ElementId> {
        self.inner.combobox.active_option()
    }

    /// Filter or fetch options for `query`.
    ///
    /// Skipped when `query` equals the last fetched query. Source failures
    /// are reported through [`AutoCompleteEvent::Error`] and returned.
    pub fn fetch_options(&self, query: &str) -> Result<()> {
        self.inner.fetch_options(query)
    }

    // =========================================================================
    // Input debounce
    // =========================================================================

    /// How long the host may wait before calling
    /// [`process_timers`](Self::process_timers); `None` when no typed query is
    /// waiting.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.debounce.lock().timers.time_until_next()
    }

    /// Run the typed query if its debounce delay has passed. Returns whether
    /// it ran.
    pub fn process_timers(&self) -> bool {
        self.inner.process_timers_at(Instant::now())
    }

    /// Run the typed query now, without waiting for the delay. Returns
    /// whether one was waiting.
    pub fn flush_input(&self) -> bool {
        let Some(query) = self.inner.debounce.lock().cancel() else {
            return false;
        };
        self.inner.run_input(&query);
        true
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The underlying engine.
    pub fn combobox(&self) -> &Combobox {
        &self.inner.combobox
    }

    /// The container element.
    pub fn container(&self) -> ElementId {
        self.inner.container
    }

    /// The clear button, if the container has one.
    pub fn clear_button(&self) -> Option<ElementId> {
        self.inner.clear_button
    }

    /// The widget configuration.
    pub fn config(&self) -> &AutoCompleteConfig {
        &self.inner.config
    }

    /// Signal carrying every [`AutoCompleteEvent`].
    pub fn events(&self) -> &Signal<AutoCompleteEvent> {
        &self.inner.events
    }
}

impl std::fmt::Debug for AutoComplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoComplete")
            .field("container", &self.inner.container)
            .field("combobox", &self.inner.combobox)
            .field("open", &self.is_open())
            .finish()
    }
}

impl AutoCompleteInner {
    fn attach(&self, weak: Weak<AutoCompleteInner>) -> Result<()> {
        let mut handlers: Vec<(ElementId, EventKind, fn(&AutoCompleteInner, &mut DomEvent))> = vec![
            (self.input, EventKind::KeyDown, AutoCompleteInner::on_key_down),
            (self.input, EventKind::MouseDown, AutoCompleteInner::on_mouse_down),
            (self.input, EventKind::Input, AutoCompleteInner::on_input),
            (self.input, EventKind::Blur, AutoCompleteInner::on_blur),
        ];
        if let Some(button) = self.clear_button {
            handlers.push((button, EventKind::Click, AutoCompleteInner::on_clear));
        }

        let mut listeners = self.listeners.lock();
        for (element, kind, handler) in handlers {
            let weak = weak.clone();
            let id = self.doc.add_listener(element, kind, move |event| {
                if let Some(inner) = weak.upgrade() {
                    handler(&inner, event);
                }
            })?;
            listeners.push(id);
        }

        let guard = self.combobox.committed().connect_scoped(move |commit: &CommitEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.on_commit(commit.option);
            }
        });
        *self.commit_connection.lock() = Some(guard);
        Ok(())
    }

    fn detach(&self) {
        let listeners = std::mem::take(&mut *self.listeners.lock());
        self.doc.with_write(|d| {
            for id in listeners {
                d.remove_listener(id);
            }
        });
        self.commit_connection.lock().take();
    }

    fn with_selection<R>(
        &self,
        f: impl FnOnce(&mut dyn Selection, &SelectionContext<'_>) -> R,
    ) -> R {
        let ctx = SelectionContext {
            doc: &self.doc,
            container: self.container,
            input: self.input,
            combobox: &self.combobox,
            name: self.config.name.as_deref(),
        };
        let mut selection = self.selection.lock();
        f(&mut **selection, &ctx)
    }

    fn option_value(&self, option: ElementId) -> String {
        self.doc
            .with_read(|d| option::option_value(d, option))
            .unwrap_or_default()
    }

    fn visible_options(&self) -> Vec<ElementId> {
        self.doc.with_read(|d| {
            self.combobox
                .options()
                .into_iter()
                .filter(|&o| !d.has_attribute(o, aria::HIDDEN))
                .collect()
        })
    }

    fn is_list_hidden(&self) -> bool {
        self.doc.has_attribute(self.list, aria::HIDDEN)
    }

    fn set_open(&self, open: bool) -> Result<()> {
        if open { self.show_list() } else { self.hide_list() }
    }

    fn show_list(&self) -> Result<()> {
        if !self.is_list_hidden() {
            return Ok(());
        }

        self.events.emit(AutoCompleteEvent::Show);
        self.combobox.start();
        let should_fetch = self.fetch.lock().should_fetch;
        if should_fetch && let Err(err) = self.fetch_options("") {
            tracing::debug!(target: targets::AUTOCOMPLETE, %err, "opening with stale options");
        }
        self.with_selection(|selection, ctx| selection.connect(ctx))?;
        self.doc.remove_attribute(self.list, aria::HIDDEN)?;
        self.doc.set_attribute(self.container, aria::OPEN, "")?;

        if let Some(option) = self.with_selection(|selection, ctx| selection.first_active_option(ctx)) {
            self.combobox.activate(Some(option), true);
        }
        tracing::debug!(target: targets::AUTOCOMPLETE, container = ?self.container, "list shown");
        self.events.emit(AutoCompleteEvent::Shown);
        Ok(())
    }

    fn hide_list(&self) -> Result<()> {
        if self.is_list_hidden() {
            return Ok(());
        }

        self.events.emit(AutoCompleteEvent::Hide);
        {
            let mut fetch = self.fetch.lock();
            fetch.should_fetch = true;
            fetch.current_query = None;
        }
        self.combobox.stop();
        self.doc.remove_attribute(self.list, aria::DATA_EMPTY)?;
        self.with_selection(|selection, ctx| selection.disconnect(ctx))?;
        self.doc.set_attribute(self.list, aria::HIDDEN, "")?;
        self.doc.remove_attribute(self.container, aria::OPEN)?;
        tracing::debug!(target: targets::AUTOCOMPLETE, container = ?self.container, "list hidden");
        self.events.emit(AutoCompleteEvent::Hidden);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.fetch.lock().current_query = None;
        self.with_selection(|selection, ctx| selection.destroy(ctx))?;
        self.hide_list()
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    fn fetch_options(&self, query: &str) -> Result<()> {
        {
            let mut fetch = self.fetch.lock();
            if fetch.current_query.as_deref() == Some(query) {
                return Ok(());
            }
            fetch.current_query = Some(query.to_owned());
            fetch.should_fetch = false;
        }

        match &self.source {
            None => {
                self.filter_options(query)?;
                self.update_empty()?;
                self.with_selection(|selection, ctx| selection.connect(ctx))
            }
            Some(source) => self.fetch_from_source(source.as_ref(), query),
        }
    }

    fn filter_options(&self, query: &str) -> Result<()> {
        let query = query.to_lowercase();
        let attribute = self.config.filter_attribute.as_str();
        self.doc.with_write(|d| -> Result<()> {
            for option in option::option_elements(d, self.list)? {
                let hidden = if query.is_empty() {
                    false
                } else {
                    let text = match d.attribute(option, attribute) {
                        Some(label) if !label.is_empty() => label.to_owned(),
                        _ => d.text_content(option)?,
                    };
                    !text.to_lowercase().contains(&query)
                };
                d.toggle_attribute(option, aria::HIDDEN, hidden)?;
            }
            Ok(())
        })?;
        tracing::trace!(target: targets::AUTOCOMPLETE, %query, "options filtered");
        Ok(())
    }

    fn fetch_from_source(&self, source: &dyn OptionSource, query: &str) -> Result<()> {
        self.doc.set_attribute(self.container, aria::LOADING, "")?;
        self.events.emit(AutoCompleteEvent::LoadStart);

        let fetched = {
            let _span = PerfSpan::new("fetch_options");
            source.fetch(query)
        };

        match fetched.and_then(|specs| self.populate(&specs).map(|()| specs.len())) {
            Ok(count) => {
                self.update_empty()?;
                self.combobox.initialize_options(&[]);
                self.with_selection(|selection, ctx| selection.connect(ctx))?;
                self.doc.remove_attribute(self.container, aria::LOADING)?;
                tracing::debug!(target: targets::AUTOCOMPLETE, %query, count, "options fetched");
                self.events.emit(AutoCompleteEvent::Success);
                self.events.emit(AutoCompleteEvent::LoadEnd);
                Ok(())
            }
            Err(err) => {
                self.doc.remove_attribute(self.container, aria::LOADING)?;
                tracing::warn!(target: targets::AUTOCOMPLETE, %query, %err, "option source failed");
                self.events.emit(AutoCompleteEvent::Error(err.to_string()));
                self.events.emit(AutoCompleteEvent::LoadEnd);
                Err(err)
            }
        }
    }

    /// Replace the list children with elements built from `specs`.
    fn populate(&self, specs: &[OptionSpec]) -> Result<()> {
        self.combobox.deactivate();
        self.doc.with_write(|d| -> Result<()> {
            let mut children = Vec::with_capacity(specs.len());
            for spec in specs {
                let element = d.create_element("li");
                let id = spec.id.clone().unwrap_or_else(branded_id);
                d.set_attribute(element, aria::ROLE, aria::ROLE_OPTION)?;
                d.set_attribute(element, aria::ID, id)?;
                d.set_attribute(element, aria::DATA_LABEL, spec.label.as_str())?;
                if let Some(value) = &spec.value {
                    d.set_attribute(element, aria::VALUE, value.as_str())?;
                }
                if spec.disabled {
                    d.set_attribute(element, aria::ARIA_DISABLED, aria::TRUE)?;
                }
                d.set_text(element, spec.label.as_str())?;
                children.push(element);
            }
            d.replace_children(self.list, &children)?;
            Ok(())
        })
    }

    fn update_empty(&self) -> Result<()> {
        let empty = self.visible_options().is_empty();
        self.doc
            .with_write(|d| d.toggle_attribute(self.list, aria::DATA_EMPTY, empty))?;
        Ok(())
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    fn on_key_down(&self, event: &mut DomEvent) {
        self.fetch.lock().should_fetch = true;

        let Some((key, modifiers)) = event.key() else {
            return;
        };
        let open = !self.is_list_hidden();
        let change = match key {
            Key::Escape if open => Some(false),
            Key::ArrowDown if modifiers.alt && !open => Some(true),
            Key::ArrowUp if modifiers.alt && open => Some(false),
            _ => None,
        };
        let Some(change) = change else {
            return;
        };

        event.prevent_default();
        event.stop_propagation();
        self.report(self.set_open(change));
    }

    fn on_mouse_down(&self, _event: &mut DomEvent) {
        self.report(self.show_list());
    }

    fn on_input(&self, _event: &mut DomEvent) {
        let query = self.doc.value(self.input).unwrap_or_default();
        let delay = self.config.input_debounce();
        if delay.is_zero() {
            self.run_input(&query);
            return;
        }

        let mut debounce = self.debounce.lock();
        debounce.cancel();
        let id = debounce.timers.start(delay);
        debounce.pending = Some((id, query));
        tracing::trace!(target: targets::AUTOCOMPLETE, ?delay, "input debounced");
    }

    fn process_timers_at(&self, now: Instant) -> bool {
        let query = {
            let mut debounce = self.debounce.lock();
            let fired = debounce.timers.expire_at(now);
            match debounce.pending.take() {
                Some((id, query)) if fired.contains(&id) => Some(query),
                waiting => {
                    debounce.pending = waiting;
                    None
                }
            }
        };
        let Some(query) = query else {
            return false;
        };
        self.run_input(&query);
        true
    }

    fn run_input(&self, query: &str) {
        if let Err(err) = self.fetch_options(query.trim()) {
            tracing::debug!(target: targets::AUTOCOMPLETE, %err, "fetch on input failed");
        }
        if let Some(&first) = self.visible_options().first() {
            self.combobox.activate(Some(first), false);
        }
        self.report(self.show_list());
    }

    fn on_blur(&self, event: &mut DomEvent) {
        let Some(related) = event.related_target() else {
            self.report(self.hide_list());
            return;
        };

        let in_listbox = self
            .doc
            .with_read(|d| {
                d.closest(related, |d, id| {
                    d.attribute(id, aria::ROLE) == Some(aria::ROLE_LISTBOX)
                })
            })
            .ok()
            .flatten()
            .is_some();
        if in_listbox {
            if let Err(err) = self.doc.focus(self.input) {
                tracing::debug!(target: targets::AUTOCOMPLETE, %err, "could not refocus input");
            }
        } else {
            self.report(self.hide_list());
        }
    }

    fn on_clear(&self, event: &mut DomEvent) {
        event.prevent_default();
        self.report(self.clear());
        if let Err(err) = self.doc.focus(self.input) {
            tracing::debug!(target: targets::AUTOCOMPLETE, %err, "could not focus input");
        }
        self.events.emit(AutoCompleteEvent::Clear);
    }

    fn on_commit(&self, option: ElementId) {
        let enabled = self
            .doc
            .with_read(|d| d.contains(option) && option::is_enabled(d, option));
        if !enabled {
            return;
        }

        let result = self.with_selection(|selection, ctx| {
            let detail = ctx.detail(option);
            selection.on_commit(ctx, option).map(|outcome| (outcome, detail))
        });
        let (outcome, detail) = match result {
            Ok(committed) => committed,
            Err(err) => {
                tracing::warn!(target: targets::AUTOCOMPLETE, %err, "commit failed");
                return;
            }
        };

        match outcome.follow_up {
            FollowUp::CloseList => {
                self.report(self.hide_list());
                self.events.emit(outcome.event);
            }
            FollowUp::Refetch { reactivate } => {
                let identifier = self.doc.attribute(reactivate, aria::ID).unwrap_or_default();
                self.events.emit(outcome.event);
                if let Err(err) = self.fetch_options("") {
                    tracing::debug!(target: targets::AUTOCOMPLETE, %err, "refetch after commit failed");
                }
                let visible = self.visible_options();
                let target = visible
                    .iter()
                    .copied()
                    .find(|&o| {
                        !identifier.is_empty()
                            && self.doc.attribute(o, aria::ID).as_deref() == Some(identifier.as_str())
                    })
                    .or_else(|| visible.first().copied());
                if let Some(target) = target {
                    self.combobox.activate(Some(target), true);
                }
            }
        }

        self.events.emit(AutoCompleteEvent::Commit(detail));
    }

    fn report(&self, result: Result<()>) {
        if let Err(err) = result {
            tracing::debug!(target: targets::AUTOCOMPLETE, %err, container = ?self.container, "autocomplete update failed");
        }
    }
}
