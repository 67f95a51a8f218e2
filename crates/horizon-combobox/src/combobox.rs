//! Combobox interaction engine.
//!
//! [`Combobox`] binds one text input to one list of option elements and turns
//! them into an accessible listbox: it writes the ARIA contract, tracks the
//! active (highlighted) option, applies selection rules, handles the keyboard
//! and pointer protocols while started, and emits [`Combobox::committed`]
//! when the user commits an option.
//!
//! The engine never caches the option list. Every operation re-reads the
//! options under the list element, so providers may replace them at any
//! time and call [`Combobox::initialize_options`] afterwards.
//!
//! # Keyboard
//!
//! | Key | Effect |
//! |-----|--------|
//! | ArrowDown / ArrowUp | Next / previous visible option, wrapping |
//! | Home / End | First / last visible option |
//! | Enter / Tab | Commit the active option |
//! | Escape | Clear the highlight |
//! | anything else | Clear the highlight |
//!
//! Events with Shift, Alt or Meta are ignored, as are Ctrl chords unless
//! [`ComboboxConfig::ctrl_bindings`] is set.
//!
//! # Example
//!
//! ```
//! use horizon_combobox::{Combobox, ComboboxConfig};
//! use horizon_combobox_core::{DomEvent, Key, KeyboardModifiers, SharedDocument};
//!
//! let doc = SharedDocument::new();
//! let input = doc.create_element("input");
//! let list = doc.create_element("ul");
//! let apple = doc.create_child(list, "li", [("role", "option")], "Apple").unwrap();
//!
//! let combobox = Combobox::new(doc.clone(), input, list, ComboboxConfig::new()).unwrap();
//! combobox.committed().connect(|commit| println!("committed {}", commit.identifier));
//! combobox.start();
//!
//! doc.dispatch(&mut DomEvent::key_down(input, Key::ArrowDown, KeyboardModifiers::NONE));
//! assert_eq!(combobox.active_option(), Some(apple));
//! doc.dispatch(&mut DomEvent::key_down(input, Key::Enter, KeyboardModifiers::NONE));
//! assert_eq!(combobox.selected_options(), vec![apple]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_combobox_core::logging::targets;
use horizon_combobox_core::{
    Document, DocumentError, DomEvent, ElementId, EventKind, Key, ListenerId, ScrollBlock,
    SharedDocument, Signal, branded_id,
};
use parking_lot::Mutex;

use crate::aria;
use crate::config::ComboboxConfig;
use crate::error::Result;
use crate::option::{self, Direction, ListboxState, SelectionMode};

/// Payload of [`Combobox::committed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// The committed option element.
    pub option: ElementId,
    /// Its `id` attribute.
    pub identifier: String,
}

/// Listeners attached by [`Combobox::start`]. Dropping the set detaches them.
struct Subscriptions {
    doc: SharedDocument,
    listeners: Vec<ListenerId>,
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.doc.with_write(|d| {
            for &id in &self.listeners {
                d.remove_listener(id);
            }
        });
    }
}

struct ComboboxInner {
    doc: SharedDocument,
    input: ElementId,
    list: ElementId,
    config: ComboboxConfig,
    /// Set by pointer movement over the list, cleared by keyboard input.
    mouse_moving: AtomicBool,
    subscriptions: Mutex<Option<Subscriptions>>,
    committed: Signal<CommitEvent>,
}

/// The combobox interaction engine.
///
/// `Combobox` is a cheap handle: clones share the same engine. The engine
/// detaches its listeners when the last handle is dropped.
#[derive(Clone)]
pub struct Combobox {
    inner: Arc<ComboboxInner>,
}

impl Combobox {
    /// Bind `input` and `list` and write the static ARIA contract.
    ///
    /// The list receives a generated identifier if it has none; the input
    /// references it through `aria-controls`.
    pub fn new(
        doc: SharedDocument,
        input: ElementId,
        list: ElementId,
        config: ComboboxConfig,
    ) -> Result<Self> {
        doc.with_write(|d| -> std::result::Result<(), DocumentError> {
            if !d.contains(input) {
                return Err(DocumentError::InvalidElement(input));
            }
            if !d.contains(list) {
                return Err(DocumentError::InvalidElement(list));
            }

            let list_id = match d.attribute(list, aria::ID) {
                Some(id) if !id.is_empty() => id.to_owned(),
                _ => {
                    let id = branded_id();
                    d.set_attribute(list, aria::ID, id.clone())?;
                    id
                }
            };

            d.set_attribute(input, aria::ARIA_EXPANDED, aria::FALSE)?;
            d.set_attribute(input, aria::ROLE, aria::ROLE_COMBOBOX)?;
            d.set_attribute(input, aria::ARIA_HASPOPUP, aria::ROLE_LISTBOX)?;
            d.set_attribute(input, aria::ARIA_CONTROLS, list_id)?;
            d.set_attribute(input, aria::ARIA_AUTOCOMPLETE, "list")?;
            d.set_attribute(list, aria::ROLE, aria::ROLE_LISTBOX)?;
            if config.multiple {
                d.set_attribute(input, aria::ARIA_MULTISELECTABLE, aria::TRUE)?;
            }
            Ok(())
        })?;

        tracing::debug!(target: targets::COMBOBOX, ?input, ?list, multiple = config.multiple, "combobox created");

        Ok(Self {
            inner: Arc::new(ComboboxInner {
                doc,
                input,
                list,
                config,
                mouse_moving: AtomicBool::new(false),
                subscriptions: Mutex::new(None),
                committed: Signal::new(),
            }),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Enter the interactive lifecycle.
    ///
    /// Marks the input expanded, (re)initializes the options and attaches the
    /// keyboard and pointer handlers. Calling `start` while started refreshes
    /// the options without attaching a second set of handlers.
    pub fn start(&self) {
        let inner = &self.inner;
        inner.mouse_moving.store(false, Ordering::SeqCst);
        inner.set_input_attribute(aria::ARIA_EXPANDED, aria::TRUE);
        inner.initialize_options(&[]);

        let mut subscriptions = inner.subscriptions.lock();
        if subscriptions.is_some() {
            return;
        }
        *subscriptions = Some(inner.subscribe(Arc::downgrade(&self.inner)));
        tracing::debug!(target: targets::COMBOBOX, list = ?inner.list, "combobox started");
    }

    /// Exit the interactive lifecycle.
    ///
    /// Clears the highlight, marks the input collapsed and detaches every
    /// handler. Calling `stop` while stopped is harmless.
    pub fn stop(&self) {
        let inner = &self.inner;
        inner.mouse_moving.store(false, Ordering::SeqCst);
        inner.activate(None, false);
        inner.set_input_attribute(aria::ARIA_EXPANDED, aria::FALSE);

        let subscriptions = inner.subscriptions.lock().take();
        if subscriptions.is_some() {
            tracing::debug!(target: targets::COMBOBOX, list = ?inner.list, "combobox stopped");
        }
        drop(subscriptions);
    }

    /// Whether the handlers are attached.
    pub fn is_started(&self) -> bool {
        self.inner.subscriptions.lock().is_some()
    }

    // =========================================================================
    // Selection and activation
    // =========================================================================

    /// Select `option`.
    ///
    /// In single mode every other enabled option is deselected. In multiple
    /// mode only `option` changes, and the call returns `false` without
    /// selecting anything when the configured cap is reached. Whether the
    /// option is enabled is the caller's concern.
    pub fn select(&self, option: ElementId) -> bool {
        self.inner.select(option)
    }

    /// Deselect `option`.
    pub fn deselect(&self, option: ElementId) {
        self.inner.update(|state| state.deselect(option));
    }

    /// Deselect every option.
    pub fn deselect_all(&self) {
        self.inner.update(ListboxState::deselect_all);
    }

    /// Make `option` the active option and point the input's
    /// `aria-activedescendant` at it. `None` clears the highlight.
    ///
    /// Visibility is not checked so that hosts can restore state onto
    /// filtered-out options. With `scroll`, a nearest-edge scroll request is
    /// issued for the option.
    pub fn activate(&self, option: Option<ElementId>, scroll: bool) {
        self.inner.activate(option, scroll);
    }

    /// Clear the highlight.
    pub fn deactivate(&self) {
        self.inner.activate(None, false);
    }

    /// Prepare options after the provider replaced them.
    ///
    /// Every option gets `tabindex="-1"` and an identifier if it lacks one;
    /// enabled options without `aria-selected` get `"false"`; options whose
    /// identifier is listed in `selected_ids` get `"true"`. Idempotent.
    pub fn initialize_options(&self, selected_ids: &[&str]) {
        self.inner.initialize_options(selected_ids);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Option elements in list order.
    pub fn options(&self) -> Vec<ElementId> {
        self.inner.state().options().iter().map(|o| o.element).collect()
    }

    /// Options eligible for navigation, in list order.
    pub fn visible_options(&self) -> Vec<ElementId> {
        self.inner.state().visible().map(|o| o.element).collect()
    }

    /// Options marked selected, in list order.
    pub fn selected_options(&self) -> Vec<ElementId> {
        self.inner.state().selected().map(|o| o.element).collect()
    }

    /// The highlighted option.
    pub fn active_option(&self) -> Option<ElementId> {
        self.inner.state().active().map(|o| o.element)
    }

    /// Snapshot of every option's state.
    pub fn state(&self) -> ListboxState {
        self.inner.state()
    }

    /// The bound input element.
    pub fn input(&self) -> ElementId {
        self.inner.input
    }

    /// The bound list element.
    pub fn list(&self) -> ElementId {
        self.inner.list
    }

    /// The document the engine operates on.
    pub fn document(&self) -> &SharedDocument {
        &self.inner.doc
    }

    /// The engine configuration.
    pub fn config(&self) -> &ComboboxConfig {
        &self.inner.config
    }

    /// Signal emitted after an option is committed by click, Enter or Tab.
    pub fn committed(&self) -> &Signal<CommitEvent> {
        &self.inner.committed
    }
}

impl std::fmt::Debug for Combobox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combobox")
            .field("input", &self.inner.input)
            .field("list", &self.inner.list)
            .field("config", &self.inner.config)
            .field("started", &self.is_started())
            .finish()
    }
}

impl ComboboxInner {
    fn subscribe(&self, weak: Weak<ComboboxInner>) -> Subscriptions {
        let handlers: [(ElementId, EventKind, fn(&ComboboxInner, &mut DomEvent)); 4] = [
            (self.input, EventKind::KeyDown, ComboboxInner::on_key_down),
            (self.list, EventKind::Click, ComboboxInner::on_click),
            (self.list, EventKind::MouseOver, ComboboxInner::on_mouse_over),
            (self.list, EventKind::MouseMove, ComboboxInner::on_mouse_move),
        ];

        let mut listeners = Vec::with_capacity(handlers.len());
        for (element, kind, handler) in handlers {
            let weak = weak.clone();
            let added = self.doc.add_listener(element, kind, move |event| {
                if let Some(inner) = weak.upgrade() {
                    handler(&inner, event);
                }
            });
            match added {
                Ok(id) => listeners.push(id),
                Err(err) => {
                    tracing::debug!(target: targets::COMBOBOX, %err, ?kind, "failed to attach handler");
                }
            }
        }

        Subscriptions {
            doc: self.doc.clone(),
            listeners,
        }
    }

    fn state(&self) -> ListboxState {
        self.doc.with_read(|d| self.read_state(d))
    }

    fn read_state(&self, doc: &Document) -> ListboxState {
        ListboxState::read(doc, self.list).unwrap_or_else(|err| {
            tracing::debug!(target: targets::COMBOBOX, %err, "list is gone, treating it as empty");
            ListboxState::default()
        })
    }

    /// Apply `f` to a fresh snapshot and project the result, all under one
    /// write lock.
    fn update<R>(&self, f: impl FnOnce(&mut ListboxState) -> R) -> R {
        self.doc.with_write(|d| {
            let before = self.read_state(d);
            let mut after = before.clone();
            let result = f(&mut after);
            if let Err(err) = option::project(d, self.input, &before, &after) {
                tracing::debug!(target: targets::COMBOBOX, %err, "failed to project listbox state");
            }
            result
        })
    }

    fn select(&self, option: ElementId) -> bool {
        let mode = self.config.mode();
        let max = self.config.max_selected;
        let selected = self.update(|state| state.select(option, mode, max));
        if !selected {
            tracing::trace!(target: targets::COMBOBOX, ?option, "selection refused");
        }
        selected
    }

    fn activate(&self, option: Option<ElementId>, scroll: bool) {
        let active = self.update(|state| state.activate(option));
        if scroll && let Some(active) = active {
            self.doc.scroll_into_view(active, ScrollBlock::Nearest);
        }
    }

    fn initialize_options(&self, selected_ids: &[&str]) {
        let result = self.doc.with_write(|d| -> std::result::Result<(), DocumentError> {
            for element in option::option_elements(d, self.list)? {
                d.set_attribute(element, aria::TABINDEX, "-1")?;
                if option::is_enabled(d, element) && !d.has_attribute(element, aria::ARIA_SELECTED) {
                    d.set_attribute(element, aria::ARIA_SELECTED, aria::FALSE)?;
                }
                let identifier = d.attribute(element, aria::ID).unwrap_or_default();
                if identifier.is_empty() {
                    d.set_attribute(element, aria::ID, branded_id())?;
                } else if selected_ids.contains(&identifier) {
                    d.set_attribute(element, aria::ARIA_SELECTED, aria::TRUE)?;
                }
            }
            Ok(())
        });
        if let Err(err) = result {
            tracing::debug!(target: targets::COMBOBOX, %err, "failed to initialize options");
        }
    }

    fn set_input_attribute(&self, name: &str, value: &str) {
        if let Err(err) = self.doc.set_attribute(self.input, name, value) {
            tracing::debug!(target: targets::COMBOBOX, %err, name, "input is gone");
        }
    }

    fn closest_option(&self, target: ElementId) -> Option<ElementId> {
        self.doc
            .with_read(|d| option::closest_option(d, self.list, target))
            .ok()
            .flatten()
    }

    /// Commit the active option. Returns whether the key was consumed.
    ///
    /// A highlight left on an option that has since been hidden counts as no
    /// highlight.
    fn commit_active(&self) -> bool {
        let active = self.doc.with_read(|d| {
            self.read_state(d)
                .active()
                .filter(|o| o.visible)
                .map(|o| (o.element, o.enabled))
        });
        let Some((option, enabled)) = active else {
            return false;
        };
        if enabled {
            self.doc.dispatch(&mut DomEvent::synthetic_click(option));
        }
        true
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    fn on_key_down(&self, event: &mut DomEvent) {
        self.mouse_moving.store(false, Ordering::SeqCst);

        let Some((key, modifiers)) = event.key() else {
            return;
        };
        if modifiers.shift || modifiers.meta || modifiers.alt {
            return;
        }
        if modifiers.control && !self.config.ctrl_bindings {
            return;
        }

        tracing::trace!(target: targets::COMBOBOX, ?key, "key down");
        match key {
            Key::ArrowDown | Key::ArrowUp => {
                let direction = if key == Key::ArrowDown {
                    Direction::Next
                } else {
                    Direction::Previous
                };
                let target = self.state().step(direction);
                self.activate(target, true);
                event.prevent_default();
            }
            Key::Home | Key::End => {
                let state = self.state();
                let target = if key == Key::Home {
                    state.first_visible()
                } else {
                    state.last_visible()
                };
                self.activate(target, true);
                event.prevent_default();
            }
            Key::Enter | Key::Tab => {
                if self.commit_active() {
                    event.prevent_default();
                }
            }
            Key::Escape => self.activate(None, false),
            key if key.is_modifier() => {}
            _ => self.activate(None, false),
        }
    }

    fn on_click(&self, event: &mut DomEvent) {
        let Some(option) = self.closest_option(event.target()) else {
            return;
        };
        let Some(state) = self.doc.with_read(|d| self.read_state(d).get(option).cloned()) else {
            return;
        };
        if !state.enabled {
            return;
        }

        let committed = match self.config.mode() {
            SelectionMode::Multiple if state.selected => {
                self.update(|s| s.deselect(option));
                true
            }
            _ => self.select(option),
        };
        if !committed {
            return;
        }

        let identifier = self
            .doc
            .attribute(option, aria::ID)
            .unwrap_or_default();
        tracing::debug!(target: targets::COMBOBOX, ?option, %identifier, "option committed");
        self.committed.emit(CommitEvent { option, identifier });
    }

    fn on_mouse_over(&self, event: &mut DomEvent) {
        if !self.mouse_moving.load(Ordering::SeqCst) {
            event.prevent_default();
            return;
        }
        if let Some(option) = self.closest_option(event.target()) {
            self.activate(Some(option), false);
        }
    }

    fn on_mouse_move(&self, event: &mut DomEvent) {
        self.mouse_moving.store(true, Ordering::SeqCst);
        if let Some(option) = self.closest_option(event.target()) {
            self.activate(Some(option), false);
        }
    }
}
