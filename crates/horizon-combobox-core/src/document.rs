//! Element tree for Horizon Combobox.
//!
//! Provides the host-side element model the widgets operate on:
//! - Stable element identifiers via arena-based storage
//! - Parent-child relationships with subtree removal
//! - String attributes, text content and an input `value` property
//! - `hidden`-based effective visibility
//! - Event listeners with bubbling dispatch
//! - Focus tracking and scroll requests
//!
//! # Key Types
//!
//! - [`ElementId`] - Unique stable identifier for each element
//! - [`Document`] - The element arena with all tree and attribute operations
//! - [`SharedDocument`] - Cloneable, thread-safe handle used by widgets
//!
//! # Dispatch
//!
//! [`SharedDocument::dispatch`] collects the listeners of each element on the
//! propagation path under a read lock and releases the lock before invoking
//! them. Listeners are therefore free to mutate the document, add or remove
//! listeners and dispatch further events. A listener removed while an event
//! is in flight is not invoked for the rest of that dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::error::{DocumentError, DocumentResult};
use crate::event::{DomEvent, EventKind, ListenerId};
use crate::logging::targets;
use crate::signal::Signal;

new_key_type! {
    /// A unique identifier for an element in a [`Document`].
    ///
    /// `ElementId`s stay valid while the tree around the element changes.
    /// They become invalid when the element (or one of its ancestors) is
    /// removed from the document.
    pub struct ElementId;
}

/// Callback type stored for each listener.
pub type ListenerFn = Arc<dyn Fn(&mut DomEvent) + Send + Sync>;

/// Internal data stored in the arena for each element.
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    /// Text owned directly by this element.
    text: String,
    /// Current value of form controls.
    value: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Listeners attached to this element, in registration order.
    listeners: Vec<ListenerId>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

struct ListenerEntry {
    element: ElementId,
    kind: EventKind,
    callback: ListenerFn,
}

/// Vertical alignment used when scrolling an element into view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollBlock {
    /// Align to the top of the scroll container.
    Start,
    /// Align to the center of the scroll container.
    Center,
    /// Align to the bottom of the scroll container.
    End,
    /// Scroll as little as possible to make the element visible.
    #[default]
    Nearest,
}

/// A request from widget logic to bring an element into view.
///
/// The document has no layout, so requests are published through
/// [`SharedDocument::scroll_requested`] for the host to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// The element to reveal.
    pub element: ElementId,
    /// Where to align it.
    pub block: ScrollBlock,
}

/// The element arena.
///
/// Most callers go through [`SharedDocument`]; `Document` is exposed through
/// [`SharedDocument::with_read`] and [`SharedDocument::with_write`] for
/// batched queries and updates under a single lock.
pub struct Document {
    elements: SlotMap<ElementId, ElementData>,
    listeners: SlotMap<ListenerId, ListenerEntry>,
    active_element: Option<ElementId>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            listeners: SlotMap::with_key(),
            active_element: None,
        }
    }

    fn data(&self, id: ElementId) -> DocumentResult<&ElementData> {
        self.elements.get(id).ok_or(DocumentError::InvalidElement(id))
    }

    fn data_mut(&mut self, id: ElementId) -> DocumentResult<&mut ElementData> {
        self.elements
            .get_mut(id)
            .ok_or(DocumentError::InvalidElement(id))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Create a detached element with the given tag name.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = self.elements.insert(ElementData::new(tag));
        tracing::trace!(target: targets::DOCUMENT, ?id, tag, "created element");
        id
    }

    /// Check if an element exists in the document.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Number of live elements, attached or not.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The lowercase tag name of an element.
    pub fn tag_name(&self, id: ElementId) -> DocumentResult<&str> {
        self.data(id).map(|d| d.tag.as_str())
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> DocumentResult<()> {
        self.data(parent)?;
        self.data(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::circular(parent, child));
        }

        self.detach(child)?;
        self.data_mut(child)?.parent = Some(parent);
        self.data_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach an element from its parent, keeping it and its subtree alive.
    pub fn detach(&mut self, id: ElementId) -> DocumentResult<()> {
        let old_parent = self.data_mut(id)?.parent.take();
        if let Some(parent_id) = old_parent
            && let Some(parent) = self.elements.get_mut(parent_id)
        {
            parent.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Remove an element and its whole subtree, along with their listeners.
    #[tracing::instrument(skip(self), target = "horizon_combobox_core::document", level = "trace")]
    pub fn remove(&mut self, id: ElementId) -> DocumentResult<()> {
        let doomed = self.subtree(id)?;
        self.detach(id)?;
        for element in doomed {
            if let Some(data) = self.elements.remove(element) {
                for listener in data.listeners {
                    self.listeners.remove(listener);
                }
            }
            if self.active_element == Some(element) {
                self.active_element = None;
            }
        }
        Ok(())
    }

    /// Remove every child of `parent` (and their subtrees).
    pub fn remove_children(&mut self, parent: ElementId) -> DocumentResult<()> {
        let children = self.data(parent)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Replace the children of `parent` with `children`, removing the old ones.
    pub fn replace_children(
        &mut self,
        parent: ElementId,
        children: &[ElementId],
    ) -> DocumentResult<()> {
        self.remove_children(parent)?;
        for &child in children {
            self.append_child(parent, child)?;
        }
        Ok(())
    }

    /// Get the parent of an element.
    pub fn parent(&self, id: ElementId) -> DocumentResult<Option<ElementId>> {
        self.data(id).map(|d| d.parent)
    }

    /// Get the children of an element.
    pub fn children(&self, id: ElementId) -> DocumentResult<&[ElementId]> {
        self.data(id).map(|d| d.children.as_slice())
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: ElementId) -> DocumentResult<Vec<ElementId>> {
        let mut result = Vec::new();
        let mut current = self.data(id)?.parent;
        while let Some(current_id) = current {
            result.push(current_id);
            current = self.elements.get(current_id).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Descendants of `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: ElementId) -> DocumentResult<Vec<ElementId>> {
        let mut result = self.subtree(id)?;
        result.remove(0);
        Ok(result)
    }

    /// `id` followed by its descendants in document order.
    fn subtree(&self, id: ElementId) -> DocumentResult<Vec<ElementId>> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let data = self.data(current)?;
            result.push(current);
            stack.extend(data.children.iter().rev().copied());
        }
        Ok(result)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.elements.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// The nearest inclusive ancestor of `id` matching `predicate`.
    pub fn closest<F>(&self, id: ElementId, predicate: F) -> DocumentResult<Option<ElementId>>
    where
        F: Fn(&Document, ElementId) -> bool,
    {
        self.data(id)?;
        let mut current = Some(id);
        while let Some(current_id) = current {
            if predicate(self, current_id) {
                return Ok(Some(current_id));
            }
            current = self.elements.get(current_id).and_then(|d| d.parent);
        }
        Ok(None)
    }

    /// Descendants of `root` whose `name` attribute equals `value`.
    pub fn query_by_attribute(
        &self,
        root: ElementId,
        name: &str,
        value: &str,
    ) -> DocumentResult<Vec<ElementId>> {
        Ok(self
            .descendants(root)?
            .into_iter()
            .filter(|&id| self.attribute(id, name) == Some(value))
            .collect())
    }

    // =========================================================================
    // Attributes and content
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(id)
            .and_then(|d| d.attributes.get(name))
            .map(String::as_str)
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute, returning `true` if its value changed.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> DocumentResult<bool> {
        let value = value.into();
        let data = self.data_mut(id)?;
        if data.attributes.get(name) == Some(&value) {
            return Ok(false);
        }
        data.attributes.insert(name.to_owned(), value);
        Ok(true)
    }

    /// Remove an attribute, returning `true` if it was present.
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> DocumentResult<bool> {
        Ok(self.data_mut(id)?.attributes.remove(name).is_some())
    }

    /// Set or remove an attribute with an empty value.
    pub fn toggle_attribute(&mut self, id: ElementId, name: &str, on: bool) -> DocumentResult<()> {
        if on {
            self.set_attribute(id, name, "")?;
        } else {
            self.remove_attribute(id, name)?;
        }
        Ok(())
    }

    /// All attributes of an element, sorted by name.
    pub fn attributes(&self, id: ElementId) -> DocumentResult<&BTreeMap<String, String>> {
        self.data(id).map(|d| &d.attributes)
    }

    /// Set the text owned directly by an element.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> DocumentResult<()> {
        self.data_mut(id)?.text = text.into();
        Ok(())
    }

    /// Concatenated text of the element and its descendants.
    pub fn text_content(&self, id: ElementId) -> DocumentResult<String> {
        let mut text = String::new();
        for element in self.subtree(id)? {
            text.push_str(&self.data(element)?.text);
        }
        Ok(text)
    }

    /// Current value of a form control.
    pub fn value(&self, id: ElementId) -> DocumentResult<&str> {
        self.data(id).map(|d| d.value.as_str())
    }

    /// Set the value of a form control.
    pub fn set_value(&mut self, id: ElementId, value: impl Into<String>) -> DocumentResult<()> {
        self.data_mut(id)?.value = value.into();
        Ok(())
    }

    /// Whether the element renders: neither it nor an ancestor is `hidden`,
    /// and it is not an `<input type="hidden">`.
    pub fn is_effectively_visible(&self, id: ElementId) -> DocumentResult<bool> {
        let data = self.data(id)?;
        if data.tag == "input" && data.attributes.get("type").is_some_and(|t| t == "hidden") {
            return Ok(false);
        }

        let mut current = Some(id);
        while let Some(current_id) = current {
            let Some(data) = self.elements.get(current_id) else {
                break;
            };
            if data.attributes.contains_key("hidden") {
                return Ok(false);
            }
            current = data.parent;
        }
        Ok(true)
    }

    // =========================================================================
    // Listeners and focus
    // =========================================================================

    /// Register a listener for events of `kind` reaching `element`.
    pub fn add_listener(
        &mut self,
        element: ElementId,
        kind: EventKind,
        callback: ListenerFn,
    ) -> DocumentResult<ListenerId> {
        self.data(element)?;
        let id = self.listeners.insert(ListenerEntry {
            element,
            kind,
            callback,
        });
        self.data_mut(element)?.listeners.push(id);
        tracing::trace!(target: targets::DOCUMENT, ?element, ?kind, ?id, "added listener");
        Ok(id)
    }

    /// Remove a listener, returning `true` if it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(entry) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(data) = self.elements.get_mut(entry.element) {
            data.listeners.retain(|&l| l != id);
        }
        true
    }

    /// Whether a listener is still registered.
    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Number of listeners registered on `element` for `kind`.
    pub fn listener_count(&self, element: ElementId, kind: EventKind) -> usize {
        self.elements.get(element).map_or(0, |data| {
            data.listeners
                .iter()
                .filter(|&&l| self.listeners.get(l).is_some_and(|e| e.kind == kind))
                .count()
        })
    }

    fn listeners_for(&self, element: ElementId, kind: EventKind) -> Vec<(ListenerId, ListenerFn)> {
        self.elements.get(element).map_or_else(Vec::new, |data| {
            data.listeners
                .iter()
                .filter_map(|&l| {
                    self.listeners
                        .get(l)
                        .filter(|e| e.kind == kind)
                        .map(|e| (l, e.callback.clone()))
                })
                .collect()
        })
    }

    /// The element that currently has focus.
    pub fn active_element(&self) -> Option<ElementId> {
        self.active_element
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

struct DocumentInner {
    tree: RwLock<Document>,
    scroll_requested: Signal<ScrollRequest>,
}

/// A cloneable, thread-safe handle to a [`Document`].
///
/// Clones share the same tree. Widgets keep one of these and go through it
/// for every read and write, so external mutation of the tree between
/// operations is always observed.
#[derive(Clone)]
pub struct SharedDocument {
    inner: Arc<DocumentInner>,
}

impl SharedDocument {
    /// Create a new, empty shared document.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                tree: RwLock::new(Document::new()),
                scroll_requested: Signal::new(),
            }),
        }
    }

    /// Run `f` with shared access to the tree.
    pub fn with_read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.tree.read())
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// Do not dispatch events from inside `f`.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.tree.write())
    }

    /// Whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.with_write(|d| d.create_element(tag))
    }

    /// Create an element with attributes and text, appended under `parent`.
    pub fn create_child<'a>(
        &self,
        parent: ElementId,
        tag: &str,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
        text: &str,
    ) -> DocumentResult<ElementId> {
        self.with_write(|d| {
            let id = d.create_element(tag);
            for (name, value) in attributes {
                d.set_attribute(id, name, value)?;
            }
            d.set_text(id, text)?;
            d.append_child(parent, id)?;
            Ok(id)
        })
    }

    /// Check if an element exists.
    pub fn contains(&self, id: ElementId) -> bool {
        self.with_read(|d| d.contains(id))
    }

    /// Append `child` under `parent`.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> DocumentResult<()> {
        self.with_write(|d| d.append_child(parent, child))
    }

    /// Remove an element and its subtree.
    pub fn remove(&self, id: ElementId) -> DocumentResult<()> {
        self.with_write(|d| d.remove(id))
    }

    /// Replace the children of `parent`.
    pub fn replace_children(&self, parent: ElementId, children: &[ElementId]) -> DocumentResult<()> {
        self.with_write(|d| d.replace_children(parent, children))
    }

    /// Get the children of an element.
    pub fn children(&self, id: ElementId) -> DocumentResult<Vec<ElementId>> {
        self.with_read(|d| d.children(id).map(<[ElementId]>::to_vec))
    }

    /// Get an attribute value.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.with_read(|d| d.attribute(id, name).map(str::to_owned))
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.with_read(|d| d.has_attribute(id, name))
    }

    /// Set an attribute.
    pub fn set_attribute(
        &self,
        id: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> DocumentResult<bool> {
        self.with_write(|d| d.set_attribute(id, name, value))
    }

    /// Remove an attribute.
    pub fn remove_attribute(&self, id: ElementId, name: &str) -> DocumentResult<bool> {
        self.with_write(|d| d.remove_attribute(id, name))
    }

    /// Set the text owned directly by an element.
    pub fn set_text(&self, id: ElementId, text: impl Into<String>) -> DocumentResult<()> {
        self.with_write(|d| d.set_text(id, text))
    }

    /// Concatenated text of the element and its descendants.
    pub fn text_content(&self, id: ElementId) -> DocumentResult<String> {
        self.with_read(|d| d.text_content(id))
    }

    /// Current value of a form control.
    pub fn value(&self, id: ElementId) -> DocumentResult<String> {
        self.with_read(|d| d.value(id).map(str::to_owned))
    }

    /// Set the value of a form control.
    pub fn set_value(&self, id: ElementId, value: impl Into<String>) -> DocumentResult<()> {
        self.with_write(|d| d.set_value(id, value))
    }

    /// Whether an element is effectively visible.
    pub fn is_effectively_visible(&self, id: ElementId) -> DocumentResult<bool> {
        self.with_read(|d| d.is_effectively_visible(id))
    }

    /// Register a listener.
    pub fn add_listener<F>(
        &self,
        element: ElementId,
        kind: EventKind,
        callback: F,
    ) -> DocumentResult<ListenerId>
    where
        F: Fn(&mut DomEvent) + Send + Sync + 'static,
    {
        self.with_write(|d| d.add_listener(element, kind, Arc::new(callback)))
    }

    /// Remove a listener.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.with_write(|d| d.remove_listener(id))
    }

    /// Dispatch an event to its target, bubbling through ancestors when the
    /// event kind bubbles.
    ///
    /// Returns `false` if a listener called
    /// [`prevent_default`](DomEvent::prevent_default), `true` otherwise.
    #[tracing::instrument(skip_all, target = "horizon_combobox_core::document", level = "trace", fields(kind = ?event.kind()))]
    pub fn dispatch(&self, event: &mut DomEvent) -> bool {
        let path = self.with_read(|d| {
            if !d.contains(event.target()) {
                return Vec::new();
            }
            let mut path = vec![event.target()];
            if event.kind().bubbles() {
                path.extend(d.ancestors(event.target()).unwrap_or_default());
            }
            path
        });

        for node in path {
            let listeners = self.with_read(|d| d.listeners_for(node, event.kind()));
            event.set_current_target(node);
            for (id, callback) in listeners {
                if !self.with_read(|d| d.has_listener(id)) {
                    continue;
                }
                callback(event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        !event.is_default_prevented()
    }

    /// The element that currently has focus.
    pub fn active_element(&self) -> Option<ElementId> {
        self.with_read(Document::active_element)
    }

    /// Move focus to `id`, dispatching blur on the previously focused element
    /// and focus on the new one.
    pub fn focus(&self, id: ElementId) -> DocumentResult<()> {
        let previous = self.with_write(|d| {
            if !d.contains(id) {
                return Err(DocumentError::InvalidElement(id));
            }
            Ok(d.active_element.replace(id))
        })?;
        if previous == Some(id) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.dispatch(&mut DomEvent::blur(previous, Some(id)));
            // A blur listener may have moved focus elsewhere.
            if self.active_element() != Some(id) {
                return Ok(());
            }
        }
        self.dispatch(&mut DomEvent::focus(id, previous));
        Ok(())
    }

    /// Remove focus from the focused element, dispatching blur with no
    /// related target.
    pub fn blur(&self) {
        if let Some(previous) = self.with_write(|d| d.active_element.take()) {
            self.dispatch(&mut DomEvent::blur(previous, None));
        }
    }

    /// Ask the host to scroll `id` into view.
    pub fn scroll_into_view(&self, id: ElementId, block: ScrollBlock) {
        tracing::trace!(target: targets::DOCUMENT, ?id, ?block, "scroll requested");
        self.inner.scroll_requested.emit(ScrollRequest { element: id, block });
    }

    /// Signal emitted for every [`scroll_into_view`](Self::scroll_into_view).
    pub fn scroll_requested(&self) -> &Signal<ScrollRequest> {
        &self.inner.scroll_requested
    }
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDocument")
            .field("elements", &self.with_read(Document::element_count))
            .finish()
    }
}
