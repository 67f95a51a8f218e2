//! Event types dispatched through a [`Document`](crate::Document).
//!
//! Events are addressed to a target element and bubble from the target up
//! through its ancestors. Listeners may cancel the default action with
//! [`DomEvent::prevent_default`] or end bubbling with
//! [`DomEvent::stop_propagation`].

use slotmap::new_key_type;

use crate::document::ElementId;

new_key_type! {
    /// A unique identifier for a registered event listener.
    pub struct ListenerId;
}

/// The kinds of events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A key was pressed while the target had focus.
    KeyDown,
    /// The primary pointer button was clicked on the target.
    Click,
    /// A pointer button went down over the target.
    MouseDown,
    /// The pointer entered the target or one of its descendants.
    MouseOver,
    /// The pointer moved over the target.
    MouseMove,
    /// The value of a text input changed through user editing.
    Input,
    /// The target gained focus.
    Focus,
    /// The target lost focus.
    Blur,
}

impl EventKind {
    /// Whether events of this kind bubble to ancestors.
    pub fn bubbles(self) -> bool {
        !matches!(self, Self::Focus | Self::Blur)
    }
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
        meta: false,
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: true,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// Logical keys relevant to text inputs and listbox navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Navigation
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,

    // Editing
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,

    // Modifiers
    Shift,
    Control,
    Alt,
    Meta,

    /// A key producing printable text.
    Character(char),

    /// Unknown key with platform-specific scan code.
    Unknown(u16),
}

impl Key {
    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt | Self::Meta)
    }
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// No extra data (clicks, pointer movement, input).
    None,
    /// Key press data.
    Key {
        key: Key,
        modifiers: KeyboardModifiers,
        is_repeat: bool,
    },
    /// Focus change data. `related_target` is the element receiving focus
    /// on blur, or losing it on focus.
    Focus { related_target: Option<ElementId> },
}

/// An event travelling through the element tree.
#[derive(Debug, Clone)]
pub struct DomEvent {
    kind: EventKind,
    target: ElementId,
    current_target: ElementId,
    payload: EventPayload,
    trusted: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create a new event addressed to `target`.
    pub fn new(kind: EventKind, target: ElementId, payload: EventPayload) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            payload,
            trusted: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Key press on `target` with the given modifiers.
    pub fn key_down(target: ElementId, key: Key, modifiers: KeyboardModifiers) -> Self {
        Self::new(
            EventKind::KeyDown,
            target,
            EventPayload::Key {
                key,
                modifiers,
                is_repeat: false,
            },
        )
    }

    /// Click on `target`.
    pub fn click(target: ElementId) -> Self {
        Self::new(EventKind::Click, target, EventPayload::None)
    }

    /// Click synthesized by program logic rather than the user.
    pub fn synthetic_click(target: ElementId) -> Self {
        let mut event = Self::click(target);
        event.trusted = false;
        event
    }

    /// Pointer button press on `target`.
    pub fn mouse_down(target: ElementId) -> Self {
        Self::new(EventKind::MouseDown, target, EventPayload::None)
    }

    /// Pointer entering `target`.
    pub fn mouse_over(target: ElementId) -> Self {
        Self::new(EventKind::MouseOver, target, EventPayload::None)
    }

    /// Pointer movement over `target`.
    pub fn mouse_move(target: ElementId) -> Self {
        Self::new(EventKind::MouseMove, target, EventPayload::None)
    }

    /// Text edit on `target`.
    pub fn input(target: ElementId) -> Self {
        Self::new(EventKind::Input, target, EventPayload::None)
    }

    /// Focus loss on `target`; `related_target` receives focus next.
    pub fn blur(target: ElementId, related_target: Option<ElementId>) -> Self {
        Self::new(EventKind::Blur, target, EventPayload::Focus { related_target })
    }

    /// Focus gain on `target`; `related_target` lost focus.
    pub fn focus(target: ElementId, related_target: Option<ElementId>) -> Self {
        Self::new(EventKind::Focus, target, EventPayload::Focus { related_target })
    }

    /// The event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The element the event was dispatched to.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The element whose listener is currently running.
    pub fn current_target(&self) -> ElementId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, id: ElementId) {
        self.current_target = id;
    }

    /// Event-specific data.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The key and modifiers of a key event.
    pub fn key(&self) -> Option<(Key, KeyboardModifiers)> {
        match self.payload {
            EventPayload::Key { key, modifiers, .. } => Some((key, modifiers)),
            _ => None,
        }
    }

    /// The related target of a focus event.
    pub fn related_target(&self) -> Option<ElementId> {
        match self.payload {
            EventPayload::Focus { related_target } => related_target,
            _ => None,
        }
    }

    /// Whether the event originated from the user rather than program logic.
    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Cancel the default action associated with the event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop the event from reaching further ancestors.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was called.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn element() -> ElementId {
        ElementId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn test_modifiers() {
        assert!(KeyboardModifiers::NONE.none());
        assert!(KeyboardModifiers::SHIFT.any());
        assert!(KeyboardModifiers::ALT.alt);
        assert!(!KeyboardModifiers::CTRL.meta);
    }

    #[test]
    fn test_key_classification() {
        assert!(Key::Alt.is_modifier());
        assert!(!Key::Character('a').is_modifier());
    }

    #[test]
    fn test_prevent_default_and_stop_propagation() {
        let mut event = DomEvent::key_down(element(), Key::ArrowDown, KeyboardModifiers::NONE);
        assert!(!event.is_default_prevented());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(
            event.key(),
            Some((Key::ArrowDown, KeyboardModifiers::NONE))
        );
    }

    #[test]
    fn test_synthetic_click_is_untrusted() {
        assert!(DomEvent::click(element()).is_trusted());
        assert!(!DomEvent::synthetic_click(element()).is_trusted());
    }

    #[test]
    fn test_focus_events_do_not_bubble() {
        assert!(!EventKind::Blur.bubbles());
        assert!(EventKind::Click.bubbles());
        let blur = DomEvent::blur(element(), None);
        assert_eq!(blur.related_target(), None);
    }
}
