//! Attribute names and values used by the listbox contract.
//!
//! Everything the widgets read from or write to the element tree goes
//! through these names, so the contract a screen reader or a stylesheet
//! observes is defined in one place.

/// `role` attribute.
pub const ROLE: &str = "role";
/// Role of the text input.
pub const ROLE_COMBOBOX: &str = "combobox";
/// Role of the list container.
pub const ROLE_LISTBOX: &str = "listbox";
/// Role of each option.
pub const ROLE_OPTION: &str = "option";

/// Element identifier attribute.
pub const ID: &str = "id";
/// Tab order attribute; options carry `-1`.
pub const TABINDEX: &str = "tabindex";
/// Native disabled flag.
pub const DISABLED: &str = "disabled";
/// Visibility flag.
pub const HIDDEN: &str = "hidden";

pub const ARIA_EXPANDED: &str = "aria-expanded";
pub const ARIA_HASPOPUP: &str = "aria-haspopup";
pub const ARIA_CONTROLS: &str = "aria-controls";
pub const ARIA_AUTOCOMPLETE: &str = "aria-autocomplete";
pub const ARIA_MULTISELECTABLE: &str = "aria-multiselectable";
pub const ARIA_ACTIVEDESCENDANT: &str = "aria-activedescendant";
pub const ARIA_SELECTED: &str = "aria-selected";
pub const ARIA_DISABLED: &str = "aria-disabled";
pub const ARIA_ORIENTATION: &str = "aria-orientation";
pub const ARIA_LABEL: &str = "aria-label";

/// Highlight marker carried by the active option.
pub const DATA_ACTIVE: &str = "data-active";
/// Set on the list while no option is visible.
pub const DATA_EMPTY: &str = "data-empty";
/// Human-readable label of an option or of the current selection.
pub const DATA_LABEL: &str = "data-label";
/// Marks the clear button inside an autocomplete container.
pub const DATA_CLEAR: &str = "data-clear";
/// Distinguishes the hidden form fields of a multi selection.
pub const DATA_VARIANT: &str = "data-variant";

/// Submitted value of an option or container.
pub const VALUE: &str = "value";
/// Form field name.
pub const NAME: &str = "name";
/// Input type.
pub const TYPE: &str = "type";
/// Marks an open autocomplete container.
pub const OPEN: &str = "open";
/// Marks an autocomplete container waiting for its option source.
pub const LOADING: &str = "loading";
pub const SPELLCHECK: &str = "spellcheck";
pub const AUTOCOMPLETE: &str = "autocomplete";

pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

/// Render a boolean the way ARIA state attributes expect it.
pub fn bool_value(value: bool) -> &'static str {
    if value { TRUE } else { FALSE }
}
