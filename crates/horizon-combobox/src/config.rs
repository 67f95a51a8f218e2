//! Widget configuration.
//!
//! Both structs deserialize from any serde format with every field optional,
//! so hosts can keep them in their own TOML or JSON settings:
//!
//! ```
//! use horizon_combobox::ComboboxConfig;
//!
//! let config: ComboboxConfig = serde_json::from_str(r#"{ "multiple": true, "max_selected": 3 }"#).unwrap();
//! assert!(config.multiple);
//! assert_eq!(config.max_selected, Some(3));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aria;
use crate::option::SelectionMode;

/// Whether Ctrl chords reach the keyboard protocol by default.
///
/// On macOS Ctrl is not a command modifier, so Ctrl+key combinations are
/// handled like plain keys there.
pub const DEFAULT_CTRL_BINDINGS: bool = cfg!(target_os = "macos");

fn default_ctrl_bindings() -> bool {
    DEFAULT_CTRL_BINDINGS
}

/// Delay between the last `input` event and the fetch it triggers.
pub const DEFAULT_INPUT_DEBOUNCE_MS: u64 = 300;

fn default_input_debounce_ms() -> u64 {
    DEFAULT_INPUT_DEBOUNCE_MS
}

fn default_filter_attribute() -> String {
    aria::DATA_LABEL.to_owned()
}

/// Configuration of the combobox interaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboboxConfig {
    /// Allow any number of selected options instead of one.
    pub multiple: bool,
    /// Cap on selected options in multiple mode; `None` is unlimited.
    pub max_selected: Option<usize>,
    /// Handle key events carrying Ctrl instead of ignoring them.
    #[serde(default = "default_ctrl_bindings")]
    pub ctrl_bindings: bool,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            max_selected: None,
            ctrl_bindings: DEFAULT_CTRL_BINDINGS,
        }
    }
}

impl ComboboxConfig {
    /// Single selection, no cap, platform Ctrl handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set multiple selection using builder pattern.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Set the selection cap using builder pattern.
    pub fn with_max_selected(mut self, max: usize) -> Self {
        self.max_selected = Some(max);
        self
    }

    /// Set Ctrl handling using builder pattern.
    pub fn with_ctrl_bindings(mut self, enabled: bool) -> Self {
        self.ctrl_bindings = enabled;
        self
    }

    /// The selection mode implied by [`multiple`](Self::multiple).
    pub fn mode(&self) -> SelectionMode {
        if self.multiple {
            SelectionMode::Multiple
        } else {
            SelectionMode::Single
        }
    }
}

/// Configuration of the autocomplete widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCompleteConfig {
    /// Allow selecting several values.
    pub multiple: bool,
    /// Cap on selected options in multiple mode.
    pub max_selected: Option<usize>,
    /// Handle key events carrying Ctrl instead of ignoring them.
    #[serde(default = "default_ctrl_bindings")]
    pub ctrl_bindings: bool,
    /// Form field name; when set, hidden fields mirror the selected value(s).
    pub name: Option<String>,
    /// Attribute matched against the query when filtering locally.
    #[serde(default = "default_filter_attribute")]
    pub filter_attribute: String,
    /// Milliseconds to wait after typing before fetching; `0` fetches on
    /// every `input` event.
    #[serde(default = "default_input_debounce_ms")]
    pub input_debounce_ms: u64,
}

impl Default for AutoCompleteConfig {
    fn default() -> Self {
        Self {
            multiple: false,
            max_selected: None,
            ctrl_bindings: DEFAULT_CTRL_BINDINGS,
            name: None,
            filter_attribute: default_filter_attribute(),
            input_debounce_ms: DEFAULT_INPUT_DEBOUNCE_MS,
        }
    }
}

impl AutoCompleteConfig {
    /// Single selection, local filtering on `data-label`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set multiple selection using builder pattern.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Set the selection cap using builder pattern.
    pub fn with_max_selected(mut self, max: usize) -> Self {
        self.max_selected = Some(max);
        self
    }

    /// Set Ctrl handling using builder pattern.
    pub fn with_ctrl_bindings(mut self, enabled: bool) -> Self {
        self.ctrl_bindings = enabled;
        self
    }

    /// Set the form field name using builder pattern.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the filter attribute using builder pattern.
    pub fn with_filter_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.filter_attribute = attribute.into();
        self
    }

    /// Set the input debounce using builder pattern.
    pub fn with_input_debounce(mut self, delay: Duration) -> Self {
        self.input_debounce_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The input debounce as a duration.
    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }

    /// The engine configuration derived from this one.
    pub fn combobox(&self) -> ComboboxConfig {
        ComboboxConfig {
            multiple: self.multiple,
            max_selected: self.max_selected,
            ctrl_bindings: self.ctrl_bindings,
        }
    }
}
