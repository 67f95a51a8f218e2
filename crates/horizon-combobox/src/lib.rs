//! Horizon Combobox - accessible listbox widgets on a host element tree.
//!
//! This crate provides two layers:
//!
//! - [`Combobox`]: the interaction engine binding a text input to a list of
//!   option elements (ARIA contract, active option, selection rules,
//!   keyboard and pointer protocols, commit notification)
//! - [`AutoComplete`]: a widget built on the engine that opens and filters
//!   the list, fetches options from an [`OptionSource`] and keeps a single
//!   or multiple selected value
//!
//! The element tree, events and signals live in [`horizon_combobox_core`].
//!
//! # Example
//!
//! ```
//! use horizon_combobox::{Combobox, ComboboxConfig};
//! use horizon_combobox_core::{DomEvent, SharedDocument};
//!
//! let doc = SharedDocument::new();
//! let input = doc.create_element("input");
//! let list = doc.create_element("ul");
//! let first = doc.create_child(list, "li", [("role", "option")], "First").unwrap();
//! doc.create_child(list, "li", [("role", "option")], "Second").unwrap();
//!
//! let combobox = Combobox::new(doc.clone(), input, list, ComboboxConfig::new()).unwrap();
//! combobox.start();
//! doc.dispatch(&mut DomEvent::click(first));
//! assert_eq!(combobox.selected_options(), vec![first]);
//! ```

pub mod aria;
pub mod autocomplete;
mod combobox;
mod config;
mod error;
pub mod option;

pub use autocomplete::{
    AutoComplete, AutoCompleteEvent, CommitDetail, MultiSelection, OptionSource, OptionSpec,
    Selection, SetValue, SingleSelection, StaticOptionSource,
};
pub use combobox::{Combobox, CommitEvent};
pub use config::{
    AutoCompleteConfig, ComboboxConfig, DEFAULT_CTRL_BINDINGS, DEFAULT_INPUT_DEBOUNCE_MS,
};
pub use error::{Error, Result};
pub use option::{Direction, ListboxState, OptionState, SelectionMode};
