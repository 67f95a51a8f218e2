//! Selection variants of the autocomplete widget.
//!
//! The engine only knows about `aria-selected`. A [`Selection`] turns an
//! engine commit into a change of the widget's value, keeps the container
//! attributes and hidden form fields in sync, and restores `aria-selected`
//! on the options every time the list is (re)populated.

use horizon_combobox_core::logging::targets;
use horizon_combobox_core::{ElementId, SharedDocument, branded_id};

use super::value::SetValue;
use super::{AutoCompleteEvent, CommitDetail};
use crate::aria;
use crate::combobox::Combobox;
use crate::error::Result;
use crate::option;

/// What the widget does after a selection variant handled a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Close the list, then announce the event.
    CloseList,
    /// Announce the event, refetch with an empty query and highlight the
    /// committed option again (or the first visible one).
    Refetch { reactivate: ElementId },
}

/// Result of [`Selection::on_commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// `Select` or `Deselect`.
    pub event: AutoCompleteEvent,
    /// Follow-up work for the widget.
    pub follow_up: FollowUp,
}

/// Everything a selection variant may touch.
pub struct SelectionContext<'a> {
    pub doc: &'a SharedDocument,
    pub container: ElementId,
    pub input: ElementId,
    pub combobox: &'a Combobox,
    /// Form field name, if hidden fields are wanted.
    pub name: Option<&'a str>,
}

impl SelectionContext<'_> {
    /// All options in list order.
    pub fn options(&self) -> Vec<ElementId> {
        self.combobox.options()
    }

    /// Options not carrying their own `hidden` attribute.
    pub fn visible_options(&self) -> Vec<ElementId> {
        self.doc.with_read(|d| {
            self.combobox
                .options()
                .into_iter()
                .filter(|&o| !d.has_attribute(o, aria::HIDDEN))
                .collect()
        })
    }

    /// The submitted value of `option`.
    pub fn value_of(&self, option: ElementId) -> String {
        self.doc
            .with_read(|d| option::option_value(d, option))
            .unwrap_or_default()
    }

    /// The display label of `option`.
    pub fn label_of(&self, option: ElementId) -> String {
        self.doc
            .with_read(|d| option::option_label(d, option))
            .unwrap_or_default()
    }

    /// Commit payload for `option`.
    pub fn detail(&self, option: ElementId) -> CommitDetail {
        CommitDetail {
            option,
            value: self.value_of(option),
            label: self.label_of(option),
        }
    }

    /// The container's `value` attribute.
    pub fn container_value(&self) -> String {
        self.doc
            .attribute(self.container, aria::VALUE)
            .unwrap_or_default()
    }

    /// Set the container's `value`; empty values and `[]` remove it.
    pub fn set_container_value(&self, value: &str) -> Result<()> {
        if value.is_empty() || value == "[]" {
            self.doc.remove_attribute(self.container, aria::VALUE)?;
        } else {
            self.doc.set_attribute(self.container, aria::VALUE, value)?;
        }
        Ok(())
    }

    /// The container's `data-label` attribute.
    pub fn container_label(&self) -> String {
        self.doc
            .attribute(self.container, aria::DATA_LABEL)
            .unwrap_or_default()
    }

    /// Set the container's `data-label`; an empty label removes it.
    pub fn set_container_label(&self, label: &str) -> Result<()> {
        if label.is_empty() {
            self.doc.remove_attribute(self.container, aria::DATA_LABEL)?;
        } else {
            self.doc.set_attribute(self.container, aria::DATA_LABEL, label)?;
        }
        Ok(())
    }

    /// The text currently in the input.
    pub fn input_value(&self) -> String {
        self.doc.value(self.input).unwrap_or_default()
    }

    /// Replace the text in the input.
    pub fn set_input_value(&self, value: &str) -> Result<()> {
        self.doc.set_value(self.input, value)?;
        Ok(())
    }

    /// Append a hidden form field to the container.
    pub fn insert_hidden_field(&self, value: &str, variant: &str) -> Result<ElementId> {
        let name = self.name.unwrap_or_default();
        let id = branded_id();
        let field = self.doc.create_child(
            self.container,
            "input",
            [
                (aria::TYPE, "hidden"),
                (aria::NAME, name),
                (aria::ID, id.as_str()),
                (aria::DATA_VARIANT, variant),
            ],
            "",
        )?;
        self.doc.set_value(field, value)?;
        tracing::trace!(target: targets::AUTOCOMPLETE, ?field, name, value, variant, "inserted hidden field");
        Ok(field)
    }
}

/// A selection behaviour plugged into the autocomplete widget.
pub trait Selection: Send {
    /// Called once when the widget is created.
    fn initialize(&mut self, ctx: &SelectionContext<'_>) -> Result<()>;

    /// Called before the list is shown and after options are (re)populated.
    fn connect(&mut self, ctx: &SelectionContext<'_>) -> Result<()>;

    /// Called before the list is hidden.
    fn disconnect(&mut self, ctx: &SelectionContext<'_>) -> Result<()>;

    /// Forget the whole value.
    fn destroy(&mut self, ctx: &SelectionContext<'_>) -> Result<()>;

    /// Handle a committed, enabled option.
    fn on_commit(&mut self, ctx: &SelectionContext<'_>, option: ElementId) -> Result<CommitOutcome>;

    /// Replace (single) or extend (multiple) the value.
    fn set_value(&mut self, ctx: &SelectionContext<'_>, values: &[SetValue]) -> Result<()>;

    /// Remove one value.
    fn remove_value(&mut self, ctx: &SelectionContext<'_>, value: &str) -> Result<()>;

    /// The option to highlight when the list opens.
    fn first_active_option(&self, ctx: &SelectionContext<'_>) -> Option<ElementId>;

    /// The current value(s).
    fn values(&self, ctx: &SelectionContext<'_>) -> Vec<String>;
}
