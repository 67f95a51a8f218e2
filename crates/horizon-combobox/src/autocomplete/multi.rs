//! Multi-value selection.

use horizon_combobox_core::ElementId;
use horizon_combobox_core::logging::targets;

use super::AutoCompleteEvent;
use super::selection::{CommitOutcome, FollowUp, Selection, SelectionContext};
use super::value::{SetValue, decode_values, encode_values};
use crate::error::Result;

/// An ordered set of values stored on the container as a JSON array.
///
/// With a form name, the container carries one empty `base` hidden field
/// plus one `item` hidden field per value, so an empty selection still
/// submits the field name.
#[derive(Debug, Default)]
pub struct MultiSelection {
    values: Vec<String>,
    hidden_fields: Vec<ElementId>,
}

impl MultiSelection {
    /// Create the variant with no values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hidden form fields, base field first.
    pub fn hidden_fields(&self) -> &[ElementId] {
        &self.hidden_fields
    }

    fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    fn insert(&mut self, value: &str) {
        if !self.contains(value) {
            self.values.push(value.to_owned());
        }
    }

    fn clear_input(ctx: &SelectionContext<'_>) -> Result<()> {
        if !ctx.input_value().is_empty() {
            ctx.set_input_value("")?;
        }
        Ok(())
    }

    fn sync_container(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        ctx.set_container_value(&encode_values(&self.values)?)?;
        self.sync_hidden_fields(ctx)
    }

    fn sync_hidden_fields(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        if ctx.name.is_none() {
            return Ok(());
        }
        for field in self.hidden_fields.drain(..) {
            if ctx.doc.contains(field) {
                ctx.doc.remove(field)?;
            }
        }
        self.hidden_fields.push(ctx.insert_hidden_field("", "base")?);
        for value in &self.values {
            self.hidden_fields.push(ctx.insert_hidden_field(value, "item")?);
        }
        Ok(())
    }
}

impl Selection for MultiSelection {
    fn initialize(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        let raw = ctx.container_value();
        self.values.clear();
        if !raw.is_empty() {
            match decode_values(&raw) {
                Ok(values) => {
                    for value in values {
                        self.insert(&value);
                    }
                }
                Err(err) => {
                    tracing::debug!(target: targets::AUTOCOMPLETE, %err, "ignoring unparsable initial value");
                }
            }
        }
        self.sync_hidden_fields(ctx)
    }

    fn connect(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        for option in ctx.options() {
            if self.contains(&ctx.value_of(option)) {
                ctx.combobox.select(option);
            } else {
                ctx.combobox.deselect(option);
            }
        }
        Ok(())
    }

    fn disconnect(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        Self::clear_input(ctx)
    }

    fn destroy(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        self.values.clear();
        self.sync_container(ctx)
    }

    fn on_commit(&mut self, ctx: &SelectionContext<'_>, option: ElementId) -> Result<CommitOutcome> {
        Self::clear_input(ctx)?;

        let detail = ctx.detail(option);
        let event = if self.contains(&detail.value) {
            self.remove_value(ctx, &detail.value)?;
            AutoCompleteEvent::Deselect(detail)
        } else {
            self.set_value(ctx, &[SetValue::new(detail.value.clone())])?;
            AutoCompleteEvent::Select(detail)
        };

        tracing::debug!(target: targets::AUTOCOMPLETE, count = self.values.len(), "multi value toggled");
        Ok(CommitOutcome {
            event,
            follow_up: FollowUp::Refetch { reactivate: option },
        })
    }

    fn set_value(&mut self, ctx: &SelectionContext<'_>, values: &[SetValue]) -> Result<()> {
        if values.is_empty() {
            return self.destroy(ctx);
        }
        for value in values {
            self.insert(&value.value);
        }
        self.sync_container(ctx)
    }

    fn remove_value(&mut self, ctx: &SelectionContext<'_>, value: &str) -> Result<()> {
        if !self.contains(value) {
            return Ok(());
        }
        self.values.retain(|v| v != value);
        self.sync_container(ctx)
    }

    fn first_active_option(&self, ctx: &SelectionContext<'_>) -> Option<ElementId> {
        let visible = ctx.visible_options();
        visible
            .iter()
            .copied()
            .find(|&o| self.contains(&ctx.value_of(o)))
            .or_else(|| visible.first().copied())
    }

    fn values(&self, _ctx: &SelectionContext<'_>) -> Vec<String> {
        self.values.clone()
    }
}
