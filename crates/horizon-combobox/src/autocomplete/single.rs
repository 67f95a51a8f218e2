//! Single-value selection.

use horizon_combobox_core::ElementId;
use horizon_combobox_core::logging::targets;

use super::AutoCompleteEvent;
use super::selection::{CommitOutcome, FollowUp, Selection, SelectionContext};
use super::value::SetValue;
use crate::error::Result;

/// Keeps one value and its label on the container (`value`, `data-label`)
/// and mirrors the label into the input.
#[derive(Debug, Default)]
pub struct SingleSelection {
    hidden_field: Option<ElementId>,
}

impl SingleSelection {
    /// Create the variant. Nothing is written until
    /// [`initialize`](Selection::initialize).
    pub fn new() -> Self {
        Self::default()
    }

    /// The hidden form field, if the widget has a form name.
    pub fn hidden_field(&self) -> Option<ElementId> {
        self.hidden_field
    }

    fn may_select(ctx: &SelectionContext<'_>, value: &str, option: ElementId) -> bool {
        !value.is_empty() && ctx.value_of(option) == value
    }

    fn selected_option(ctx: &SelectionContext<'_>) -> Option<ElementId> {
        let value = ctx.container_value();
        ctx.options()
            .into_iter()
            .find(|&o| Self::may_select(ctx, &value, o))
    }

    fn set_hidden_value(&self, ctx: &SelectionContext<'_>, value: &str) -> Result<()> {
        if let Some(field) = self.hidden_field
            && ctx.doc.contains(field)
        {
            ctx.doc.set_value(field, value)?;
        }
        Ok(())
    }

    fn remove(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        ctx.set_container_value("")?;
        ctx.set_container_label("")?;
        self.set_hidden_value(ctx, "")?;
        ctx.set_input_value("")
    }
}

impl Selection for SingleSelection {
    fn initialize(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        if ctx.container_label().is_empty()
            && let Some(option) = Self::selected_option(ctx)
        {
            ctx.set_container_label(&ctx.label_of(option))?;
        }

        ctx.set_input_value(&ctx.container_label())?;
        if ctx.name.is_some() {
            self.hidden_field = Some(ctx.insert_hidden_field(&ctx.container_value(), "base")?);
        }
        Ok(())
    }

    fn connect(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        if let Some(option) = Self::selected_option(ctx) {
            ctx.combobox.select(option);
        }
        Ok(())
    }

    fn disconnect(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        let label = ctx.container_label();
        if ctx.input_value() != label {
            ctx.set_input_value(&label)?;
        }
        Ok(())
    }

    fn destroy(&mut self, ctx: &SelectionContext<'_>) -> Result<()> {
        self.remove(ctx)
    }

    fn on_commit(&mut self, ctx: &SelectionContext<'_>, option: ElementId) -> Result<CommitOutcome> {
        let detail = ctx.detail(option);
        ctx.set_container_value(&detail.value)?;
        ctx.set_container_label(&detail.label)?;
        self.set_hidden_value(ctx, &detail.value)?;
        ctx.set_input_value(&detail.label)?;

        tracing::debug!(target: targets::AUTOCOMPLETE, value = %detail.value, "single value committed");
        Ok(CommitOutcome {
            event: AutoCompleteEvent::Select(detail),
            follow_up: FollowUp::CloseList,
        })
    }

    fn set_value(&mut self, ctx: &SelectionContext<'_>, values: &[SetValue]) -> Result<()> {
        let Some(first) = values.first() else {
            return self.remove(ctx);
        };

        ctx.set_container_value(&first.value)?;
        self.set_hidden_value(ctx, &first.value)?;
        let label = match &first.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => Self::selected_option(ctx)
                .map(|o| ctx.label_of(o))
                .unwrap_or_default(),
        };
        ctx.set_container_label(&label)?;
        ctx.set_input_value(&label)
    }

    fn remove_value(&mut self, ctx: &SelectionContext<'_>, _value: &str) -> Result<()> {
        self.remove(ctx)
    }

    fn first_active_option(&self, ctx: &SelectionContext<'_>) -> Option<ElementId> {
        let value = ctx.container_value();
        let visible = ctx.visible_options();
        visible
            .iter()
            .copied()
            .find(|&o| Self::may_select(ctx, &value, o))
            .or_else(|| visible.first().copied())
    }

    fn values(&self, ctx: &SelectionContext<'_>) -> Vec<String> {
        let value = ctx.container_value();
        if value.is_empty() { Vec::new() } else { vec![value] }
    }
}
