//! Option providers.
//!
//! An [`OptionSource`] answers a query with the options to show. The
//! autocomplete replaces the list children with the returned options and
//! re-initializes them. Without a source the autocomplete filters the
//! options already in the list.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Description of one option produced by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSpec {
    /// Element identifier; generated when absent.
    pub id: Option<String>,
    /// Display text.
    pub label: String,
    /// Submitted value; the label is used when absent.
    pub value: Option<String>,
    /// Rendered with `aria-disabled="true"`.
    pub disabled: bool,
}

impl OptionSpec {
    /// An enabled option with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the value using builder pattern.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the identifier using builder pattern.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the disabled flag using builder pattern.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Produces options for a query.
pub trait OptionSource: Send + Sync {
    /// Options matching `query`, in display order.
    fn fetch(&self, query: &str) -> Result<Vec<OptionSpec>>;
}

impl<F> OptionSource for F
where
    F: Fn(&str) -> Result<Vec<OptionSpec>> + Send + Sync,
{
    fn fetch(&self, query: &str) -> Result<Vec<OptionSpec>> {
        self(query)
    }
}

/// A fixed set of options filtered by case-insensitive label match.
#[derive(Debug, Clone, Default)]
pub struct StaticOptionSource {
    options: Vec<OptionSpec>,
}

impl StaticOptionSource {
    /// Create a source over `options`.
    pub fn new(options: Vec<OptionSpec>) -> Self {
        Self { options }
    }
}

impl OptionSource for StaticOptionSource {
    fn fetch(&self, query: &str) -> Result<Vec<OptionSpec>> {
        let query = query.to_lowercase();
        Ok(self
            .options
            .iter()
            .filter(|o| query.is_empty() || o.label.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_static_source_filters_by_label() {
        let source = StaticOptionSource::new(vec![
            OptionSpec::new("Apple"),
            OptionSpec::new("Banana"),
            OptionSpec::new("Pineapple"),
        ]);

        let labels: Vec<String> = source
            .fetch("APP")
            .unwrap()
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["Apple", "Pineapple"]);
        assert_eq!(source.fetch("").unwrap().len(), 3);
    }

    #[test]
    fn test_closure_source() {
        let source = |query: &str| -> Result<Vec<OptionSpec>> {
            if query == "fail" {
                Err(Error::source_failed(query, "offline"))
            } else {
                Ok(vec![OptionSpec::new(query).with_value("v")])
            }
        };

        assert_eq!(source.fetch("x").unwrap()[0].value.as_deref(), Some("v"));
        assert!(source.fetch("fail").is_err());
    }
}
