//! Selected values and their serialized forms.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A value to select, optionally with the label to display for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValue {
    /// The submitted value.
    pub value: String,
    /// Display label; looked up from the matching option when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SetValue {
    /// A value without an explicit label.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    /// A value with an explicit label.
    pub fn with_label(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }
}

impl From<&str> for SetValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SetValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Parse a JSON array of values. Numbers and booleans are kept in their
/// textual form; nested arrays and objects are rejected.
pub fn decode_values(raw: &str) -> Result<Vec<String>> {
    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|err| Error::invalid_value(raw, err))?;

    parsed
        .into_iter()
        .map(|item| match item {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            serde_json::Value::Bool(b) => Ok(b.to_string()),
            other => {
                let err = <serde_json::Error as serde::de::Error>::custom(format!(
                    "expected a string or number, found {other}"
                ));
                Err(Error::invalid_value(raw, err))
            }
        })
        .collect()
}

/// Serialize values as a JSON array of strings.
pub fn encode_values(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(|err| Error::invalid_value(values.join(","), err))
}
