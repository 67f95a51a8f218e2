//! Error types for the combobox widgets.

use horizon_combobox_core::DocumentError;

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the combobox widgets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An element handle was invalid or the tree was inconsistent.
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// An option source failed to produce options.
    #[error("Option source failed for query '{query}': {message}")]
    Source { query: String, message: String },

    /// A serialized value could not be parsed.
    #[error("Invalid value '{value}': {source}")]
    InvalidValue {
        value: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an option source error.
    pub fn source_failed(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a value parsing error.
    pub fn invalid_value(value: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidValue {
            value: value.into(),
            source,
        }
    }
}
