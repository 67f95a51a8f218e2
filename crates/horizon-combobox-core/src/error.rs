//! Error types for the element tree.

use crate::document::ElementId;

/// Result type for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Errors that can occur during document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The element handle is invalid or the element has been removed.
    #[error("Invalid or removed element {0:?}")]
    InvalidElement(ElementId),

    /// Attempted to make an element its own parent or ancestor.
    #[error("Cannot append {child:?} under {parent:?}: it is the parent or one of its ancestors")]
    CircularParentage {
        parent: ElementId,
        child: ElementId,
    },
}

impl DocumentError {
    /// Create a circular parentage error.
    pub fn circular(parent: ElementId, child: ElementId) -> Self {
        Self::CircularParentage { parent, child }
    }
}
