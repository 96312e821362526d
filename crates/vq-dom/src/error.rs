//! DOM operation errors
//!
//! Mirrors the DOMException names a browser would raise for the same calls.

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Malformed selector, or an empty class token
    #[error("SyntaxError: '{0}' is not a valid selector or token")]
    Syntax(String),

    /// Name or token containing characters the DOM rejects
    #[error("InvalidCharacterError: '{0}' contains an invalid character")]
    InvalidCharacter(String),

    /// Insertion that would break the tree (e.g. inserting an ancestor)
    #[error("HierarchyRequestError: {0}")]
    HierarchyRequest(&'static str),

    /// Operation the target node does not expose
    #[error("NotSupportedError: {0}")]
    NotSupported(&'static str),

    /// Node is not where the operation expected it
    #[error("NotFoundError: {0}")]
    NotFound(&'static str),

    /// Qualified name whose prefix does not fit the namespace
    #[error("NamespaceError: '{0}' is not valid in this namespace")]
    Namespace(String),

    /// Node owned by a different document
    #[error("WrongDocumentError: node belongs to another document")]
    WrongDocument,
}
