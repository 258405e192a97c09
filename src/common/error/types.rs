//! Error type shared by the content model, field engine, and persistence layer.
use thiserror::Error;

/// Main error type for quire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while loading or saving a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument does not fit the target, e.g. a reference node that is not
    /// part of the paragraph being edited
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The document tree is malformed, e.g. a body without paragraphs
    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    /// Unrecognized or undecodable document format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Shorthand for [`Error::StructuralInvariant`].
    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        Self::StructuralInvariant(msg.into())
    }
}

/// Result type for quire operations.
pub type Result<T> = std::result::Result<T, Error>;
