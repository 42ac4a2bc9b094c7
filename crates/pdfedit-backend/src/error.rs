//! Error types for the backend layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps backend-specific errors and converts them to [`EditError`].

use pdfedit_core::EditError;
use thiserror::Error;

/// Error type for document provider operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The input could not be parsed as a PDF, or its object graph is broken.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// The output document could not be serialized.
    #[error("PDF write error: {0}")]
    Write(String),

    /// An image could not be decoded for embedding.
    #[error("image error: {0}")]
    Image(String),

    /// Error reading input data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] EditError),
}

impl From<BackendError> for EditError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(_) | BackendError::Write(_) => {
                EditError::ExternalServiceFailure(err.to_string())
            }
            BackendError::Image(msg) => EditError::InvalidInput(format!("unsupported image: {msg}")),
            BackendError::Io(e) => EditError::IoError(e.to_string()),
            BackendError::Core(e) => e,
        }
    }
}

impl From<image::ImageError> for BackendError {
    fn from(err: image::ImageError) -> Self {
        BackendError::Image(err.to_string())
    }
}
