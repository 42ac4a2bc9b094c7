//! Error and option types for pdfedit.
//!
//! Provides [`EditError`] for every failure the edit pipeline can surface,
//! and [`EditOptions`] for configuring resource limits and reconciliation
//! behavior.

use std::fmt;

/// Fatal error types for page editing and reconciliation.
///
/// Mutator-level errors ([`InvalidInput`](EditError::InvalidInput),
/// [`InvalidReorder`](EditError::InvalidReorder)) reject a single edit and
/// leave the previous snapshot intact. Reconciliation errors abort the
/// whole commit; no partial output is ever produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    /// Malformed arguments (e.g. a non-positive page count).
    InvalidInput(String),
    /// A reorder did not supply an exact permutation of the current ids.
    InvalidReorder(String),
    /// A 1-based page number outside `[1, page_count]`.
    IndexOutOfRange {
        /// The offending 1-based page number.
        index: usize,
        /// Number of pages in the addressed document.
        page_count: usize,
    },
    /// Reconciliation would produce a document without pages.
    EmptyDocument,
    /// A failure reported by the document library or a network service.
    ExternalServiceFailure(String),
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// The PDF is encrypted and cannot be edited without a password.
    PasswordRequired,
    /// The supplied password does not decrypt the PDF.
    InvalidPassword,
    /// I/O error reading or writing PDF data.
    IoError(String),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EditError::InvalidReorder(msg) => write!(f, "invalid reorder: {msg}"),
            EditError::IndexOutOfRange { index, page_count } => write!(
                f,
                "page {index} out of range (document has {page_count} pages)"
            ),
            EditError::EmptyDocument => {
                write!(f, "cannot produce a document with no pages")
            }
            EditError::ExternalServiceFailure(msg) => {
                write!(f, "external service failure: {msg}")
            }
            EditError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            EditError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            EditError::InvalidPassword => write!(f, "the supplied password is incorrect"),
            EditError::IoError(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<std::io::Error> for EditError {
    fn from(err: std::io::Error) -> Self {
        EditError::IoError(err.to_string())
    }
}

impl EditError {
    /// Returns true for errors that reject a single edit and can be
    /// corrected by the user without reloading the document.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EditError::InvalidInput(_)
                | EditError::InvalidReorder(_)
                | EditError::IndexOutOfRange { .. }
                | EditError::EmptyDocument
        )
    }
}

/// Options controlling document loading and reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EditOptions {
    /// Wrap cumulative rotation into `[0, 360)` when writing output pages
    /// (default: false, the accumulated value is written as-is).
    pub normalize_rotation: bool,
    /// Maximum input PDF size in bytes (default: None = no limit).
    pub max_input_bytes: Option<usize>,
    /// Maximum number of pages in a source document (default: None = no limit).
    pub max_pages: Option<usize>,
}

impl EditOptions {
    /// Check `len` against [`max_input_bytes`](Self::max_input_bytes).
    pub fn check_input_size(&self, len: usize) -> Result<(), EditError> {
        match self.max_input_bytes {
            Some(limit) if len > limit => Err(EditError::ResourceLimitExceeded {
                limit_name: "max_input_bytes".to_string(),
                limit_value: limit,
                actual_value: len,
            }),
            _ => Ok(()),
        }
    }

    /// Check `count` against [`max_pages`](Self::max_pages).
    pub fn check_page_count(&self, count: usize) -> Result<(), EditError> {
        match self.max_pages {
            Some(limit) if count > limit => Err(EditError::ResourceLimitExceeded {
                limit_name: "max_pages".to_string(),
                limit_value: limit,
                actual_value: count,
            }),
            _ => Ok(()),
        }
    }

    /// Apply the configured normalization to a cumulative rotation.
    pub fn output_rotation(&self, degrees: i32) -> i32 {
        if self.normalize_rotation {
            degrees.rem_euclid(360)
        } else {
            degrees
        }
    }
}
