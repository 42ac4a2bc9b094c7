//! Committed output artifacts.
//!
//! A [`ProcessedResult`] is created once per successful commit and never
//! changes afterwards. Results live in a [`ResultList`] until the user
//! deletes them; nothing expires on its own.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The tool that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Operation {
    /// Page edits (rotation, deletion, order) materialized into a new PDF.
    Edit,
    /// Rotate selected pages by a fixed angle.
    Rotate,
    /// Extract a subset of pages.
    Split,
    /// Concatenate several documents.
    Merge,
    /// Place an image on a page.
    InsertImage,
    /// Place a signature image on a page.
    Signature,
    /// Encrypt the document with a password.
    Password,
    /// Recognized text of selected pages.
    Ocr,
    /// Synthesized speech of selected pages.
    TextToSpeech,
}

impl Operation {
    /// Human-readable operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Edit => "Edit pages",
            Operation::Rotate => "Rotate",
            Operation::Split => "Split",
            Operation::Merge => "Merge",
            Operation::InsertImage => "Insert image",
            Operation::Signature => "Sign",
            Operation::Password => "Password protect",
            Operation::Ocr => "OCR",
            Operation::TextToSpeech => "Text to speech",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque identifier of a [`ProcessedResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultId(Uuid);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable output artifact (PDF bytes, recognized text, or audio).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProcessedResult {
    id: ResultId,
    operation: Operation,
    filename: String,
    mime_type: &'static str,
    created_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(skip))]
    data: Vec<u8>,
}

impl ProcessedResult {
    /// Wrap freshly produced bytes, stamping a new id and the current time.
    pub fn new(
        operation: Operation,
        filename: impl Into<String>,
        mime_type: &'static str,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id: ResultId(Uuid::new_v4()),
            operation,
            filename: filename.into(),
            mime_type,
            created_at: Utc::now(),
            data,
        }
    }

    /// Result identifier.
    pub fn id(&self) -> ResultId {
        self.id
    }

    /// Operation that produced this result.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Suggested filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// MIME type of [`data`](Self::data).
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// In-memory result history, newest first.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    items: Vec<ProcessedResult>,
}

impl ResultList {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result at the front and return a reference to it.
    pub fn push(&mut self, result: ProcessedResult) -> &ProcessedResult {
        self.items.insert(0, result);
        &self.items[0]
    }

    /// Look up a result by id.
    pub fn get(&self, id: ResultId) -> Option<&ProcessedResult> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Remove a result. Returns it if it existed.
    pub fn delete(&mut self, id: ResultId) -> Option<ProcessedResult> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Results, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &ProcessedResult> {
        self.items.iter()
    }

    /// Number of retained results.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no results are retained.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
