//! Page edit state store.
//!
//! A [`PageEditState`] is an immutable snapshot: an ordered list of
//! [`PageEditRecord`]s, one per source page. List order is the output order;
//! [`original_index`](PageEditRecord::original_index) ties each record back to
//! its page in the source document regardless of where it has been moved.

use std::fmt;

use uuid::Uuid;

use crate::error::EditError;

/// Stable identity of a page record, used as the reorder / drag key.
///
/// Ids are random (v4) and are never shared between two states created by
/// separate [`PageEditState::initialize`] calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageId(Uuid);

impl PageId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PageId {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(PageId)
            .map_err(|e| EditError::InvalidInput(format!("malformed page id '{s}': {e}")))
    }
}

/// Edit overlay for a single source page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageEditRecord {
    pub(crate) id: PageId,
    pub(crate) original_index: usize,
    pub(crate) rotation: i32,
    pub(crate) is_deleted: bool,
}

impl PageEditRecord {
    /// Stable record identity.
    pub fn id(&self) -> PageId {
        self.id
    }

    /// 1-based position of the page in the source document.
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    /// Accumulated rotation delta in degrees (multiple of 90, unwrapped).
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Whether the page has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

/// Ordered snapshot of page edit records for one editing session.
///
/// # Example
///
/// ```
/// use pdfedit_core::{PageEditState, RotationDirection};
///
/// let state = PageEditState::initialize(3).unwrap();
/// let state = state.rotate(2, RotationDirection::Right);
/// assert_eq!(state.get(2).unwrap().rotation(), 90);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageEditState {
    pub(crate) records: Vec<PageEditRecord>,
}

impl PageEditState {
    /// Create one record per source page: `original_index` 1..=page_count in
    /// order, rotation 0, not deleted, each with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if `page_count` is zero.
    pub fn initialize(page_count: usize) -> Result<Self, EditError> {
        if page_count == 0 {
            return Err(EditError::InvalidInput(
                "page count must be positive".to_string(),
            ));
        }
        let records = (1..=page_count)
            .map(|original_index| PageEditRecord {
                id: PageId::generate(),
                original_index,
                rotation: 0,
                is_deleted: false,
            })
            .collect();
        Ok(Self { records })
    }

    /// All records in output order, deleted ones included.
    pub fn records(&self) -> &[PageEditRecord] {
        &self.records
    }

    /// Number of records (equal to the source page count).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a state built by [`initialize`](Self::initialize).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Non-deleted records in output order.
    pub fn active_records(&self) -> impl Iterator<Item = &PageEditRecord> {
        self.records.iter().filter(|r| !r.is_deleted)
    }

    /// Number of non-deleted records.
    pub fn active_count(&self) -> usize {
        self.active_records().count()
    }

    /// Record for a 1-based source page number.
    pub fn get(&self, original_index: usize) -> Option<&PageEditRecord> {
        self.records
            .iter()
            .find(|r| r.original_index == original_index)
    }

    /// Record by id.
    pub fn get_by_id(&self, id: PageId) -> Option<&PageEditRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// True if the source page exists and is not deleted.
    pub fn is_active(&self, original_index: usize) -> bool {
        self.get(original_index).is_some_and(|r| !r.is_deleted)
    }

    /// Record ids in current list order.
    pub fn ids(&self) -> Vec<PageId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Source page numbers of the non-deleted records, in output order.
    pub fn output_order(&self) -> Vec<usize> {
        self.active_records().map(|r| r.original_index).collect()
    }

    /// True when no record carries a rotation, deletion, or reorder.
    pub fn is_pristine(&self) -> bool {
        self.records
            .iter()
            .enumerate()
            .all(|(i, r)| r.rotation == 0 && !r.is_deleted && r.original_index == i + 1)
    }
}
