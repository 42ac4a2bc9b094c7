//! Edit mutators over [`PageEditState`].
//!
//! Every mutator borrows the current snapshot and returns a new one; the
//! input is never modified. Missing or deleted targets are no-ops rather
//! than errors, except for [`reorder`](PageEditState::reorder), which
//! rejects anything but an exact permutation.

use std::collections::{HashMap, HashSet};

use crate::error::EditError;
use crate::page_state::{PageEditState, PageId};
use crate::selection::Selection;

/// Direction of a single quarter-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RotationDirection {
    /// Counter-clockwise, −90°.
    Left,
    /// Clockwise, +90°.
    Right,
}

impl RotationDirection {
    /// Signed degrees for one step in this direction.
    pub fn degrees(self) -> i32 {
        match self {
            RotationDirection::Left => -90,
            RotationDirection::Right => 90,
        }
    }
}

impl std::str::FromStr for RotationDirection {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" | "ccw" => Ok(RotationDirection::Left),
            "right" | "r" | "cw" => Ok(RotationDirection::Right),
            other => Err(EditError::InvalidInput(format!(
                "unknown rotation direction '{other}' (expected left or right)"
            ))),
        }
    }
}

impl PageEditState {
    /// Rotate one page a quarter-turn.
    ///
    /// No-op if `original_index` has no record, the record is deleted, or
    /// its accumulated rotation is already at the `i32` limit.
    #[must_use]
    pub fn rotate(&self, original_index: usize, direction: RotationDirection) -> Self {
        let mut next = self.clone();
        if let Some(record) = next
            .records
            .iter_mut()
            .find(|r| r.original_index == original_index && !r.is_deleted)
        {
            if let Some(rotation) = record.rotation.checked_add(direction.degrees()) {
                record.rotation = rotation;
            }
        }
        next
    }

    /// Soft-delete one page. Idempotent.
    #[must_use]
    pub fn delete(&self, original_index: usize) -> Self {
        let mut next = self.clone();
        if let Some(record) = next
            .records
            .iter_mut()
            .find(|r| r.original_index == original_index)
        {
            record.is_deleted = true;
        }
        next
    }

    /// Add `angle` to every non-deleted record targeted by `selection`.
    ///
    /// An empty selection targets every non-deleted record. Members of a
    /// non-empty selection that refer to deleted pages are stale and are
    /// skipped, so a selection made up only of deleted pages rotates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if `angle` is not a multiple of 90
    /// or a targeted record's accumulated rotation would overflow.
    pub fn bulk_rotate(&self, selection: &Selection, angle: i32) -> Result<Self, EditError> {
        if angle % 90 != 0 {
            return Err(EditError::InvalidInput(format!(
                "rotation angle must be a multiple of 90, got {angle}"
            )));
        }
        let apply_to_all = selection.is_empty();
        let mut next = self.clone();
        for record in next.records.iter_mut().filter(|r| !r.is_deleted) {
            if apply_to_all || selection.contains(record.original_index) {
                record.rotation = record.rotation.checked_add(angle).ok_or_else(|| {
                    EditError::InvalidInput(format!(
                        "rotating page {} by {angle} overflows its accumulated rotation",
                        record.original_index
                    ))
                })?;
            }
        }
        Ok(next)
    }

    /// Replace the list order with `new_order`, a permutation of the current
    /// record ids. Rotation and deletion flags travel with their records.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if `new_order` adds, drops, or
    /// duplicates an id.
    pub fn reorder(&self, new_order: &[PageId]) -> Result<Self, EditError> {
        if new_order.len() != self.records.len() {
            return Err(EditError::InvalidReorder(format!(
                "expected {} ids, got {}",
                self.records.len(),
                new_order.len()
            )));
        }

        let by_id: HashMap<PageId, usize> = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id, pos))
            .collect();

        let mut seen = HashSet::with_capacity(new_order.len());
        let mut records = Vec::with_capacity(new_order.len());
        for id in new_order {
            let pos = *by_id
                .get(id)
                .ok_or_else(|| EditError::InvalidReorder(format!("unknown page id {id}")))?;
            if !seen.insert(*id) {
                return Err(EditError::InvalidReorder(format!("duplicate page id {id}")));
            }
            records.push(self.records[pos].clone());
        }
        Ok(Self { records })
    }

    /// Move the record at list position `from` to list position `to`,
    /// shifting the records in between. This is the drop step of a
    /// drag-and-drop, expressed through [`reorder`](Self::reorder).
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if either position is outside
    /// the list.
    pub fn move_record(&self, from: usize, to: usize) -> Result<Self, EditError> {
        let len = self.records.len();
        if from >= len || to >= len {
            return Err(EditError::InvalidReorder(format!(
                "move {from} -> {to} outside list of {len} records"
            )));
        }
        let mut ids = self.ids();
        let id = ids.remove(from);
        ids.insert(to, id);
        self.reorder(&ids)
    }

    /// Reorder by source page numbers instead of ids.
    ///
    /// `pages` must list every source page exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if `pages` is not a permutation
    /// of `1..=len`.
    pub fn reorder_by_pages(&self, pages: &[usize]) -> Result<Self, EditError> {
        let ids = pages
            .iter()
            .map(|&page| {
                self.get(page)
                    .map(|r| r.id)
                    .ok_or_else(|| EditError::InvalidReorder(format!("unknown page {page}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.reorder(&ids)
    }
}
