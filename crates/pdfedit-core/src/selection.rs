//! Page selection model.
//!
//! A [`Selection`] is a set of 1-based source page numbers that scopes bulk
//! operations. It is independent of [`PageEditState`]: deleting a page does
//! not prune it from the selection. Stale members are filtered out whenever
//! the selection is read against a state (see [`Selection::effective`]).

use std::collections::BTreeSet;

use crate::page_state::PageEditState;

/// Set of selected source page numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pages: BTreeSet<usize>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection containing exactly `pages`.
    pub fn from_pages(pages: impl IntoIterator<Item = usize>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    /// Add `page` if absent, remove it if present.
    #[must_use]
    pub fn toggle(&self, page: usize) -> Self {
        let mut pages = self.pages.clone();
        if !pages.remove(&page) {
            pages.insert(page);
        }
        Self { pages }
    }

    /// Select every non-deleted page, or clear the selection if every
    /// non-deleted page is already selected.
    #[must_use]
    pub fn select_all(&self, state: &PageEditState) -> Self {
        let all: BTreeSet<usize> = state.active_records().map(|r| r.original_index()).collect();
        let effective: BTreeSet<usize> = self.effective(state).into_iter().collect();
        if !all.is_empty() && effective == all {
            Self::new()
        } else {
            Self { pages: all }
        }
    }

    /// Selected pages that still refer to non-deleted records, ascending.
    pub fn effective(&self, state: &PageEditState) -> Vec<usize> {
        self.pages
            .iter()
            .copied()
            .filter(|&page| state.is_active(page))
            .collect()
    }

    /// Raw membership, stale members included.
    pub fn contains(&self, page: usize) -> bool {
        self.pages.contains(&page)
    }

    /// True if nothing has been selected.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of raw members.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Raw members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.pages.iter().copied()
    }
}
