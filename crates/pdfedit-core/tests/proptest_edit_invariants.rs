//! Property-based invariant tests for page edit snapshots.
//!
//! For any sequence of edits applied to a freshly initialized state:
//!
//! 1. The record count never changes.
//! 2. The original indices always form a permutation of 1..=n.
//! 3. The set of record ids never changes.
//! 4. Every rotation stays a multiple of 90.
//! 5. Right-then-left leaves a page's rotation untouched.
//! 6. Deleted records never rotate again.
//! 7. Applying an edit never modifies the input snapshot.

use std::collections::BTreeSet;

use pdfedit_core::{PageEditState, RotationDirection, Selection};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Edit {
    Rotate(usize, bool),
    Delete(usize),
    Move(usize, usize),
    Bulk(Vec<usize>, i32),
}

fn edit(max_pages: usize) -> impl Strategy<Value = Edit> {
    prop_oneof![
        (1..=max_pages, any::<bool>()).prop_map(|(p, right)| Edit::Rotate(p, right)),
        (1..=max_pages).prop_map(Edit::Delete),
        (0..max_pages, 0..max_pages).prop_map(|(a, b)| Edit::Move(a, b)),
        (
            proptest::collection::vec(1..=max_pages, 0..4),
            prop_oneof![Just(90), Just(180), Just(270), Just(-90)]
        )
            .prop_map(|(pages, angle)| Edit::Bulk(pages, angle)),
    ]
}

fn direction(right: bool) -> RotationDirection {
    if right {
        RotationDirection::Right
    } else {
        RotationDirection::Left
    }
}

fn apply(state: &PageEditState, edit: &Edit) -> PageEditState {
    match edit {
        Edit::Rotate(page, right) => state.rotate(*page, direction(*right)),
        Edit::Delete(page) => state.delete(*page),
        Edit::Move(from, to) => state
            .move_record(*from % state.len(), *to % state.len())
            .unwrap(),
        Edit::Bulk(pages, angle) => state
            .bulk_rotate(&Selection::from_pages(pages.iter().copied()), *angle)
            .unwrap(),
    }
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Edit>)> {
    (1usize..=12).prop_flat_map(|n| (Just(n), proptest::collection::vec(edit(n), 0..40)))
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Structural invariants survive any edit sequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn structure_is_preserved((n, edits) in scenario()) {
        let initial = PageEditState::initialize(n).unwrap();
        let ids: BTreeSet<_> = initial.ids().into_iter().collect();

        let mut state = initial.clone();
        for e in &edits {
            state = apply(&state, e);
        }

        prop_assert_eq!(state.len(), n);

        let mut indices: Vec<usize> = state.records().iter().map(|r| r.original_index()).collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (1..=n).collect::<Vec<_>>());

        let after: BTreeSet<_> = state.ids().into_iter().collect();
        prop_assert_eq!(after, ids);

        for record in state.records() {
            prop_assert_eq!(record.rotation() % 90, 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Rotation additivity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn right_then_left_is_identity((n, edits) in scenario(), page in 1usize..=12) {
        let mut state = PageEditState::initialize(n).unwrap();
        for e in &edits {
            state = apply(&state, e);
        }
        let page = (page - 1) % n + 1;
        let before = state.get(page).unwrap().rotation();
        let after = state
            .rotate(page, RotationDirection::Right)
            .rotate(page, RotationDirection::Left);
        prop_assert_eq!(after.get(page).unwrap().rotation(), before);
    }

    #[test]
    fn four_right_turns_accumulate(n in 1usize..=12, page in 1usize..=12) {
        let page = (page - 1) % n + 1;
        let mut state = PageEditState::initialize(n).unwrap();
        for _ in 0..4 {
            state = state.rotate(page, RotationDirection::Right);
        }
        prop_assert_eq!(state.get(page).unwrap().rotation(), 360);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Deleted records are frozen
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn deleted_records_never_rotate((n, edits) in scenario(), page in 1usize..=12) {
        let page = (page - 1) % n + 1;
        let mut state = PageEditState::initialize(n).unwrap().delete(page);
        let frozen = state.get(page).unwrap().rotation();
        for e in &edits {
            state = apply(&state, e);
        }
        let record = state.get(page).unwrap();
        prop_assert!(record.is_deleted());
        prop_assert_eq!(record.rotation(), frozen);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Snapshots are immutable
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edits_do_not_touch_input((n, edits) in scenario()) {
        let mut state = PageEditState::initialize(n).unwrap();
        for e in &edits {
            let before = state.clone();
            let next = apply(&state, e);
            prop_assert_eq!(&state, &before);
            state = next;
        }
    }
}
