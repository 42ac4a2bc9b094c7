//! pdfedit-core: Backend-independent page edit model.
//!
//! This crate provides the edit overlay ([`PageEditState`], [`PageEditRecord`]),
//! the pure mutators that derive new snapshots from old ones, the page
//! [`Selection`] model, and the result history. Nothing here touches PDF
//! bytes; reconciliation lives in `pdfedit-backend`.

/// Pure mutators: rotate, delete, bulk rotate, reorder.
pub mod edits;
/// Error and option types.
pub mod error;
/// Page range expression parsing.
pub mod page_range;
/// Page edit records and state snapshots.
pub mod page_state;
/// Preview rendering contract and display transforms.
pub mod preview;
/// Committed output artifacts.
pub mod result;
/// Page selection model.
pub mod selection;
/// Document identity tokens.
pub mod session;

pub use edits::RotationDirection;
pub use error::{EditError, EditOptions};
pub use page_range::parse_page_range;
pub use page_state::{PageEditRecord, PageEditState, PageId};
pub use preview::{PageRasterizer, PreviewTransform, RasterFormat, RasterImage};
pub use result::{Operation, ProcessedResult, ResultId, ResultList};
pub use selection::Selection;
pub use session::SessionToken;
