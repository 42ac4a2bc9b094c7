//! pdfedit: Rotate, delete, reorder, split, merge, and stamp PDF pages.
//!
//! This is the public API facade crate for pdfedit-rs. It re-exports types from
//! pdfedit-core and drives pdfedit-backend to read sources and build outputs.
//!
//! # Architecture
//!
//! - **pdfedit-core**: Edit records, mutators, selection, results, and errors
//! - **pdfedit-backend**: Document provider trait, lopdf implementation, reconciliation
//! - **pdfedit** (this crate): [`EditSession`], commit tickets, and the optional
//!   `ai` module for OCR and text-to-speech
//!
//! # Usage
//!
//! ```ignore
//! use pdfedit::{EditOptions, EditSession, RotationDirection};
//!
//! let mut session = EditSession::new(EditOptions::default());
//! session.load_file("report.pdf")?;
//! session.rotate(3, RotationDirection::Right);
//! session.delete(5);
//! session.move_page(3, 1)?;
//! let id = session.commit_edits()?;
//! std::fs::write("out.pdf", session.results().get(id).unwrap().data())?;
//! ```

pub use pdfedit_backend;
pub use pdfedit_core;

pub use pdfedit_core::{
    EditError, EditOptions, Operation, PageEditRecord, PageEditState, PageId, PageRasterizer,
    PreviewTransform, ProcessedResult, RasterFormat, RasterImage, ResultId, ResultList,
    RotationDirection, Selection, SessionToken, parse_page_range,
};

mod session;
pub use session::{CommitTicket, Completed, DocumentInfo, EditSession, PageInfo};

#[cfg(feature = "ai")]
pub mod ai;

#[cfg(test)]
mod test_support;
