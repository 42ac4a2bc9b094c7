//! pdfedit-backend: Document providers and the reconciliation engine.
//!
//! This crate defines the [`DocumentProvider`] trait that abstracts the PDF
//! library, a lopdf-based implementation ([`LopdfBackend`]), and the
//! operations that produce new PDF bytes: [`reconcile`], [`extract_pages`],
//! [`merge`], [`protect`], and [`place_image`].

pub mod backend;
pub mod embed;
pub mod error;
pub mod lopdf_backend;
#[cfg(test)]
pub(crate) mod mock;
pub mod reconcile;

pub use backend::DocumentProvider;
pub use embed::{ColorSpace, EmbeddedImage, IMAGE_SCALE, ImageEncoding, Placement, place_image};
pub use error::BackendError;
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfOutput};
pub use reconcile::{extract_pages, merge, protect, reconcile};
