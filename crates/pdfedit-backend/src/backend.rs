//! Document provider trait.
//!
//! Defines the [`DocumentProvider`] trait that abstracts the PDF library the
//! edit pipeline reads from and writes to. Source documents are read-only;
//! every commit builds a brand-new output document.

use pdfedit_core::EditError;

use crate::embed::{EmbeddedImage, Placement};

/// Trait abstracting PDF load, page copy, rotation, and save operations.
///
/// # Associated Types
///
/// - `Document`: A loaded, read-only source document.
/// - `Output`: An output document under construction.
/// - `Error`: Backend-specific error type, convertible to [`EditError`].
///
/// Source pages are addressed by 1-based page number. Output pages are
/// addressed by their 0-based position in the output.
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// let mut out = MyBackend::create_output();
/// let index = MyBackend::copy_page(&mut out, &doc, 3)?;
/// let current = MyBackend::output_page_rotate(&out, index)?;
/// MyBackend::set_output_page_rotate(&mut out, index, current + 90)?;
/// let bytes = MyBackend::save(out)?;
/// ```
pub trait DocumentProvider {
    /// The loaded source document type.
    type Document;

    /// The output document type.
    type Output;

    /// Backend-specific error type, convertible to [`EditError`].
    type Error: std::error::Error + Into<EditError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a PDF, or if the PDF is
    /// encrypted (see [`open_with_password`](Self::open_with_password)).
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Parse and decrypt an encrypted PDF.
    ///
    /// The password is ignored for unencrypted input.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a PDF, or
    /// [`EditError::InvalidPassword`] if the password is wrong.
    fn open_with_password(bytes: &[u8], password: &str) -> Result<Self::Document, Self::Error>;

    /// Return the number of pages in the source document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Rotation already stored on a source page, inherited values included.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_number` is outside `1..=page_count`.
    fn page_rotate(doc: &Self::Document, page_number: usize) -> Result<i32, Self::Error>;

    /// Width and height of a source page's MediaBox in points.
    ///
    /// # Errors
    ///
    /// Returns an error if `page_number` is outside `1..=page_count` or
    /// the page has no usable MediaBox.
    fn page_size(doc: &Self::Document, page_number: usize) -> Result<(f64, f64), Self::Error>;

    /// Start an empty output document.
    fn create_output() -> Self::Output;

    /// Number of pages appended to `output` so far.
    fn output_page_count(output: &Self::Output) -> usize;

    /// Append a copy of source page `page_number` to `output` and return its
    /// output position. The copy starts with the source page's rotation.
    ///
    /// Copying the same source page twice yields two independent pages.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::IndexOutOfRange`] (through `Self::Error`) if
    /// `page_number` is outside `1..=page_count`.
    fn copy_page(
        output: &mut Self::Output,
        doc: &Self::Document,
        page_number: usize,
    ) -> Result<usize, Self::Error>;

    /// Rotation of an output page.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not an output page.
    fn output_page_rotate(output: &Self::Output, index: usize) -> Result<i32, Self::Error>;

    /// Overwrite the rotation of an output page.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not an output page.
    fn set_output_page_rotate(
        output: &mut Self::Output,
        index: usize,
        degrees: i32,
    ) -> Result<(), Self::Error>;

    /// Width and height of an output page's MediaBox in points.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not an output page.
    fn output_page_size(output: &Self::Output, index: usize) -> Result<(f64, f64), Self::Error>;

    /// Draw `image` over the existing content of an output page.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not an output page or the page's
    /// resources cannot be extended.
    fn draw_image(
        output: &mut Self::Output,
        index: usize,
        image: &EmbeddedImage,
        placement: Placement,
    ) -> Result<(), Self::Error>;

    /// Serialize the output document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn save(output: Self::Output) -> Result<Vec<u8>, Self::Error>;

    /// Serialize the output document encrypted with the standard security
    /// handler. `user_password` opens the file; `owner_password` also
    /// unlocks its permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or serialization fails.
    fn save_encrypted(
        output: Self::Output,
        user_password: &str,
        owner_password: &str,
    ) -> Result<Vec<u8>, Self::Error>;
}
