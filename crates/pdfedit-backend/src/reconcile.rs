//! Reconciliation: materializing an edit state into a new document.
//!
//! The source document is never modified. Each commit builds a fresh output
//! document page by page and serializes it; if any step fails the output is
//! dropped and the error is returned, so callers never see partial bytes.

use pdfedit_core::{EditError, EditOptions, PageEditState};

use crate::backend::DocumentProvider;

/// Produce a new PDF from `doc` and the edit overlay `state`.
///
/// Non-deleted records are copied in list order; each copy gets the source
/// page's own rotation plus the record's accumulated rotation.
///
/// # Errors
///
/// Returns [`EditError::EmptyDocument`] before touching the source if every
/// record is deleted, [`EditError::IndexOutOfRange`] if a record does not
/// address a source page, [`EditError::InvalidInput`] if a page's total
/// rotation overflows, and any provider failure.
pub fn reconcile<B: DocumentProvider>(
    doc: &B::Document,
    state: &PageEditState,
    options: &EditOptions,
) -> Result<Vec<u8>, EditError> {
    if state.active_count() == 0 {
        return Err(EditError::EmptyDocument);
    }

    let mut output = B::create_output();
    for record in state.active_records() {
        let index = B::copy_page(&mut output, doc, record.original_index()).map_err(Into::into)?;
        let source_rotation = B::output_page_rotate(&output, index).map_err(Into::into)?;
        let total = source_rotation
            .checked_add(record.rotation())
            .ok_or_else(|| {
                EditError::InvalidInput(format!(
                    "rotation of page {} overflows",
                    record.original_index()
                ))
            })?;
        let rotation = options.output_rotation(total);
        B::set_output_page_rotate(&mut output, index, rotation).map_err(Into::into)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = record.original_index(),
            position = index,
            rotation,
            "copied page"
        );
    }

    let bytes = B::save(output).map_err(Into::into)?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        pages = state.active_count(),
        bytes = bytes.len(),
        "reconciled document"
    );

    Ok(bytes)
}

/// Copy the listed 1-based source pages, in the given order, into a new PDF.
/// Source rotation is preserved unchanged.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] if `pages` is empty and
/// [`EditError::IndexOutOfRange`] if a page does not exist.
pub fn extract_pages<B: DocumentProvider>(
    doc: &B::Document,
    pages: &[usize],
) -> Result<Vec<u8>, EditError> {
    if pages.is_empty() {
        return Err(EditError::InvalidInput(
            "no pages selected for extraction".to_string(),
        ));
    }

    let mut output = B::create_output();
    for &page in pages {
        B::copy_page(&mut output, doc, page).map_err(Into::into)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(pages = pages.len(), "extracted pages");

    B::save(output).map_err(Into::into)
}

/// Concatenate every page of `docs`, in input order, into a new PDF.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] if `docs` is empty and
/// [`EditError::EmptyDocument`] if the inputs have no pages between them.
pub fn merge<B: DocumentProvider>(docs: &[B::Document]) -> Result<Vec<u8>, EditError> {
    if docs.is_empty() {
        return Err(EditError::InvalidInput(
            "at least one document is required to merge".to_string(),
        ));
    }

    let mut output = B::create_output();
    for doc in docs {
        for page in 1..=B::page_count(doc) {
            B::copy_page(&mut output, doc, page).map_err(Into::into)?;
        }
    }
    if B::output_page_count(&output) == 0 {
        return Err(EditError::EmptyDocument);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        documents = docs.len(),
        pages = B::output_page_count(&output),
        "merged documents"
    );

    B::save(output).map_err(Into::into)
}

/// Copy every page of `doc` into a new PDF encrypted with `password`, which
/// serves as both the user and the owner password.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] if `password` is empty, and any
/// provider failure.
pub fn protect<B: DocumentProvider>(doc: &B::Document, password: &str) -> Result<Vec<u8>, EditError> {
    if password.is_empty() {
        return Err(EditError::InvalidInput(
            "a password is required to protect a document".to_string(),
        ));
    }

    let mut output = B::create_output();
    for page in 1..=B::page_count(doc) {
        B::copy_page(&mut output, doc, page).map_err(Into::into)?;
    }
    if B::output_page_count(&output) == 0 {
        return Err(EditError::EmptyDocument);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(pages = B::output_page_count(&output), "encrypting document");

    B::save_encrypted(output, password, password).map_err(Into::into)
}
