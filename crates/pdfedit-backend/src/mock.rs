//! In-memory provider used by unit tests.

use pdfedit_core::EditError;

use crate::backend::DocumentProvider;
use crate::embed::{EmbeddedImage, Placement};

#[derive(Debug)]
pub(crate) struct MockDocument {
    pub(crate) rotations: Vec<i32>,
    /// Copying this 1-based page fails, to exercise abort paths.
    pub(crate) fail_on: Option<usize>,
}

impl MockDocument {
    pub(crate) fn with_rotations(rotations: &[i32]) -> Self {
        Self {
            rotations: rotations.to_vec(),
            fail_on: None,
        }
    }

    fn check(&self, page_number: usize) -> Result<(), EditError> {
        if page_number == 0 || page_number > self.rotations.len() {
            return Err(EditError::IndexOutOfRange {
                index: page_number,
                page_count: self.rotations.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct MockOutputPage {
    pub(crate) source: usize,
    pub(crate) rotate: i32,
    pub(crate) images: usize,
}

#[derive(Debug, Default)]
pub(crate) struct MockOutput {
    pub(crate) pages: Vec<MockOutputPage>,
}

impl MockOutput {
    fn page(&self, index: usize) -> Result<&MockOutputPage, EditError> {
        self.pages.get(index).ok_or_else(|| {
            EditError::InvalidInput(format!("no output page at position {index}"))
        })
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut MockOutputPage, EditError> {
        self.pages.get_mut(index).ok_or_else(|| {
            EditError::InvalidInput(format!("no output page at position {index}"))
        })
    }
}

/// Mock: the first input byte is the page count. `save` emits three bytes
/// per page: source page number, quarter-turns (mod 4), image count.
/// `save_encrypted` appends the user password to that.
pub(crate) struct MockBackend;

impl DocumentProvider for MockBackend {
    type Document = MockDocument;
    type Output = MockOutput;
    type Error = EditError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let Some(&count) = bytes.first() else {
            return Err(EditError::ExternalServiceFailure("empty input".to_string()));
        };
        Ok(MockDocument::with_rotations(&vec![0; count as usize]))
    }

    fn open_with_password(bytes: &[u8], _password: &str) -> Result<Self::Document, Self::Error> {
        Self::open(bytes)
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.rotations.len()
    }

    fn page_rotate(doc: &Self::Document, page_number: usize) -> Result<i32, Self::Error> {
        doc.check(page_number)?;
        Ok(doc.rotations[page_number - 1])
    }

    fn page_size(doc: &Self::Document, page_number: usize) -> Result<(f64, f64), Self::Error> {
        doc.check(page_number)?;
        Ok((612.0, 792.0))
    }

    fn create_output() -> Self::Output {
        MockOutput::default()
    }

    fn output_page_count(output: &Self::Output) -> usize {
        output.pages.len()
    }

    fn copy_page(
        output: &mut Self::Output,
        doc: &Self::Document,
        page_number: usize,
    ) -> Result<usize, Self::Error> {
        doc.check(page_number)?;
        if doc.fail_on == Some(page_number) {
            return Err(EditError::ExternalServiceFailure(format!(
                "cannot copy page {page_number}"
            )));
        }
        output.pages.push(MockOutputPage {
            source: page_number,
            rotate: doc.rotations[page_number - 1],
            images: 0,
        });
        Ok(output.pages.len() - 1)
    }

    fn output_page_rotate(output: &Self::Output, index: usize) -> Result<i32, Self::Error> {
        Ok(output.page(index)?.rotate)
    }

    fn set_output_page_rotate(
        output: &mut Self::Output,
        index: usize,
        degrees: i32,
    ) -> Result<(), Self::Error> {
        output.page_mut(index)?.rotate = degrees;
        Ok(())
    }

    fn output_page_size(output: &Self::Output, index: usize) -> Result<(f64, f64), Self::Error> {
        output.page(index)?;
        Ok((612.0, 792.0))
    }

    fn draw_image(
        output: &mut Self::Output,
        index: usize,
        _image: &EmbeddedImage,
        _placement: Placement,
    ) -> Result<(), Self::Error> {
        output.page_mut(index)?.images += 1;
        Ok(())
    }

    fn save(output: Self::Output) -> Result<Vec<u8>, Self::Error> {
        Ok(output
            .pages
            .iter()
            .flat_map(|p| {
                [
                    p.source as u8,
                    (p.rotate.rem_euclid(360) / 90) as u8,
                    p.images as u8,
                ]
            })
            .collect())
    }

    fn save_encrypted(
        output: Self::Output,
        user_password: &str,
        _owner_password: &str,
    ) -> Result<Vec<u8>, Self::Error> {
        let mut bytes = Self::save(output)?;
        bytes.extend_from_slice(user_password.as_bytes());
        Ok(bytes)
    }
}
