//! Preview rendering contract and the presentation-only rotation transform.
//!
//! Thumbnails are always rasterized from the unrotated source page; edit
//! rotation is layered on top as a display transform, so rotating a page in
//! the editor never triggers a re-render.

use crate::error::EditError;
use crate::page_state::PageEditRecord;

/// Encoding of a rendered raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RasterFormat {
    /// JPEG bytes.
    Jpeg,
    /// PNG bytes.
    Png,
}

impl RasterFormat {
    /// MIME type for this encoding.
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Png => "image/png",
        }
    }
}

/// An encoded page raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoding of [`data`](Self::data).
    pub format: RasterFormat,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

/// Rasterizes pages of the currently loaded source document.
///
/// Implemented outside this workspace by a PDF rendering engine.
pub trait PageRasterizer {
    /// Render the 1-based source page at `scale` (1.0 = 72 dpi).
    ///
    /// # Errors
    ///
    /// Returns [`EditError::IndexOutOfRange`] for a missing page and
    /// [`EditError::ExternalServiceFailure`] if the engine fails.
    fn render(&self, page_number: usize, scale: f32) -> Result<RasterImage, EditError>;
}

/// Display transform for one page thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreviewTransform {
    /// Accumulated rotation, exactly as stored in the edit record.
    pub degrees: i32,
    /// Whether the thumbnail should be hidden (page soft-deleted).
    pub hidden: bool,
}

impl PreviewTransform {
    /// Transform for an edit record.
    pub fn for_record(record: &PageEditRecord) -> Self {
        Self {
            degrees: record.rotation(),
            hidden: record.is_deleted(),
        }
    }

    /// CSS `transform` value with the unwrapped angle, e.g. `rotate(450deg)`.
    pub fn css(&self) -> String {
        format!("rotate({}deg)", self.degrees)
    }

    /// True for an odd number of quarter-turns, where width and height swap.
    pub fn swaps_dimensions(&self) -> bool {
        self.degrees.rem_euclid(180) == 90
    }

    /// Bounding box of a `width` x `height` raster after the transform.
    pub fn display_size(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PageEditState, RotationDirection};

    #[test]
    fn transform_of_fresh_record() {
        let state = PageEditState::initialize(1).unwrap();
        let t = PreviewTransform::for_record(&state.records()[0]);
        assert_eq!(t.degrees, 0);
        assert!(!t.hidden);
        assert_eq!(t.css(), "rotate(0deg)");
    }

    #[test]
    fn transform_keeps_unwrapped_angle() {
        let mut state = PageEditState::initialize(1).unwrap();
        for _ in 0..5 {
            state = state.rotate(1, RotationDirection::Right);
        }
        let t = PreviewTransform::for_record(&state.records()[0]);
        assert_eq!(t.css(), "rotate(450deg)");
        assert!(t.swaps_dimensions());
    }

    #[test]
    fn transform_hidden_for_deleted() {
        let state = PageEditState::initialize(2).unwrap().delete(2);
        let t = PreviewTransform::for_record(state.get(2).unwrap());
        assert!(t.hidden);
    }

    #[test]
    fn display_size_swaps_on_quarter_turns() {
        let t = PreviewTransform {
            degrees: -90,
            hidden: false,
        };
        assert_eq!(t.display_size(300, 400), (400, 300));
        let t = PreviewTransform {
            degrees: 180,
            hidden: false,
        };
        assert_eq!(t.display_size(300, 400), (300, 400));
    }

    #[test]
    fn raster_format_mime() {
        assert_eq!(RasterFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(RasterFormat::Png.mime_type(), "image/png");
    }
}
