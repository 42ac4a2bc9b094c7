//! Image decoding and placement for embedding into output pages.
//!
//! JPEG data is passed through untouched (DCTDecode); PNG data is decoded to
//! raw samples with the alpha channel split off into a soft mask.

use image::GenericImageView;
use pdfedit_core::EditError;

use crate::backend::DocumentProvider;
use crate::error::BackendError;

/// Points per image pixel when placing an image on a page.
pub const IMAGE_SCALE: f64 = 0.5;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8];

/// Color space of decoded image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One gray component per pixel.
    DeviceGray,
    /// Three RGB components per pixel.
    DeviceRGB,
}

impl ColorSpace {
    /// PDF name of this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// How [`EmbeddedImage::data`] is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Original JPEG stream, embedded with DCTDecode.
    Jpeg,
    /// Uncompressed 8-bit samples.
    Raw,
}

/// An image ready to become a PDF image XObject.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color space of the samples.
    pub color_space: ColorSpace,
    /// Encoding of `data`.
    pub encoding: ImageEncoding,
    /// Image samples or JPEG bytes.
    pub data: Vec<u8>,
    /// 8-bit alpha samples, if the source had transparency.
    pub soft_mask: Option<Vec<u8>>,
}

impl EmbeddedImage {
    /// Decode a PNG, splitting off alpha into a soft mask.
    pub fn from_png(data: &[u8]) -> Result<Self, BackendError> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)?;
        let (width, height) = img.dimensions();

        let (color_space, samples, alpha) = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => {
                (ColorSpace::DeviceGray, img.to_luma8().into_raw(), None)
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = img.to_luma_alpha8();
                let mut gray = Vec::with_capacity((width * height) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in la.pixels() {
                    gray.push(pixel.0[0]);
                    alpha.push(pixel.0[1]);
                }
                (ColorSpace::DeviceGray, gray, Some(alpha))
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = img.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha.push(pixel.0[3]);
                }
                (ColorSpace::DeviceRGB, rgb, Some(alpha))
            }
            _ => (ColorSpace::DeviceRGB, img.to_rgb8().into_raw(), None),
        };

        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Raw,
            data: samples,
            soft_mask: alpha,
        })
    }

    /// Wrap a JPEG for pass-through embedding. The stream is decoded once
    /// to validate it and read its geometry.
    pub fn from_jpeg(data: &[u8]) -> Result<Self, BackendError> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)?;
        let (width, height) = img.dimensions();
        let color_space = match img.color() {
            image::ColorType::L8 | image::ColorType::L16 => ColorSpace::DeviceGray,
            _ => ColorSpace::DeviceRGB,
        };
        Ok(Self {
            width,
            height,
            color_space,
            encoding: ImageEncoding::Jpeg,
            data: data.to_vec(),
            soft_mask: None,
        })
    }

    /// Detect PNG or JPEG by magic bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Image`] for any other format or corrupt data.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BackendError> {
        if data.starts_with(PNG_MAGIC) {
            Self::from_png(data)
        } else if data.starts_with(JPEG_MAGIC) {
            Self::from_jpeg(data)
        } else {
            Err(BackendError::Image(
                "expected PNG or JPEG data".to_string(),
            ))
        }
    }
}

/// Where an image is drawn on a page, in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Lower-left x.
    pub x: f64,
    /// Lower-left y.
    pub y: f64,
    /// Drawn width.
    pub width: f64,
    /// Drawn height.
    pub height: f64,
}

impl Placement {
    /// Center an image on a page, sized at `scale` points per pixel.
    pub fn centered(page_size: (f64, f64), image_size: (u32, u32), scale: f64) -> Self {
        let width = f64::from(image_size.0) * scale;
        let height = f64::from(image_size.1) * scale;
        Self {
            x: (page_size.0 - width) / 2.0,
            y: (page_size.1 - height) / 2.0,
            width,
            height,
        }
    }
}

/// Copy every page of `doc` into a new PDF, drawing `image` centered on
/// page `page_number` at [`IMAGE_SCALE`].
///
/// # Errors
///
/// Returns [`EditError::IndexOutOfRange`] if `page_number` does not exist,
/// and any provider failure.
pub fn place_image<B: DocumentProvider>(
    doc: &B::Document,
    page_number: usize,
    image: &EmbeddedImage,
) -> Result<Vec<u8>, EditError> {
    let page_count = B::page_count(doc);
    if page_number == 0 || page_number > page_count {
        return Err(EditError::IndexOutOfRange {
            index: page_number,
            page_count,
        });
    }

    let mut output = B::create_output();
    for page in 1..=page_count {
        let index = B::copy_page(&mut output, doc, page).map_err(Into::into)?;
        if page == page_number {
            let size = B::output_page_size(&output, index).map_err(Into::into)?;
            let placement = Placement::centered(size, (image.width, image.height), IMAGE_SCALE);
            B::draw_image(&mut output, index, image, placement).map_err(Into::into)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                page,
                width = placement.width,
                height = placement.height,
                "placed image"
            );
        }
    }
    B::save(output).map_err(Into::into)
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, with_alpha: bool) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    if with_alpha {
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 128]))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
    } else {
        image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
    }
    buf.into_inner()
}

#[cfg(test)]
pub(crate) fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]))
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_rgb_has_no_mask() {
        let img = EmbeddedImage::from_bytes(&encode_png(4, 3, false)).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.color_space, ColorSpace::DeviceRGB);
        assert_eq!(img.encoding, ImageEncoding::Raw);
        assert_eq!(img.data.len(), 4 * 3 * 3);
        assert!(img.soft_mask.is_none());
    }

    #[test]
    fn png_rgba_splits_alpha() {
        let img = EmbeddedImage::from_bytes(&encode_png(2, 2, true)).unwrap();
        assert_eq!(img.data.len(), 2 * 2 * 3);
        let mask = img.soft_mask.unwrap();
        assert_eq!(mask, vec![128; 4]);
    }

    #[test]
    fn jpeg_is_passed_through() {
        let bytes = encode_jpeg(8, 6);
        let img = EmbeddedImage::from_bytes(&bytes).unwrap();
        assert_eq!((img.width, img.height), (8, 6));
        assert_eq!(img.encoding, ImageEncoding::Jpeg);
        assert_eq!(img.data, bytes);
    }

    #[test]
    fn unknown_format_rejected() {
        let err = EmbeddedImage::from_bytes(b"GIF89a....").unwrap_err();
        assert!(matches!(err, BackendError::Image(_)));
    }

    #[test]
    fn truncated_png_rejected() {
        let mut bytes = encode_png(4, 4, false);
        bytes.truncate(20);
        assert!(EmbeddedImage::from_bytes(&bytes).is_err());
    }

    // --- place_image ---

    #[test]
    fn place_image_marks_only_target_page() {
        use crate::mock::MockBackend;

        let doc = MockBackend::open(&[3]).unwrap();
        let image = EmbeddedImage::from_bytes(&encode_png(4, 4, false)).unwrap();
        let bytes = place_image::<MockBackend>(&doc, 2, &image).unwrap();
        let images: Vec<u8> = bytes.chunks(3).map(|c| c[2]).collect();
        assert_eq!(images, vec![0, 1, 0]);
    }

    #[test]
    fn place_image_checks_page_range() {
        use crate::mock::MockBackend;

        let doc = MockBackend::open(&[2]).unwrap();
        let image = EmbeddedImage::from_bytes(&encode_png(4, 4, false)).unwrap();
        for page in [0, 3] {
            let err = place_image::<MockBackend>(&doc, page, &image).unwrap_err();
            assert_eq!(
                err,
                EditError::IndexOutOfRange {
                    index: page,
                    page_count: 2
                }
            );
        }
    }

    #[test]
    fn centered_placement_at_half_scale() {
        let p = Placement::centered((612.0, 792.0), (200, 100), 0.5);
        assert_eq!(p.width, 100.0);
        assert_eq!(p.height, 50.0);
        assert_eq!(p.x, 256.0);
        assert_eq!(p.y, 371.0);
    }
}
