//! lopdf fixtures for unit tests.

use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};

/// PDF whose page N has content `% page N` and the given `/Rotate`.
pub(crate) fn pdf_with_rotations(rotations: &[i64]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let kids: Vec<Object> = rotations
        .iter()
        .enumerate()
        .map(|(i, &rotation)| {
            let content = format!("% page {}\n", i + 1).into_bytes();
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            };
            if rotation != 0 {
                page.set("Rotate", rotation);
            }
            doc.add_object(page).into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => rotations.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

pub(crate) fn pdf_with_pages(n: usize) -> Vec<u8> {
    pdf_with_rotations(&vec![0; n])
}

/// Re-save `bytes` encrypted (RC4-128) with the given user password.
pub(crate) fn encrypted(bytes: &[u8], user_password: &str) -> Vec<u8> {
    let mut doc = lopdf::Document::load_mem(bytes).expect("fixture should parse");
    let file_id = Object::String(b"0123456789abcdef".to_vec(), lopdf::StringFormat::Literal);
    doc.trailer
        .set("ID", Object::Array(vec![file_id.clone(), file_id]));
    let state = lopdf::EncryptionState::try_from(lopdf::EncryptionVersion::V2 {
        document: &doc,
        owner_password: user_password,
        user_password,
        key_length: 128,
        permissions: lopdf::Permissions::all(),
    })
    .expect("encryption state");
    doc.encrypt(&state).expect("encrypt fixture");

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Content markers of each page, in page order.
pub(crate) fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = doc.get_page_content(id).expect("page content");
            String::from_utf8_lossy(&content)
                .lines()
                .find(|l| l.starts_with("% page"))
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// `/Rotate` of each page, 0 when absent.
pub(crate) fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = lopdf::Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_dictionary(id)
                .and_then(|d| d.get(b"Rotate"))
                .and_then(|r| r.as_i64())
                .unwrap_or(0)
        })
        .collect()
}

/// Encoded RGB PNG of the given size.
pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Encoded RGB JPEG of the given size.
pub(crate) fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 200, 10]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}
