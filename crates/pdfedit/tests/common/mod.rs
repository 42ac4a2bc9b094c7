//! Shared fixtures for pdfedit integration tests.
//!
//! Test PDFs are created programmatically using lopdf; each page's content
//! stream is a single `% page N` comment so output order can be read back.

#![allow(dead_code)]

use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};

/// Build a PDF with one page per entry; non-zero entries set `/Rotate`.
pub fn pdf_with_rotations(rotations: &[i64]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for (i, &rotation) in rotations.iter().enumerate() {
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
        kids.push(doc.add_object(page).into());
    }

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

pub fn pdf_with_pages(n: usize) -> Vec<u8> {
    pdf_with_rotations(&vec![0; n])
}

/// `% page N` marker of every page, in page order.
pub fn page_markers(bytes: &[u8]) -> Vec<String> {
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

/// `/Rotate` of every page, 0 when absent.
pub fn page_rotations(bytes: &[u8]) -> Vec<i64> {
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

/// Number of image XObjects referenced from each page's resources.
pub fn page_image_counts(bytes: &[u8]) -> Vec<usize> {
    let doc = lopdf::Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_dictionary(id)
                .and_then(|page| page.get(b"Resources"))
                .and_then(|res| match res {
                    Object::Reference(r) => doc.get_dictionary(*r),
                    other => other.as_dict(),
                })
                .and_then(|res| res.get(b"XObject"))
                .and_then(|x| match x {
                    Object::Reference(r) => doc.get_dictionary(*r),
                    other => other.as_dict(),
                })
                .map(|x| x.len())
                .unwrap_or(0)
        })
        .collect()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 200]))
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
