//! lopdf-based document provider.
//!
//! Implements [`DocumentProvider`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate. Copied pages are deep-imported into a fresh output document: every
//! object reachable from the page (content streams, fonts, images,
//! annotations) is re-numbered into the output, while the source page tree
//! is left behind. References to source pages that were not copied as part
//! of the same page (link destinations, for example) become null.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lopdf::content::{Content, Operation};
use lopdf::encryption::DecryptionError;
use lopdf::encryption::crypt_filters::{Aes128CryptFilter, CryptFilter};
use lopdf::{
    Dictionary, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions, Stream,
    StringFormat, dictionary,
};
use pdfedit_core::EditError;

use crate::backend::DocumentProvider;
use crate::embed::{EmbeddedImage, ImageEncoding, Placement};
use crate::error::BackendError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

static NEXT_DOCUMENT_KEY: AtomicU64 = AtomicU64::new(1);

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    /// The underlying lopdf document.
    inner: lopdf::Document,
    /// Cached ordered list of page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<ObjectId>,
    /// Distinguishes objects of different sources inside one output.
    key: u64,
}

impl LopdfDocument {
    fn new(inner: lopdf::Document) -> Self {
        // get_pages returns BTreeMap<u32, ObjectId> with 1-based keys
        let page_ids = inner.get_pages().values().copied().collect();
        Self {
            inner,
            page_ids,
            key: NEXT_DOCUMENT_KEY.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, page_number: usize) -> Result<ObjectId, BackendError> {
        if page_number == 0 || page_number > self.page_ids.len() {
            return Err(BackendError::Core(EditError::IndexOutOfRange {
                index: page_number,
                page_count: self.page_ids.len(),
            }));
        }
        Ok(self.page_ids[page_number - 1])
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// An output document under construction.
pub struct LopdfOutput {
    doc: lopdf::Document,
    /// Reserved id of the page tree root, written on save.
    pages_id: ObjectId,
    /// Output pages in order.
    kids: Vec<ObjectId>,
    /// Source objects already imported, keyed by (document key, source id).
    imported: HashMap<(u64, ObjectId), ObjectId>,
}

impl LopdfOutput {
    /// Write the page tree and catalog, yielding a complete document.
    fn into_document(self) -> lopdf::Document {
        let LopdfOutput {
            mut doc,
            pages_id,
            kids,
            ..
        } = self;

        let count = kids.len() as i64;
        let kids: Vec<Object> = kids.into_iter().map(Object::Reference).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.kids.get(index).copied().ok_or_else(|| {
            BackendError::Core(EditError::InvalidInput(format!(
                "no output page at position {index}"
            )))
        })
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get output page: {e}")))
    }

    fn page_dict_mut(&mut self, index: usize) -> Result<&mut Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.doc
            .get_object_mut(id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| BackendError::Parse(format!("failed to get output page: {e}")))
    }

    /// Copy the object behind `id` (and everything it reaches) into the output.
    fn import_reference(
        &mut self,
        source: &LopdfDocument,
        id: ObjectId,
    ) -> Result<ObjectId, BackendError> {
        if let Some(&mapped) = self.imported.get(&(source.key, id)) {
            return Ok(mapped);
        }
        let object = source
            .inner
            .get_object(id)
            .map_err(|e| BackendError::Parse(format!("broken reference {id:?}: {e}")))?;

        let new_id = self.doc.new_object_id();
        // Registered before recursing so cycles resolve to the new id.
        self.imported.insert((source.key, id), new_id);
        let copy = self.import_object(source, object)?;
        self.doc.objects.insert(new_id, copy);
        Ok(new_id)
    }

    fn import_object(
        &mut self,
        source: &LopdfDocument,
        object: &Object,
    ) -> Result<Object, BackendError> {
        Ok(match object {
            Object::Reference(id) => {
                if let Some(&mapped) = self.imported.get(&(source.key, *id)) {
                    Object::Reference(mapped)
                } else if is_page_tree_node(&source.inner, *id) {
                    // Links to other pages (e.g. a /Dest) are dropped; copying
                    // the target here would leave an orphan page behind.
                    Object::Null
                } else {
                    Object::Reference(self.import_reference(source, *id)?)
                }
            }
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.import_object(source, item))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.import_dict(source, dict)?),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.import_dict(source, &stream.dict)?;
                Object::Stream(copy)
            }
            other => other.clone(),
        })
    }

    fn import_dict(
        &mut self,
        source: &LopdfDocument,
        dict: &Dictionary,
    ) -> Result<Dictionary, BackendError> {
        let skip_parent = is_page_node(dict);
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            if skip_parent && key.as_slice() == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.import_object(source, value)?);
        }
        Ok(copy)
    }
}

impl std::fmt::Debug for LopdfOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfOutput")
            .field("page_count", &self.kids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based document provider.
///
/// # Example
///
/// ```ignore
/// use pdfedit_backend::{DocumentProvider, LopdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let mut out = LopdfBackend::create_output();
/// LopdfBackend::copy_page(&mut out, &doc, 1)?;
/// let bytes = LopdfBackend::save(out)?;
/// ```
pub struct LopdfBackend;

/// Convert a lopdf numeric object (Integer or Real) to f64.
fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Follow a reference to its target; other objects are returned as-is.
fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> Result<&'a Object, BackendError> {
    match obj {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| BackendError::Parse(format!("broken reference {id:?}: {e}"))),
        _ => Ok(obj),
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
///
/// Returns `None` if the key is not found anywhere in the tree.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    loop {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

fn is_page_node(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Type").and_then(|t| t.as_name()),
        Ok(b"Page") | Ok(b"Pages")
    )
}

/// True if `id` is a `Page` or `Pages` node of the source page tree.
fn is_page_tree_node(doc: &lopdf::Document, id: ObjectId) -> bool {
    doc.get_object(id)
        .and_then(|o| o.as_dict())
        .is_ok_and(is_page_node)
}

fn media_box_size(doc: &lopdf::Document, obj: &Object) -> Result<(f64, f64), BackendError> {
    let array = resolve(doc, obj)?
        .as_array()
        .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
    if array.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    let x0 = object_to_f64(resolve(doc, &array[0])?)?;
    let y0 = object_to_f64(resolve(doc, &array[1])?)?;
    let x1 = object_to_f64(resolve(doc, &array[2])?)?;
    let y1 = object_to_f64(resolve(doc, &array[3])?)?;
    Ok(((x1 - x0).abs(), (y1 - y0).abs()))
}

fn rotate_value(obj: &Object) -> Result<i32, BackendError> {
    let rotation = obj
        .as_i64()
        .map_err(|e| BackendError::Parse(format!("Rotate is not an integer: {e}")))?;
    i32::try_from(rotation).map_err(|_| BackendError::Parse(format!("Rotate {rotation} overflows")))
}

/// Build the image XObject (and its soft mask) for `image`.
fn image_xobject(doc: &mut lopdf::Document, image: &EmbeddedImage) -> Result<ObjectId, BackendError> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => image.color_space.pdf_name(),
        "BitsPerComponent" => 8,
    };

    if let Some(mask) = &image.soft_mask {
        let mut smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            mask.clone(),
        );
        smask
            .compress()
            .map_err(|e| BackendError::Write(format!("failed to compress soft mask: {e}")))?;
        dict.set("SMask", doc.add_object(smask));
    }

    let stream = match image.encoding {
        ImageEncoding::Jpeg => {
            dict.set("Filter", "DCTDecode");
            Stream::new(dict, image.data.clone()).with_compression(false)
        }
        ImageEncoding::Raw => {
            let mut stream = Stream::new(dict, image.data.clone());
            stream
                .compress()
                .map_err(|e| BackendError::Write(format!("failed to compress image: {e}")))?;
            stream
        }
    };
    Ok(doc.add_object(stream))
}

/// Current /Contents of a page as a list of stream references.
fn content_refs(page: &Dictionary) -> Result<Vec<Object>, BackendError> {
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => Ok(vec![Object::Reference(*id)]),
        Ok(Object::Array(items)) => Ok(items.clone()),
        Ok(other) => Err(BackendError::Parse(format!(
            "unsupported /Contents entry: {other:?}"
        ))),
        Err(_) => Ok(Vec::new()),
    }
}

/// Resolve a dictionary entry that may be stored inline or by reference,
/// returning an owned copy.
fn owned_dict(doc: &lopdf::Document, obj: Option<&Object>) -> Result<Dictionary, BackendError> {
    match obj {
        None => Ok(Dictionary::new()),
        Some(obj) => resolve(doc, obj)?
            .as_dict()
            .cloned()
            .map_err(|e| BackendError::Parse(format!("expected dictionary: {e}"))),
    }
}

fn encode_content(operations: Vec<Operation>) -> Result<Vec<u8>, BackendError> {
    Content { operations }
        .encode()
        .map_err(|e| BackendError::Write(format!("failed to encode content stream: {e}")))
}

impl DocumentProvider for LopdfBackend {
    type Document = LopdfDocument;
    type Output = LopdfOutput;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        // Reject encrypted PDFs when no password is provided
        if inner.is_encrypted() {
            return Err(BackendError::Core(EditError::PasswordRequired));
        }

        Ok(LopdfDocument::new(inner))
    }

    fn open_with_password(bytes: &[u8], password: &str) -> Result<Self::Document, Self::Error> {
        // The reader authenticates and decrypts while loading; a plain PDF
        // loads normally and the password is ignored.
        let inner = lopdf::Document::load_mem_with_password(bytes, password).map_err(|e| match e {
            lopdf::Error::InvalidPassword
            | lopdf::Error::Decryption(DecryptionError::IncorrectPassword) => {
                BackendError::Core(EditError::InvalidPassword)
            }
            other => BackendError::Parse(format!("failed to parse PDF: {other}")),
        })?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(EditError::InvalidPassword));
        }

        Ok(LopdfDocument::new(inner))
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_rotate(doc: &Self::Document, page_number: usize) -> Result<i32, Self::Error> {
        let page_id = doc.page_id(page_number)?;
        match resolve_inherited(&doc.inner, page_id, b"Rotate")? {
            Some(obj) => rotate_value(resolve(&doc.inner, obj)?),
            None => Ok(0), // Default rotation is 0
        }
    }

    fn page_size(doc: &Self::Document, page_number: usize) -> Result<(f64, f64), Self::Error> {
        let page_id = doc.page_id(page_number)?;
        let obj = resolve_inherited(&doc.inner, page_id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
        media_box_size(&doc.inner, obj)
    }

    fn create_output() -> Self::Output {
        let mut doc = lopdf::Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        LopdfOutput {
            doc,
            pages_id,
            kids: Vec::new(),
            imported: HashMap::new(),
        }
    }

    fn output_page_count(output: &Self::Output) -> usize {
        output.kids.len()
    }

    fn copy_page(
        output: &mut Self::Output,
        doc: &Self::Document,
        page_number: usize,
    ) -> Result<usize, Self::Error> {
        let page_id = doc.page_id(page_number)?;
        let mut page = doc
            .inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?
            .clone();

        // The copy leaves the source page tree behind, so inherited
        // attributes must be pinned on the page itself.
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = resolve_inherited(&doc.inner, page_id, key)? {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        page.remove(b"Parent");

        // Self-references (e.g. an annotation's /P) point at this copy. The
        // mapping is dropped afterwards so a second copy gets its own page.
        let new_id = output.doc.new_object_id();
        let previous = output.imported.insert((doc.key, page_id), new_id);
        let imported = output.import_dict(doc, &page);
        match previous {
            Some(prev) => output.imported.insert((doc.key, page_id), prev),
            None => output.imported.remove(&(doc.key, page_id)),
        };
        let mut imported = imported?;
        imported.set("Parent", output.pages_id);

        output.doc.objects.insert(new_id, Object::Dictionary(imported));
        output.kids.push(new_id);
        Ok(output.kids.len() - 1)
    }

    fn output_page_rotate(output: &Self::Output, index: usize) -> Result<i32, Self::Error> {
        match output.page_dict(index)?.get(b"Rotate") {
            Ok(obj) => rotate_value(resolve(&output.doc, obj)?),
            Err(_) => Ok(0),
        }
    }

    fn set_output_page_rotate(
        output: &mut Self::Output,
        index: usize,
        degrees: i32,
    ) -> Result<(), Self::Error> {
        output
            .page_dict_mut(index)?
            .set("Rotate", i64::from(degrees));
        Ok(())
    }

    fn output_page_size(output: &Self::Output, index: usize) -> Result<(f64, f64), Self::Error> {
        let page = output.page_dict(index)?;
        let obj = page
            .get(b"MediaBox")
            .map_err(|_| BackendError::Parse("output page has no MediaBox".into()))?;
        media_box_size(&output.doc, obj)
    }

    fn draw_image(
        output: &mut Self::Output,
        index: usize,
        image: &EmbeddedImage,
        placement: Placement,
    ) -> Result<(), Self::Error> {
        let page = output.page_dict(index)?;
        let mut resources = owned_dict(&output.doc, page.get(b"Resources").ok())?;
        let mut xobjects = owned_dict(&output.doc, resources.get(b"XObject").ok())?;
        let mut contents = content_refs(page)?;

        let name = (1..)
            .map(|n| format!("Im{n}"))
            .find(|name| !xobjects.has(name.as_bytes()))
            .unwrap_or_else(|| "Im0".to_string());

        let xobject_id = image_xobject(&mut output.doc, image)?;
        xobjects.set(name.clone(), xobject_id);
        resources.set("XObject", xobjects);

        // Existing content is wrapped in q/Q so its graphics state cannot
        // leak into the image placement.
        let prefix = encode_content(vec![Operation::new("q", vec![])])?;
        let draw = encode_content(vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (placement.width as f32).into(),
                    0.into(),
                    0.into(),
                    (placement.height as f32).into(),
                    (placement.x as f32).into(),
                    (placement.y as f32).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ])?;
        let prefix_id = output.doc.add_object(Stream::new(Dictionary::new(), prefix));
        let draw_id = output.doc.add_object(Stream::new(Dictionary::new(), draw));
        contents.insert(0, Object::Reference(prefix_id));
        contents.push(Object::Reference(draw_id));

        let page = output.page_dict_mut(index)?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }

    fn save(output: Self::Output) -> Result<Vec<u8>, Self::Error> {
        serialize(output.into_document())
    }

    fn save_encrypted(
        output: Self::Output,
        user_password: &str,
        owner_password: &str,
    ) -> Result<Vec<u8>, Self::Error> {
        let mut doc = output.into_document();

        // Key derivation reads the first /ID element.
        let file_id = Object::String(
            uuid::Uuid::new_v4().as_bytes().to_vec(),
            StringFormat::Hexadecimal,
        );
        doc.trailer
            .set("ID", Object::Array(vec![file_id.clone(), file_id]));

        let crypt_filter: Arc<dyn CryptFilter> = Arc::new(Aes128CryptFilter);
        let version = EncryptionVersion::V4 {
            document: &doc,
            encrypt_metadata: true,
            crypt_filters: BTreeMap::from([(b"StdCF".to_vec(), crypt_filter)]),
            stream_filter: b"StdCF".to_vec(),
            string_filter: b"StdCF".to_vec(),
            owner_password,
            user_password,
            permissions: Permissions::default(),
        };
        let state = EncryptionState::try_from(version)
            .map_err(|e| BackendError::Write(format!("failed to set up encryption: {e}")))?;
        doc.encrypt(&state)
            .map_err(|e| BackendError::Write(format!("failed to encrypt PDF: {e}")))?;

        serialize(doc)
    }
}

fn serialize(mut doc: lopdf::Document) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| BackendError::Write(format!("failed to save PDF: {e}")))?;
    Ok(buf)
}

/// Create a minimal valid PDF with one page per entry of `rotations`.
///
/// Each page is US Letter size (612 x 792 points) with a one-line content
/// stream naming its page number, so copies can be told apart.
#[cfg(test)]
pub(crate) fn create_test_pdf_with_rotations(rotations: &[i64]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut page_ids: Vec<Object> = Vec::new();
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
        page_ids.push(doc.add_object(page).into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
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

/// Create a minimal valid PDF document with the given number of pages.
#[cfg(test)]
pub(crate) fn create_test_pdf(page_count: usize) -> Vec<u8> {
    create_test_pdf_with_rotations(&vec![0; page_count])
}

/// Two-page PDF whose first page carries a link annotation to the second.
#[cfg(test)]
fn create_test_pdf_with_link() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let first_id = doc.new_object_id();
    let second_id = doc.new_object_id();

    let annot_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
        "Dest" => vec![Object::Reference(second_id), "Fit".into()],
        "P" => first_id,
    });
    for (id, n, annots) in [(first_id, 1, Some(annot_id)), (second_id, 2, None)] {
        let content = format!("% page {n}\n").into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        };
        if let Some(annot_id) = annots {
            page.set("Annots", vec![Object::Reference(annot_id)]);
        }
        doc.objects.insert(id, Object::Dictionary(page));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(first_id), Object::Reference(second_id)],
            "Count" => 2,
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

/// Create a PDF where Rotate, MediaBox and a shared font are inherited from
/// the Pages parent node.
#[cfg(test)]
fn create_test_pdf_inherited(rotation: i64) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let page_a = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    let page_b = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_a), Object::from(page_b)],
            "Count" => 2i64,
            "Rotate" => rotation,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
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

/// Page content text of every page of a saved PDF, in page order.
#[cfg(test)]
pub(crate) fn page_markers(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_page_content(id)
                .map(|c| String::from_utf8_lossy(&c).trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Rotate values of every page of a saved PDF, in page order.
#[cfg(test)]
pub(crate) fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = lopdf::Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|&id| {
            doc.get_object(id)
                .and_then(|o| o.as_dict())
                .and_then(|d| d.get(b"Rotate"))
                .and_then(|r| r.as_i64())
                .unwrap_or(0)
        })
        .collect()
}

/// Re-save `bytes` encrypted with RC4-128 and the given user password.
#[cfg(test)]
pub(crate) fn encrypt_test_pdf(bytes: &[u8], user_password: &str) -> Vec<u8> {
    let mut doc = lopdf::Document::load_mem(bytes).expect("fixture should parse");
    let file_id = Object::String(b"pdfedit-fixture!".to_vec(), StringFormat::Literal);
    doc.trailer
        .set("ID", Object::Array(vec![file_id.clone(), file_id]));
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).expect("encryption state");
    doc.encrypt(&state).expect("encrypt fixture");

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(bytes: &[u8]) -> LopdfDocument {
        LopdfBackend::open(bytes).unwrap()
    }

    // --- open ---

    #[test]
    fn open_counts_pages() {
        let doc = open(&create_test_pdf(3));
        assert_eq!(LopdfBackend::page_count(&doc), 3);
    }

    #[test]
    fn open_rejects_garbage() {
        let err = LopdfBackend::open(b"not a pdf").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
        let edit: EditError = err.into();
        assert!(matches!(edit, EditError::ExternalServiceFailure(_)));
    }

    #[test]
    fn open_with_password_accepts_plain_pdf() {
        let doc = LopdfBackend::open_with_password(&create_test_pdf(2), "ignored").unwrap();
        assert_eq!(LopdfBackend::page_count(&doc), 2);
    }

    #[test]
    fn open_encrypted_without_password_is_rejected() {
        let encrypted = encrypt_test_pdf(&create_test_pdf(3), "secret");
        let err: EditError = LopdfBackend::open(&encrypted).unwrap_err().into();
        assert_eq!(err, EditError::PasswordRequired);
    }

    #[test]
    fn open_with_password_decrypts_pages() {
        let encrypted = encrypt_test_pdf(&create_test_pdf(3), "secret");
        let doc = LopdfBackend::open_with_password(&encrypted, "secret").unwrap();
        assert_eq!(LopdfBackend::page_count(&doc), 3);

        let mut out = LopdfBackend::create_output();
        for page in [3, 1] {
            LopdfBackend::copy_page(&mut out, &doc, page).unwrap();
        }
        let bytes = LopdfBackend::save(out).unwrap();
        assert_eq!(page_markers(&bytes), vec!["% page 3", "% page 1"]);
    }

    #[test]
    fn open_with_owner_password_decrypts_pages() {
        let encrypted = encrypt_test_pdf(&create_test_pdf(2), "secret");
        let doc = LopdfBackend::open_with_password(&encrypted, "owner").unwrap();
        assert_eq!(LopdfBackend::page_count(&doc), 2);
    }

    #[test]
    fn open_with_wrong_password_is_invalid_password() {
        let encrypted = encrypt_test_pdf(&create_test_pdf(2), "secret");
        let err: EditError = LopdfBackend::open_with_password(&encrypted, "nope")
            .unwrap_err()
            .into();
        assert_eq!(err, EditError::InvalidPassword);
    }

    // --- save_encrypted ---

    #[test]
    fn save_encrypted_round_trips_with_password() {
        let doc = open(&create_test_pdf_with_rotations(&[0, 90]));
        let mut out = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut out, &doc, 2).unwrap();
        LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let bytes = LopdfBackend::save_encrypted(out, "hunter2", "hunter2").unwrap();

        let err: EditError = LopdfBackend::open(&bytes).unwrap_err().into();
        assert_eq!(err, EditError::PasswordRequired);

        let reopened = LopdfBackend::open_with_password(&bytes, "hunter2").unwrap();
        assert_eq!(LopdfBackend::page_count(&reopened), 2);
        assert_eq!(LopdfBackend::page_rotate(&reopened, 1).unwrap(), 90);

        let mut copy = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut copy, &reopened, 1).unwrap();
        LopdfBackend::copy_page(&mut copy, &reopened, 2).unwrap();
        let plain = LopdfBackend::save(copy).unwrap();
        assert_eq!(page_markers(&plain), vec!["% page 2", "% page 1"]);
    }

    #[test]
    fn save_encrypted_rejects_wrong_password_on_reopen() {
        let doc = open(&create_test_pdf(1));
        let mut out = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let bytes = LopdfBackend::save_encrypted(out, "right", "right").unwrap();
        let err: EditError = LopdfBackend::open_with_password(&bytes, "wrong")
            .unwrap_err()
            .into();
        assert_eq!(err, EditError::InvalidPassword);
    }

    #[test]
    fn debug_shows_page_count() {
        let doc = open(&create_test_pdf(2));
        assert!(format!("{doc:?}").contains("page_count: 2"));
    }

    // --- source page properties ---

    #[test]
    fn page_rotate_direct() {
        let doc = open(&create_test_pdf_with_rotations(&[0, 90]));
        assert_eq!(LopdfBackend::page_rotate(&doc, 1).unwrap(), 0);
        assert_eq!(LopdfBackend::page_rotate(&doc, 2).unwrap(), 90);
    }

    #[test]
    fn page_rotate_inherited() {
        let doc = open(&create_test_pdf_inherited(180));
        assert_eq!(LopdfBackend::page_rotate(&doc, 2).unwrap(), 180);
    }

    #[test]
    fn page_size_inherited() {
        let doc = open(&create_test_pdf_inherited(0));
        assert_eq!(LopdfBackend::page_size(&doc, 1).unwrap(), (595.0, 842.0));
    }

    #[test]
    fn page_rotate_out_of_range() {
        let doc = open(&create_test_pdf(2));
        let err: EditError = LopdfBackend::page_rotate(&doc, 3).unwrap_err().into();
        assert_eq!(
            err,
            EditError::IndexOutOfRange {
                index: 3,
                page_count: 2
            }
        );
    }

    // --- copy_page ---

    #[test]
    fn copy_page_zero_is_out_of_range() {
        let doc = open(&create_test_pdf(2));
        let mut out = LopdfBackend::create_output();
        let err: EditError = LopdfBackend::copy_page(&mut out, &doc, 0).unwrap_err().into();
        assert!(matches!(err, EditError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn copy_pages_in_call_order() {
        let doc = open(&create_test_pdf(3));
        let mut out = LopdfBackend::create_output();
        for page in [3, 1, 2] {
            LopdfBackend::copy_page(&mut out, &doc, page).unwrap();
        }
        let bytes = LopdfBackend::save(out).unwrap();
        assert_eq!(page_markers(&bytes), vec!["% page 3", "% page 1", "% page 2"]);
    }

    #[test]
    fn copy_does_not_drag_sibling_pages() {
        let doc = open(&create_test_pdf(4));
        let mut out = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut out, &doc, 2).unwrap();
        let bytes = LopdfBackend::save(out).unwrap();
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn copy_same_page_twice_yields_independent_pages() {
        let doc = open(&create_test_pdf(1));
        let mut out = LopdfBackend::create_output();
        let a = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let b = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        LopdfBackend::set_output_page_rotate(&mut out, b, 90).unwrap();
        assert_eq!(LopdfBackend::output_page_rotate(&out, a).unwrap(), 0);
        let bytes = LopdfBackend::save(out).unwrap();
        assert_eq!(page_rotations(&bytes), vec![0, 90]);
    }

    #[test]
    fn link_to_other_page_does_not_import_it() {
        let doc = open(&create_test_pdf_with_link());
        let mut out = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        LopdfBackend::copy_page(&mut out, &doc, 2).unwrap();

        let page_objects = out
            .doc
            .objects
            .values()
            .filter(|o| o.as_dict().is_ok_and(is_page_node))
            .count();
        assert_eq!(page_objects, 2);

        let first = out.page_dict(0).unwrap();
        let annot_id = first.get(b"Annots").unwrap().as_array().unwrap()[0]
            .as_reference()
            .unwrap();
        let annot = out.doc.get_object(annot_id).unwrap().as_dict().unwrap();
        let dest = annot.get(b"Dest").unwrap().as_array().unwrap();
        assert_eq!(dest[0], Object::Null);
        // The annotation's own page still resolves to the copy.
        assert_eq!(
            annot.get(b"P").unwrap().as_reference().unwrap(),
            out.kids[0]
        );

        let bytes = LopdfBackend::save(out).unwrap();
        assert_eq!(page_markers(&bytes), vec!["% page 1", "% page 2"]);
    }

    #[test]
    fn copy_pins_inherited_attributes() {
        let doc = open(&create_test_pdf_inherited(90));
        let mut out = LopdfBackend::create_output();
        let idx = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        assert_eq!(LopdfBackend::output_page_rotate(&out, idx).unwrap(), 90);
        assert_eq!(
            LopdfBackend::output_page_size(&out, idx).unwrap(),
            (595.0, 842.0)
        );

        let bytes = LopdfBackend::save(out).unwrap();
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = *reloaded.get_pages().values().next().unwrap();
        let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.get(b"Font").is_ok());
    }

    #[test]
    fn shared_objects_imported_once() {
        let doc = open(&create_test_pdf_inherited(0));
        let mut out = LopdfBackend::create_output();
        LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        LopdfBackend::copy_page(&mut out, &doc, 2).unwrap();
        let fonts = out
            .doc
            .objects
            .values()
            .filter(|o| {
                o.as_dict()
                    .and_then(|d| d.get(b"Type"))
                    .and_then(|t| t.as_name())
                    .is_ok_and(|n| n == b"Font")
            })
            .count();
        assert_eq!(fonts, 1);
    }

    // --- output pages ---

    #[test]
    fn set_rotate_round_trips_through_save() {
        let doc = open(&create_test_pdf_with_rotations(&[90]));
        let mut out = LopdfBackend::create_output();
        let idx = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let current = LopdfBackend::output_page_rotate(&out, idx).unwrap();
        LopdfBackend::set_output_page_rotate(&mut out, idx, current + 180).unwrap();
        let bytes = LopdfBackend::save(out).unwrap();
        assert_eq!(page_rotations(&bytes), vec![270]);
    }

    #[test]
    fn output_index_checked() {
        let out = LopdfBackend::create_output();
        let err: EditError = LopdfBackend::output_page_rotate(&out, 0).unwrap_err().into();
        assert!(matches!(err, EditError::InvalidInput(_)));
    }

    #[test]
    fn save_empty_output_has_no_pages() {
        let bytes = LopdfBackend::save(LopdfBackend::create_output()).unwrap();
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(reloaded.get_pages().is_empty());
    }

    // --- draw_image ---

    #[test]
    fn draw_image_adds_xobject_and_content() {
        let doc = open(&create_test_pdf(1));
        let mut out = LopdfBackend::create_output();
        let idx = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let image = EmbeddedImage::from_bytes(&crate::embed::encode_png(20, 10, true)).unwrap();
        let size = LopdfBackend::output_page_size(&out, idx).unwrap();
        let placement = Placement::centered(size, (20, 10), 0.5);
        LopdfBackend::draw_image(&mut out, idx, &image, placement).unwrap();

        let bytes = LopdfBackend::save(out).unwrap();
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = *reloaded.get_pages().values().next().unwrap();
        let page = reloaded.get_object(page_id).unwrap().as_dict().unwrap();

        let xobjects = page
            .get(b"Resources")
            .and_then(|r| r.as_dict())
            .and_then(|r| r.get(b"XObject"))
            .and_then(|x| x.as_dict())
            .unwrap();
        let image_id = xobjects.get(b"Im1").unwrap().as_reference().unwrap();
        let image_obj = reloaded.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image_obj.dict.get(b"Width").unwrap().as_i64().unwrap(), 20);
        assert!(image_obj.dict.get(b"SMask").is_ok());

        let content = String::from_utf8_lossy(&reloaded.get_page_content(page_id).unwrap())
            .into_owned();
        assert!(content.contains("% page 1"));
        assert!(content.contains("/Im1 Do"));
    }

    #[test]
    fn draw_jpeg_uses_dct() {
        let doc = open(&create_test_pdf(1));
        let mut out = LopdfBackend::create_output();
        let idx = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let jpeg = crate::embed::encode_jpeg(8, 8);
        let image = EmbeddedImage::from_bytes(&jpeg).unwrap();
        LopdfBackend::draw_image(
            &mut out,
            idx,
            &image,
            Placement::centered((612.0, 792.0), (8, 8), 0.5),
        )
        .unwrap();
        let has_dct = out.doc.objects.values().any(|o| {
            o.as_stream()
                .and_then(|s| s.dict.get(b"Filter"))
                .and_then(|f| f.as_name())
                .is_ok_and(|n| n == b"DCTDecode")
        });
        assert!(has_dct);
    }

    #[test]
    fn second_image_gets_fresh_name() {
        let doc = open(&create_test_pdf(1));
        let mut out = LopdfBackend::create_output();
        let idx = LopdfBackend::copy_page(&mut out, &doc, 1).unwrap();
        let image = EmbeddedImage::from_bytes(&crate::embed::encode_png(2, 2, false)).unwrap();
        let placement = Placement::centered((612.0, 792.0), (2, 2), 0.5);
        LopdfBackend::draw_image(&mut out, idx, &image, placement).unwrap();
        LopdfBackend::draw_image(&mut out, idx, &image, placement).unwrap();

        let page = out.page_dict(idx).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Im1"));
        assert!(xobjects.has(b"Im2"));
    }
}
