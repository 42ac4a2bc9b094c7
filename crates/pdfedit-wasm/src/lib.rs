//! WebAssembly/JavaScript bindings for pdfedit.
//!
//! Exposes [`EditSession`] to a browser page editor via wasm-bindgen.
//! Thumbnails are rendered by the page (e.g. pdf.js); this module supplies
//! the edit state and the CSS transform each thumbnail should carry.
//! Complex types are serialized to JsValue using serde_wasm_bindgen.

use wasm_bindgen::prelude::*;

use pdfedit::{EditError, EditOptions, EditSession, ProcessedResult, ResultId, RotationDirection};

fn js_error(err: EditError) -> JsError {
    JsError::new(&err.to_string())
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

/// A page-editing session (WASM binding).
///
/// # JavaScript Usage
///
/// ```js
/// const session = new WasmEditSession();
/// session.load(pdfBytes, "report.pdf");
/// session.rotateRight(3);
/// session.deletePage(5);
/// session.movePage(3, 1);
/// const id = session.commit();
/// const bytes = session.resultData(id);
/// ```
#[wasm_bindgen]
pub struct WasmEditSession {
    inner: EditSession,
    merge_inputs: Vec<Vec<u8>>,
}

impl Default for WasmEditSession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmEditSession {
    /// Create an empty session.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmEditSession {
        WasmEditSession {
            inner: EditSession::new(EditOptions::default()),
            merge_inputs: Vec::new(),
        }
    }

    /// Load a PDF from raw bytes (Uint8Array in JavaScript), replacing the
    /// current document.
    pub fn load(&mut self, data: &[u8], filename: &str) -> Result<(), JsError> {
        self.inner.load(data, filename).map_err(js_error)?;
        Ok(())
    }

    /// Load an encrypted PDF.
    #[wasm_bindgen(js_name = "loadWithPassword")]
    pub fn load_with_password(
        &mut self,
        data: &[u8],
        password: &str,
        filename: &str,
    ) -> Result<(), JsError> {
        self.inner
            .load_with_password(data, password, filename)
            .map_err(js_error)?;
        Ok(())
    }

    /// Drop the current document. Results are kept.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Number of pages in the loaded document, 0 when none.
    #[wasm_bindgen(getter, js_name = "pageCount")]
    pub fn page_count(&self) -> usize {
        self.inner.page_count().unwrap_or(0)
    }

    /// Name of the loaded document.
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> Option<String> {
        self.inner.filename().map(str::to_string)
    }

    /// Page count, rotation, and size of each page.
    pub fn info(&self) -> Result<JsValue, JsError> {
        let info = self.inner.info().map_err(js_error)?;
        to_js(&info)
    }

    /// The edit records in display order.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> Result<JsValue, JsError> {
        match self.inner.state() {
            Some(state) => to_js(state),
            None => Ok(JsValue::NULL),
        }
    }

    /// Source page numbers in display order, deleted pages included.
    #[wasm_bindgen(js_name = "displayOrder")]
    pub fn display_order(&self) -> Vec<u32> {
        self.inner
            .state()
            .map(|s| s.records().iter().map(|r| r.original_index() as u32).collect())
            .unwrap_or_default()
    }

    // ---- edits ----

    /// Rotate a page 90° clockwise.
    #[wasm_bindgen(js_name = "rotateRight")]
    pub fn rotate_right(&mut self, page: usize) {
        self.inner.rotate(page, RotationDirection::Right);
    }

    /// Rotate a page 90° counter-clockwise.
    #[wasm_bindgen(js_name = "rotateLeft")]
    pub fn rotate_left(&mut self, page: usize) {
        self.inner.rotate(page, RotationDirection::Left);
    }

    /// Mark a page deleted.
    #[wasm_bindgen(js_name = "deletePage")]
    pub fn delete_page(&mut self, page: usize) {
        self.inner.delete(page);
    }

    /// Rotate the selected pages (all when none are selected).
    #[wasm_bindgen(js_name = "bulkRotate")]
    pub fn bulk_rotate(&mut self, angle: i32) -> Result<(), JsError> {
        self.inner.bulk_rotate(angle).map_err(js_error)
    }

    /// Drag-and-drop: move the thumbnail at position `from` to `to`.
    #[wasm_bindgen(js_name = "movePage")]
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), JsError> {
        self.inner.move_page(from, to).map_err(js_error)
    }

    /// Replace the order with a permutation of the source page numbers.
    #[wasm_bindgen(js_name = "reorderPages")]
    pub fn reorder_pages(&mut self, pages: &[u32]) -> Result<(), JsError> {
        let pages: Vec<usize> = pages.iter().map(|&p| p as usize).collect();
        self.inner.reorder_pages(&pages).map_err(js_error)
    }

    /// CSS `transform` for a thumbnail, or undefined for an unknown page.
    #[wasm_bindgen(js_name = "previewTransform")]
    pub fn preview_transform(&self, page: usize) -> Option<String> {
        self.inner.preview_transform(page).map(|t| t.css())
    }

    /// True if the page is soft-deleted and its thumbnail should be hidden.
    #[wasm_bindgen(js_name = "isHidden")]
    pub fn is_hidden(&self, page: usize) -> bool {
        self.inner
            .preview_transform(page)
            .is_some_and(|t| t.hidden)
    }

    // ---- selection ----

    /// Toggle a page in the selection.
    pub fn toggle(&mut self, page: usize) {
        self.inner.toggle_page(page);
    }

    /// Select every remaining page, or clear if all are selected.
    #[wasm_bindgen(js_name = "selectAll")]
    pub fn select_all(&mut self) {
        self.inner.select_all();
    }

    /// Empty the selection.
    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    /// Selected pages that still exist, ascending.
    #[wasm_bindgen(js_name = "selectedPages")]
    pub fn selected_pages(&self) -> Vec<u32> {
        self.inner
            .selected_pages()
            .into_iter()
            .map(|p| p as u32)
            .collect()
    }

    // ---- commits and tools ----
    // Each returns the new result's id.

    /// Reconcile the edits into a new PDF.
    pub fn commit(&mut self) -> Result<String, JsError> {
        self.inner
            .commit_edits()
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Rotate the selected pages (all when none are selected) into a new PDF.
    #[wasm_bindgen(js_name = "rotatePages")]
    pub fn rotate_pages(&mut self, angle: i32) -> Result<String, JsError> {
        self.inner
            .rotate_pages(angle)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Extract the selected pages into a new PDF.
    #[wasm_bindgen(js_name = "splitSelected")]
    pub fn split_selected(&mut self) -> Result<String, JsError> {
        self.inner
            .split_selected()
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Extract a page range such as `"1-3, 5"` into a new PDF.
    #[wasm_bindgen(js_name = "splitRange")]
    pub fn split_range(&mut self, range: &str) -> Result<String, JsError> {
        self.inner
            .split_range(range)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Center a PNG or JPEG on the single selected page.
    #[wasm_bindgen(js_name = "insertImage")]
    pub fn insert_image(&mut self, image: &[u8]) -> Result<String, JsError> {
        self.inner
            .insert_image(image)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Center a PNG signature on the single selected page.
    pub fn sign(&mut self, signature: &[u8]) -> Result<String, JsError> {
        self.inner
            .sign(signature)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Encrypt the loaded PDF; `password` opens the result.
    pub fn protect(&mut self, password: &str) -> Result<String, JsError> {
        self.inner
            .protect(password)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    /// Queue a document for [`merge`](Self::merge).
    #[wasm_bindgen(js_name = "addMergeInput")]
    pub fn add_merge_input(&mut self, data: &[u8]) {
        self.merge_inputs.push(data.to_vec());
    }

    /// Number of queued merge inputs.
    #[wasm_bindgen(getter, js_name = "mergeInputCount")]
    pub fn merge_input_count(&self) -> usize {
        self.merge_inputs.len()
    }

    /// Merge the queued documents into `merged.pdf` and clear the queue.
    pub fn merge(&mut self) -> Result<String, JsError> {
        let inputs = std::mem::take(&mut self.merge_inputs);
        let slices: Vec<&[u8]> = inputs.iter().map(Vec::as_slice).collect();
        self.inner
            .merge(&slices)
            .map(|id| id.to_string())
            .map_err(js_error)
    }

    // ---- results ----

    /// Result metadata (id, operation, filename, MIME type, timestamp),
    /// newest first.
    pub fn results(&self) -> Result<JsValue, JsError> {
        let results: Vec<&ProcessedResult> = self.inner.results().iter().collect();
        to_js(&results)
    }

    /// Bytes of a result, for download.
    #[wasm_bindgen(js_name = "resultData")]
    pub fn result_data(&self, id: &str) -> Option<Vec<u8>> {
        self.find_result(id)
            .and_then(|id| self.inner.results().get(id))
            .map(|r| r.data().to_vec())
    }

    /// Remove a result. Returns false if the id is unknown.
    #[wasm_bindgen(js_name = "deleteResult")]
    pub fn delete_result(&mut self, id: &str) -> bool {
        match self.find_result(id) {
            Some(id) => self.inner.delete_result(id).is_some(),
            None => false,
        }
    }
}

impl WasmEditSession {
    fn find_result(&self, id: &str) -> Option<ResultId> {
        self.inner
            .results()
            .iter()
            .map(|r| r.id())
            .find(|rid| rid.to_string() == id)
    }
}
