//! Editing session: one loaded document, its edit overlay, and the result
//! history.

use std::sync::Arc;

use pdfedit_backend::{
    DocumentProvider, EmbeddedImage, LopdfBackend, LopdfDocument, extract_pages, merge,
    place_image, protect, reconcile,
};
use pdfedit_core::{
    EditError, EditOptions, Operation, PageEditState, PageId, PreviewTransform, ProcessedResult,
    ResultId, ResultList, RotationDirection, Selection, SessionToken, parse_page_range,
};

const PDF_MIME: &str = "application/pdf";
const MERGED_FILENAME: &str = "merged.pdf";

/// Page-level facts about the loaded source document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageInfo {
    /// 1-based page number.
    pub number: usize,
    /// Rotation stored in the source page.
    pub rotation: i32,
    /// MediaBox width in points.
    pub width: f64,
    /// MediaBox height in points.
    pub height: f64,
}

/// Summary of the loaded source document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentInfo {
    /// Name the document was loaded under.
    pub filename: String,
    /// Number of pages.
    pub page_count: usize,
    /// Per-page details, in source order.
    pub pages: Vec<PageInfo>,
}

struct LoadedDocument {
    doc: Arc<LopdfDocument>,
    filename: String,
    token: SessionToken,
    state: PageEditState,
    selection: Selection,
}

enum Job {
    Reconcile {
        state: PageEditState,
        options: EditOptions,
    },
    Extract {
        pages: Vec<usize>,
    },
    PlaceImage {
        page: usize,
        image: EmbeddedImage,
    },
    Protect {
        password: String,
    },
}

/// A commit captured from the session, ready to run off the UI thread.
///
/// The ticket owns everything it needs (a shared handle to the source and a
/// snapshot of the edit state), so the session stays free to change while
/// the job runs. Hand the [`Completed`] outcome back to
/// [`EditSession::finish`], which drops it if the document was replaced
/// in the meantime.
pub struct CommitTicket {
    token: SessionToken,
    operation: Operation,
    filename: String,
    doc: Arc<LopdfDocument>,
    job: Job,
}

impl CommitTicket {
    /// Identity of the document the ticket was captured from.
    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// The operation this ticket performs.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Build the output document. All-or-nothing: an error carries no bytes.
    pub fn run(self) -> Completed {
        let doc = self.doc.as_ref();
        let bytes = match &self.job {
            Job::Reconcile { state, options } => reconcile::<LopdfBackend>(doc, state, options),
            Job::Extract { pages } => extract_pages::<LopdfBackend>(doc, pages),
            Job::PlaceImage { page, image } => place_image::<LopdfBackend>(doc, *page, image),
            Job::Protect { password } => protect::<LopdfBackend>(doc, password),
        };
        let outcome =
            bytes.map(|bytes| ProcessedResult::new(self.operation, self.filename, PDF_MIME, bytes));
        Completed::new(self.token, outcome)
    }
}

/// Outcome of a ticket, tagged with the document identity it belongs to.
#[derive(Debug)]
pub struct Completed {
    token: SessionToken,
    outcome: Result<ProcessedResult, EditError>,
}

impl Completed {
    /// Tag an outcome with the session token it was produced under.
    pub fn new(token: SessionToken, outcome: Result<ProcessedResult, EditError>) -> Self {
        Self { token, outcome }
    }

    /// Identity of the document the work was started on.
    pub fn token(&self) -> SessionToken {
        self.token
    }
}

/// An editing session over one source document at a time.
///
/// Edits never touch the source: each mutator replaces the session's
/// [`PageEditState`] snapshot, and commits build new documents that land in
/// the session's [`ResultList`]. Results outlive the document they were made
/// from; loading another document keeps them.
///
/// # Example
///
/// ```ignore
/// let mut session = EditSession::new(EditOptions::default());
/// session.load(&bytes, "report.pdf")?;
/// session.rotate(3, RotationDirection::Right);
/// session.delete(5);
/// let id = session.commit_edits()?;
/// let pdf = session.results().get(id).unwrap().data();
/// ```
#[derive(Default)]
pub struct EditSession {
    loaded: Option<LoadedDocument>,
    options: EditOptions,
    results: ResultList,
}

impl EditSession {
    /// Create an empty session.
    pub fn new(options: EditOptions) -> Self {
        Self {
            loaded: None,
            options,
            results: ResultList::new(),
        }
    }

    /// Loading and reconciliation options.
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Load a document from bytes, replacing any current one.
    ///
    /// A fresh edit state and an empty selection are created, and the
    /// session token changes so that work started on the previous document
    /// is discarded when it completes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::ResourceLimitExceeded`] if a configured limit is
    /// exceeded, [`EditError::PasswordRequired`] for encrypted input,
    /// [`EditError::InvalidInput`] for a document without pages, and
    /// [`EditError::ExternalServiceFailure`] if the bytes are not a PDF.
    /// On error the current document (if any) is kept.
    pub fn load(&mut self, bytes: &[u8], filename: &str) -> Result<SessionToken, EditError> {
        self.options.check_input_size(bytes.len())?;
        let doc = LopdfBackend::open(bytes).map_err(EditError::from)?;
        self.install(doc, filename)
    }

    /// Load an encrypted document, decrypting it with `password`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidPassword`] if the password is wrong, plus
    /// everything [`load`](Self::load) returns.
    pub fn load_with_password(
        &mut self,
        bytes: &[u8],
        password: &str,
        filename: &str,
    ) -> Result<SessionToken, EditError> {
        self.options.check_input_size(bytes.len())?;
        let doc = LopdfBackend::open_with_password(bytes, password).map_err(EditError::from)?;
        self.install(doc, filename)
    }

    /// Load a document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::IoError`] if the file cannot be read, plus
    /// everything [`load`](Self::load) returns.
    #[cfg(feature = "std")]
    pub fn load_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<SessionToken, EditError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        self.load(&bytes, &filename)
    }

    fn install(&mut self, doc: LopdfDocument, filename: &str) -> Result<SessionToken, EditError> {
        let page_count = LopdfBackend::page_count(&doc);
        self.options.check_page_count(page_count)?;
        let state = PageEditState::initialize(page_count)?;
        let token = SessionToken::new();

        #[cfg(feature = "tracing")]
        tracing::info!(filename, page_count, %token, "loaded document");

        self.loaded = Some(LoadedDocument {
            doc: Arc::new(doc),
            filename: filename.to_string(),
            token,
            state,
            selection: Selection::new(),
        });
        Ok(token)
    }

    /// Drop the current document, its edit state, and its selection.
    /// Results are kept.
    pub fn clear(&mut self) {
        self.loaded = None;
    }

    fn loaded(&self) -> Result<&LoadedDocument, EditError> {
        self.loaded
            .as_ref()
            .ok_or_else(|| EditError::InvalidInput("no document loaded".to_string()))
    }

    pub(crate) fn require_loaded(&self) -> Result<(), EditError> {
        self.loaded().map(|_| ())
    }

    /// True if a document is loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Identity of the loaded document.
    pub fn token(&self) -> Option<SessionToken> {
        self.loaded.as_ref().map(|l| l.token)
    }

    /// Name the current document was loaded under.
    pub fn filename(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.filename.as_str())
    }

    /// Number of pages in the loaded document.
    pub fn page_count(&self) -> Option<usize> {
        self.loaded.as_ref().map(|l| l.state.len())
    }

    /// Current edit state snapshot.
    pub fn state(&self) -> Option<&PageEditState> {
        self.loaded.as_ref().map(|l| &l.state)
    }

    /// Current page selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.loaded.as_ref().map(|l| &l.selection)
    }

    /// Page count, source rotation, and page size of the loaded document.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded, and any
    /// provider failure reading page attributes.
    pub fn info(&self) -> Result<DocumentInfo, EditError> {
        let loaded = self.loaded()?;
        let doc = loaded.doc.as_ref();
        let page_count = LopdfBackend::page_count(doc);
        let pages = (1..=page_count)
            .map(|number| {
                let rotation = LopdfBackend::page_rotate(doc, number)?;
                let (width, height) = LopdfBackend::page_size(doc, number)?;
                Ok(PageInfo {
                    number,
                    rotation,
                    width,
                    height,
                })
            })
            .collect::<Result<Vec<_>, pdfedit_backend::BackendError>>()
            .map_err(EditError::from)?;
        Ok(DocumentInfo {
            filename: loaded.filename.clone(),
            page_count,
            pages,
        })
    }

    /// Display transform for a page thumbnail.
    pub fn preview_transform(&self, page: usize) -> Option<PreviewTransform> {
        self.state()?.get(page).map(PreviewTransform::for_record)
    }

    // --- edits ---

    fn update_state(
        &mut self,
        edit: impl FnOnce(&PageEditState) -> Result<PageEditState, EditError>,
    ) -> Result<(), EditError> {
        let loaded = self
            .loaded
            .as_mut()
            .ok_or_else(|| EditError::InvalidInput("no document loaded".to_string()))?;
        loaded.state = edit(&loaded.state)?;
        Ok(())
    }

    /// Rotate one page a quarter-turn. No-op for deleted or unknown pages,
    /// and when nothing is loaded.
    pub fn rotate(&mut self, page: usize, direction: RotationDirection) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.state = loaded.state.rotate(page, direction);
        }
    }

    /// Soft-delete one page. Idempotent; no-op when nothing is loaded.
    pub fn delete(&mut self, page: usize) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.state = loaded.state.delete(page);
        }
    }

    /// Rotate the selected pages (all pages when nothing is selected) by
    /// `angle` in the edit state.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded or `angle`
    /// is not a multiple of 90.
    pub fn bulk_rotate(&mut self, angle: i32) -> Result<(), EditError> {
        let selection = self.loaded()?.selection.clone();
        self.update_state(|s| s.bulk_rotate(&selection, angle))
    }

    /// Replace the page order with a permutation of the current ids.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if `order` is not a permutation;
    /// the previous state is kept.
    pub fn reorder(&mut self, order: &[PageId]) -> Result<(), EditError> {
        self.update_state(|s| s.reorder(order))
    }

    /// Drag-and-drop: move the record at list position `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if a position is out of bounds.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.update_state(|s| s.move_record(from, to))
    }

    /// Reorder by listing every source page number once.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidReorder`] if `pages` is not a permutation.
    pub fn reorder_pages(&mut self, pages: &[usize]) -> Result<(), EditError> {
        self.update_state(|s| s.reorder_by_pages(pages))
    }

    // --- selection ---

    /// Add `page` to the selection, or remove it if already selected.
    pub fn toggle_page(&mut self, page: usize) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.selection = loaded.selection.toggle(page);
        }
    }

    /// Select every remaining page, or clear if all are already selected.
    pub fn select_all(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.selection = loaded.selection.select_all(&loaded.state);
        }
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.selection = Selection::new();
        }
    }

    /// Selected pages that are still present, ascending.
    pub fn selected_pages(&self) -> Vec<usize> {
        self.loaded
            .as_ref()
            .map(|l| l.selection.effective(&l.state))
            .unwrap_or_default()
    }

    fn single_selected_page(&self, what: &str) -> Result<usize, EditError> {
        match self.selected_pages().as_slice() {
            [page] => Ok(*page),
            pages => Err(EditError::InvalidInput(format!(
                "select exactly one page to {what} ({} selected)",
                pages.len()
            ))),
        }
    }

    // --- commits ---

    fn ticket(&self, operation: Operation, job: Job) -> Result<CommitTicket, EditError> {
        let loaded = self.loaded()?;
        Ok(CommitTicket {
            token: loaded.token,
            operation,
            filename: format!("processed_{}", loaded.filename),
            doc: Arc::clone(&loaded.doc),
            job,
        })
    }

    /// Capture the current edits (rotation, deletion, order) for reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded and
    /// [`EditError::EmptyDocument`] if every page is deleted.
    pub fn prepare_commit(&self) -> Result<CommitTicket, EditError> {
        let state = self.loaded()?.state.clone();
        if state.active_count() == 0 {
            return Err(EditError::EmptyDocument);
        }
        let options = self.options.clone();
        self.ticket(Operation::Edit, Job::Reconcile { state, options })
    }

    /// Capture a rotate-tool run: the selected pages (all when none are
    /// selected) turned by `angle` on top of the current edits.
    /// The session's own edit state is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if `angle` is not 90, 180, or 270.
    pub fn prepare_rotate(&self, angle: i32) -> Result<CommitTicket, EditError> {
        if !matches!(angle, 90 | 180 | 270) {
            return Err(EditError::InvalidInput(format!(
                "rotation angle must be 90, 180, or 270, got {angle}"
            )));
        }
        let loaded = self.loaded()?;
        let state = loaded.state.bulk_rotate(&loaded.selection, angle)?;
        if state.active_count() == 0 {
            return Err(EditError::EmptyDocument);
        }
        let options = self.options.clone();
        self.ticket(Operation::Rotate, Job::Reconcile { state, options })
    }

    /// Capture a split that extracts the selected pages in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if no page is selected.
    pub fn prepare_split_selected(&self) -> Result<CommitTicket, EditError> {
        let pages = self.selected_pages();
        if pages.is_empty() {
            return Err(EditError::InvalidInput(
                "select at least one page to split".to_string(),
            ));
        }
        self.ticket(Operation::Split, Job::Extract { pages })
    }

    /// Capture a split that extracts the pages of a range expression such
    /// as `"1-3, 5"`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] for a malformed or empty range
    /// and [`EditError::IndexOutOfRange`] for pages past the end.
    pub fn prepare_split_range(&self, range: &str) -> Result<CommitTicket, EditError> {
        let page_count = self.loaded()?.state.len();
        let pages = parse_page_range(range, page_count)?;
        if pages.is_empty() {
            return Err(EditError::InvalidInput(format!(
                "page range '{range}' selects no pages"
            )));
        }
        self.ticket(Operation::Split, Job::Extract { pages })
    }

    /// Capture placing a PNG or JPEG, centered at half size, on the single
    /// selected page.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] unless exactly one page is
    /// selected or if the image cannot be decoded.
    pub fn prepare_insert_image(&self, image: &[u8]) -> Result<CommitTicket, EditError> {
        let page = self.single_selected_page("insert an image")?;
        let image = EmbeddedImage::from_bytes(image).map_err(EditError::from)?;
        self.ticket(Operation::InsertImage, Job::PlaceImage { page, image })
    }

    /// Like [`prepare_insert_image`](Self::prepare_insert_image), for a PNG
    /// signature.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] unless exactly one page is
    /// selected or if the signature is not a valid PNG.
    pub fn prepare_sign(&self, signature_png: &[u8]) -> Result<CommitTicket, EditError> {
        let page = self.single_selected_page("sign")?;
        let image = EmbeddedImage::from_png(signature_png).map_err(EditError::from)?;
        self.ticket(Operation::Signature, Job::PlaceImage { page, image })
    }

    /// Capture encrypting the source document with `password`, used as both
    /// the user and the owner password. Edits are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded or
    /// `password` is empty.
    pub fn prepare_protect(&self, password: &str) -> Result<CommitTicket, EditError> {
        if password.is_empty() {
            return Err(EditError::InvalidInput(
                "a password is required to protect a document".to_string(),
            ));
        }
        let password = password.to_string();
        self.ticket(Operation::Password, Job::Protect { password })
    }

    /// Accept a finished job.
    ///
    /// Returns `Ok(None)` and drops the outcome if the session has since
    /// loaded another document (or was cleared). Otherwise the result is
    /// added to the history, or the job's error is returned with the edit
    /// state untouched.
    ///
    /// # Errors
    ///
    /// Returns the error the job failed with.
    pub fn finish(&mut self, completed: Completed) -> Result<Option<ResultId>, EditError> {
        if self.token() != Some(completed.token) {
            #[cfg(feature = "tracing")]
            tracing::warn!(token = %completed.token, "discarding result for replaced document");
            return Ok(None);
        }
        let result = completed.outcome?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            operation = %result.operation(),
            filename = result.filename(),
            bytes = result.data().len(),
            "committed result"
        );

        Ok(Some(self.results.push(result).id()))
    }

    fn run_now(&mut self, ticket: CommitTicket) -> Result<ResultId, EditError> {
        self.finish(ticket.run())?
            .ok_or_else(|| EditError::InvalidInput("document changed during commit".to_string()))
    }

    /// Reconcile the current edits into a new PDF result.
    ///
    /// # Errors
    ///
    /// See [`prepare_commit`](Self::prepare_commit) and
    /// [`reconcile`](pdfedit_backend::reconcile).
    pub fn commit_edits(&mut self) -> Result<ResultId, EditError> {
        let ticket = self.prepare_commit()?;
        self.run_now(ticket)
    }

    /// Run the rotate tool. See [`prepare_rotate`](Self::prepare_rotate).
    ///
    /// # Errors
    ///
    /// See [`prepare_rotate`](Self::prepare_rotate).
    pub fn rotate_pages(&mut self, angle: i32) -> Result<ResultId, EditError> {
        let ticket = self.prepare_rotate(angle)?;
        self.run_now(ticket)
    }

    /// Extract the selected pages into a new PDF result.
    ///
    /// # Errors
    ///
    /// See [`prepare_split_selected`](Self::prepare_split_selected).
    pub fn split_selected(&mut self) -> Result<ResultId, EditError> {
        let ticket = self.prepare_split_selected()?;
        self.run_now(ticket)
    }

    /// Extract a page range into a new PDF result.
    ///
    /// # Errors
    ///
    /// See [`prepare_split_range`](Self::prepare_split_range).
    pub fn split_range(&mut self, range: &str) -> Result<ResultId, EditError> {
        let ticket = self.prepare_split_range(range)?;
        self.run_now(ticket)
    }

    /// Place an image on the selected page.
    ///
    /// # Errors
    ///
    /// See [`prepare_insert_image`](Self::prepare_insert_image).
    pub fn insert_image(&mut self, image: &[u8]) -> Result<ResultId, EditError> {
        let ticket = self.prepare_insert_image(image)?;
        self.run_now(ticket)
    }

    /// Place a signature on the selected page.
    ///
    /// # Errors
    ///
    /// See [`prepare_sign`](Self::prepare_sign).
    pub fn sign(&mut self, signature_png: &[u8]) -> Result<ResultId, EditError> {
        let ticket = self.prepare_sign(signature_png)?;
        self.run_now(ticket)
    }

    /// Encrypt the source document with `password`.
    ///
    /// # Errors
    ///
    /// See [`prepare_protect`](Self::prepare_protect).
    pub fn protect(&mut self, password: &str) -> Result<ResultId, EditError> {
        let ticket = self.prepare_protect(password)?;
        self.run_now(ticket)
    }

    /// Concatenate `inputs` into `merged.pdf`. Independent of the loaded
    /// document.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if `inputs` is empty, and any
    /// load or provider failure.
    pub fn merge(&mut self, inputs: &[&[u8]]) -> Result<ResultId, EditError> {
        let docs = inputs
            .iter()
            .map(|bytes| {
                self.options.check_input_size(bytes.len())?;
                let doc = LopdfBackend::open(bytes).map_err(EditError::from)?;
                self.options.check_page_count(LopdfBackend::page_count(&doc))?;
                Ok(doc)
            })
            .collect::<Result<Vec<_>, EditError>>()?;
        let bytes = merge::<LopdfBackend>(&docs)?;
        let result = ProcessedResult::new(Operation::Merge, MERGED_FILENAME, PDF_MIME, bytes);
        Ok(self.results.push(result).id())
    }

    // --- results ---

    /// Result history, newest first.
    pub fn results(&self) -> &ResultList {
        &self.results
    }

    /// Add an externally produced result (e.g. recognized text).
    pub fn push_result(&mut self, result: ProcessedResult) -> ResultId {
        self.results.push(result).id()
    }

    /// Remove a result from the history.
    pub fn delete_result(&mut self, id: ResultId) -> Option<ProcessedResult> {
        self.results.delete(id)
    }
}
