//! Text recognition and speech synthesis over rasterized pages.
//!
//! Pages are rendered by a caller-supplied [`PageRasterizer`], read by a
//! [`TextRecognizer`], and optionally voiced by a [`SpeechSynthesizer`].
//! [`GeminiClient`] implements both service traits against the hosted
//! generative language API; tests and offline callers plug in their own.

mod config;
mod gemini;
mod wav;

pub use config::{
    AiConfig, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_MAX_SPEECH_CHARS, DEFAULT_OCR_MODEL,
    DEFAULT_TTS_MODEL, DEFAULT_VOICE,
};
pub use gemini::{GeminiClient, NO_TEXT_FOUND};
pub use wav::{SPEECH_SAMPLE_RATE, pcm_to_wav, speech_wav};

use pdfedit_core::{
    EditError, Operation, PageRasterizer, ProcessedResult, RasterImage, ResultId,
};

use crate::EditSession;

/// Scale pages are rendered at before recognition.
pub const OCR_RENDER_SCALE: f32 = 1.5;

const OCR_FILENAME: &str = "ocr_result.txt";
const SPEECH_FILENAME: &str = "speech.wav";

/// Errors from the recognition and speech services.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// No API key was configured.
    #[error("API key is not configured (set PDFEDIT_API_KEY or API_KEY)")]
    MissingApiKey,

    /// The request could not be sent or the reply could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// There was no text to synthesize.
    #[error("no text to synthesize")]
    EmptyText,
}

impl From<AiError> for EditError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::EmptyText => EditError::InvalidInput(err.to_string()),
            other => EditError::ExternalServiceFailure(other.to_string()),
        }
    }
}

/// Reads the text in a page image.
pub trait TextRecognizer {
    /// Return the text in `image`; `language` is a hint.
    ///
    /// # Errors
    ///
    /// Returns an [`AiError`] if the service fails.
    fn recognize(&self, image: &RasterImage, language: &str) -> Result<String, AiError>;
}

/// Turns text into speech.
pub trait SpeechSynthesizer {
    /// Return raw little-endian 16-bit mono PCM at
    /// [`SPEECH_SAMPLE_RATE`].
    ///
    /// # Errors
    ///
    /// Returns [`AiError::EmptyText`] for blank input and any service
    /// failure.
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError>;
}

fn recognize_pages(
    rasterizer: &dyn PageRasterizer,
    recognizer: &dyn TextRecognizer,
    pages: &[usize],
    language: &str,
) -> Result<Vec<(usize, String)>, EditError> {
    pages
        .iter()
        .map(|&page| {
            let image = rasterizer.render(page, OCR_RENDER_SCALE)?;
            let text = recognizer.recognize(&image, language)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(page, chars = text.chars().count(), "recognized page");

            Ok((page, text))
        })
        .collect()
}

/// Recognize `pages` in order and format them as a text report with a
/// `--- Page N ---` heading per page.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] if `pages` is empty, and the first
/// rendering or recognition failure.
pub fn ocr_report(
    rasterizer: &dyn PageRasterizer,
    recognizer: &dyn TextRecognizer,
    pages: &[usize],
    language: &str,
) -> Result<String, EditError> {
    if pages.is_empty() {
        return Err(EditError::InvalidInput(
            "select at least one page to recognize".to_string(),
        ));
    }
    let texts = recognize_pages(rasterizer, recognizer, pages, language)?;
    Ok(texts
        .iter()
        .map(|(page, text)| format!("--- Page {page} ---\n{text}\n\n"))
        .collect())
}

/// Recognize `pages`, join the texts with spaces, and cut the result to
/// `max_chars` characters.
///
/// # Errors
///
/// Returns [`EditError::InvalidInput`] if `pages` is empty, and the first
/// rendering or recognition failure.
pub fn speech_text(
    rasterizer: &dyn PageRasterizer,
    recognizer: &dyn TextRecognizer,
    pages: &[usize],
    language: &str,
    max_chars: usize,
) -> Result<String, EditError> {
    if pages.is_empty() {
        return Err(EditError::InvalidInput(
            "select at least one page to read aloud".to_string(),
        ));
    }
    let texts = recognize_pages(rasterizer, recognizer, pages, language)?;
    let joined = texts
        .iter()
        .map(|(_, text)| text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(joined.chars().take(max_chars).collect())
}

impl EditSession {
    /// Recognize the text of the selected pages into `ocr_result.txt`.
    ///
    /// `rasterizer` must render the document currently loaded.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded or selected,
    /// and [`EditError::ExternalServiceFailure`] if a service call fails.
    pub fn ocr(
        &mut self,
        rasterizer: &dyn PageRasterizer,
        recognizer: &dyn TextRecognizer,
        language: &str,
    ) -> Result<ResultId, EditError> {
        self.require_loaded()?;
        let report = ocr_report(rasterizer, recognizer, &self.selected_pages(), language)?;
        let result = ProcessedResult::new(
            Operation::Ocr,
            OCR_FILENAME,
            "text/plain",
            report.into_bytes(),
        );
        Ok(self.push_result(result))
    }

    /// Read the selected pages aloud into `speech.wav`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidInput`] if nothing is loaded or selected
    /// or no text was recognized, and [`EditError::ExternalServiceFailure`]
    /// if a service call fails.
    pub fn text_to_speech(
        &mut self,
        rasterizer: &dyn PageRasterizer,
        recognizer: &dyn TextRecognizer,
        synthesizer: &dyn SpeechSynthesizer,
        config: &AiConfig,
    ) -> Result<ResultId, EditError> {
        self.require_loaded()?;
        let text = speech_text(
            rasterizer,
            recognizer,
            &self.selected_pages(),
            &config.language,
            config.max_speech_chars,
        )?;
        if text.trim().is_empty() {
            return Err(AiError::EmptyText.into());
        }
        let pcm = synthesizer.synthesize(&text)?;

        #[cfg(feature = "tracing")]
        tracing::info!(chars = text.chars().count(), pcm_bytes = pcm.len(), "synthesized speech");

        let result = ProcessedResult::new(
            Operation::TextToSpeech,
            SPEECH_FILENAME,
            "audio/wav",
            speech_wav(&pcm),
        );
        Ok(self.push_result(result))
    }
}
