//! Connection settings for the hosted recognition and speech models.

use super::AiError;

/// Default endpoint for the generative language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Model used for text recognition.
pub const DEFAULT_OCR_MODEL: &str = "gemini-3-flash-preview";
/// Model used for speech synthesis.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
/// Prebuilt synthesis voice.
pub const DEFAULT_VOICE: &str = "Kore";
/// Longest text sent to the speech model, in characters.
pub const DEFAULT_MAX_SPEECH_CHARS: usize = 4000;
/// Language hint used when the caller gives none.
pub const DEFAULT_LANGUAGE: &str = "Vietnamese";

/// Settings for [`GeminiClient`](super::GeminiClient).
#[derive(Clone, PartialEq)]
pub struct AiConfig {
    /// Endpoint base URL, without a trailing slash.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Model used for OCR.
    pub ocr_model: String,
    /// Model used for text-to-speech.
    pub tts_model: String,
    /// Prebuilt voice name.
    pub voice: String,
    /// Speech input is truncated to this many characters.
    pub max_speech_chars: usize,
    /// Default OCR language hint.
    pub language: String,
}

impl AiConfig {
    /// Defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            max_speech_chars: DEFAULT_MAX_SPEECH_CHARS,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Read settings from the process environment.
    ///
    /// The key comes from `PDFEDIT_API_KEY`, falling back to `API_KEY`.
    /// `PDFEDIT_AI_BASE_URL` overrides the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::MissingApiKey`] if neither key variable is set.
    pub fn from_env() -> Result<Self, AiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AiError> {
        let api_key = ["PDFEDIT_API_KEY", "API_KEY"]
            .into_iter()
            .filter_map(&lookup)
            .find(|key| !key.trim().is_empty())
            .ok_or(AiError::MissingApiKey)?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("PDFEDIT_AI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("ocr_model", &self.ocr_model)
            .field("tts_model", &self.tts_model)
            .field("voice", &self.voice)
            .field("max_speech_chars", &self.max_speech_chars)
            .field("language", &self.language)
            .finish()
    }
}
