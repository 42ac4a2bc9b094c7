//! HTTP client for the hosted generative language API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pdfedit_core::RasterImage;
use serde_json::{Value, json};

use super::{AiConfig, AiError, SpeechSynthesizer, TextRecognizer};

/// Returned when the model answers without any text.
pub const NO_TEXT_FOUND: &str = "No text found.";

/// Recognizer and synthesizer backed by `generateContent`.
pub struct GeminiClient {
    config: AiConfig,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Create a client for `config`.
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn generate(&self, model: &str, body: &Value) -> Result<Value, AiError> {
        let url = endpoint(&self.config.base_url, model);

        #[cfg(feature = "tracing")]
        tracing::debug!(model, "calling generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json()?)
    }
}

impl TextRecognizer for GeminiClient {
    fn recognize(&self, image: &RasterImage, language: &str) -> Result<String, AiError> {
        let response = self.generate(&self.config.ocr_model, &ocr_request(image, language))?;
        let text = response_text(&response)?;
        if text.trim().is_empty() {
            return Ok(NO_TEXT_FOUND.to_string());
        }
        Ok(text)
    }
}

impl SpeechSynthesizer for GeminiClient {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, AiError> {
        if text.trim().is_empty() {
            return Err(AiError::EmptyText);
        }
        let body = speech_request(text, &self.config.voice);
        let response = self.generate(&self.config.tts_model, &body)?;
        response_audio(&response)
    }
}

pub(crate) fn endpoint(base_url: &str, model: &str) -> String {
    format!("{base_url}/v1beta/models/{model}:generateContent")
}

pub(crate) fn ocr_prompt(language: &str) -> String {
    format!(
        "Extract all text from this image accurately. The language is likely {language}. \
         Preserve layout as much as possible."
    )
}

pub(crate) fn ocr_request(image: &RasterImage, language: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": image.format.mime_type(),
                        "data": STANDARD.encode(&image.data),
                    }
                },
                { "text": ocr_prompt(language) }
            ]
        }]
    })
}

pub(crate) fn speech_request(text: &str, voice: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": text }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice }
                }
            }
        }
    })
}

fn first_candidate_parts(response: &Value) -> Result<&Vec<Value>, AiError> {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AiError::MalformedResponse("no candidate content".to_string()))
}

/// Concatenated text parts of the first candidate.
pub(crate) fn response_text(response: &Value) -> Result<String, AiError> {
    let parts = first_candidate_parts(response)?;
    Ok(parts.iter().filter_map(|p| p["text"].as_str()).collect())
}

/// Decoded inline audio of the first candidate.
pub(crate) fn response_audio(response: &Value) -> Result<Vec<u8>, AiError> {
    let parts = first_candidate_parts(response)?;
    let data = parts
        .iter()
        .find_map(|p| p["inlineData"]["data"].as_str())
        .ok_or_else(|| AiError::MalformedResponse("no audio data in response".to_string()))?;
    STANDARD
        .decode(data)
        .map_err(|e| AiError::MalformedResponse(format!("invalid base64 audio: {e}")))
}
