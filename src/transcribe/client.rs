use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::credential::Credential;
use crate::error::{Result, SubgenError};
use crate::gemini::{GenerateRequest, GenerativeBackend, subtitle_entries_schema};
use crate::subtitle::SubtitleEntry;
use super::{Prompts, SubtitleService};

const REQUIRED_FIELDS: [&str; 3] = ["startTime", "endTime", "text"];

/// Subtitle service on top of a generative backend.
pub struct GeminiSubtitleClient {
    backend: Box<dyn GenerativeBackend>,
}

impl GeminiSubtitleClient {
    pub fn new(backend: Box<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }
}

/// Validate a timed transcription reply.
///
/// Only the first element is checked for the required fields; the rest are
/// read as-is.
fn parse_transcription(reply: &str) -> Result<Vec<SubtitleEntry>> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| SubgenError::Transcription(format!("response is not valid JSON: {}", e)))?;

    let items = value.as_array().ok_or_else(|| {
        SubgenError::Transcription("the model did not return a subtitle array".to_string())
    })?;

    if let Some(first) = items.first() {
        for field in REQUIRED_FIELDS {
            let present = first
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !present {
                return Err(SubgenError::Transcription(format!(
                    "subtitle data is malformed: first entry has no '{}'",
                    field
                )));
            }
        }
    }

    serde_json::from_value(value).map_err(|e| {
        SubgenError::Transcription(format!("subtitle data is malformed: {}", e))
    })
}

/// Validate a translated entry array against the source length.
fn parse_translation(reply: &str, expected_len: usize) -> Result<Vec<SubtitleEntry>> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| SubgenError::Translation(format!("response is not valid JSON: {}", e)))?;

    let len = value
        .as_array()
        .map(Vec::len)
        .ok_or_else(|| {
            SubgenError::Translation("the model did not return a subtitle array".to_string())
        })?;

    if len != expected_len {
        return Err(SubgenError::Translation(format!(
            "expected {} entries, got {}",
            expected_len, len
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| SubgenError::Translation(format!("subtitle data is malformed: {}", e)))
}

#[async_trait]
impl SubtitleService for GeminiSubtitleClient {
    async fn transcribe_to_srt(
        &self,
        audio_base64: &str,
        mime_type: &str,
        credential: &Credential,
    ) -> Result<Vec<SubtitleEntry>> {
        let request = GenerateRequest::with_media(audio_base64, mime_type, Prompts::transcribe_subtitles())
            .json_schema(subtitle_entries_schema());

        let reply = self
            .backend
            .generate(request, credential)
            .await
            .map_err(|e| {
                error!("Error during transcription: {}", e);
                SubgenError::Transcription(e.to_string())
            })?;

        let entries = parse_transcription(&reply).inspect_err(|e| {
            error!("Error during transcription: {}", e);
        })?;

        info!("Transcribed {} subtitle entries", entries.len());
        Ok(entries)
    }

    async fn transcribe_to_plain_text(
        &self,
        audio_base64: &str,
        mime_type: &str,
        credential: &Credential,
    ) -> Result<String> {
        let request = GenerateRequest::with_media(audio_base64, mime_type, Prompts::transcribe_plain_text());

        let reply = self
            .backend
            .generate(request, credential)
            .await
            .map_err(|e| {
                error!("Error during plain-text transcription: {}", e);
                SubgenError::Transcription(e.to_string())
            })?;

        let text = reply.trim().to_string();
        info!("Transcribed {} characters of plain text", text.chars().count());
        Ok(text)
    }

    async fn translate_subtitles(
        &self,
        entries: &[SubtitleEntry],
        target_language: &str,
        credential: &Credential,
    ) -> Result<Vec<SubtitleEntry>> {
        let entries_json = serde_json::to_string_pretty(entries)?;
        let prompt = Prompts::translate_subtitles(target_language, &entries_json);
        debug!("Translation prompt: {}", prompt);

        let request = GenerateRequest::text(prompt).json_schema(subtitle_entries_schema());

        let reply = self
            .backend
            .generate(request, credential)
            .await
            .map_err(|e| {
                error!("Error during translation: {}", e);
                SubgenError::Translation(e.to_string())
            })?;

        let translated = parse_translation(&reply, entries.len()).inspect_err(|e| {
            error!("Error during translation: {}", e);
        })?;

        info!("Translated {} subtitle entries to {}", translated.len(), target_language);
        Ok(translated)
    }

    async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
        credential: &Credential,
    ) -> Result<String> {
        let request = GenerateRequest::text(Prompts::translate_text(target_language, text));

        let reply = self
            .backend
            .generate(request, credential)
            .await
            .map_err(|e| {
                error!("Error during text translation: {}", e);
                SubgenError::Translation(e.to_string())
            })?;

        info!("Translated plain text to {}", target_language);
        Ok(reply.trim().to_string())
    }
}
