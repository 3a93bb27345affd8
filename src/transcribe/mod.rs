// Transcription and translation through a hosted generative model
//
// - Client: prompt building and validation of the model's structured replies
// - Prompts: instruction templates
//
// Every operation makes exactly one backend call. Nothing is retried or
// cached; failures surface to the caller immediately.

pub mod client;
pub mod prompts;

use async_trait::async_trait;

pub use client::GeminiSubtitleClient;
pub use prompts::Prompts;
use crate::config::ModelConfig;
use crate::credential::Credential;
use crate::error::Result;
use crate::gemini::GeminiBackend;
use crate::subtitle::SubtitleEntry;

/// Main trait for transcription and translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubtitleService: Send + Sync {
    /// Transcribe base64 audio into timed subtitle entries
    async fn transcribe_to_srt(
        &self,
        audio_base64: &str,
        mime_type: &str,
        credential: &Credential,
    ) -> Result<Vec<SubtitleEntry>>;

    /// Transcribe base64 audio into a single plain-text paragraph
    async fn transcribe_to_plain_text(
        &self,
        audio_base64: &str,
        mime_type: &str,
        credential: &Credential,
    ) -> Result<String>;

    /// Translate entry text, preserving times and entry count
    async fn translate_subtitles(
        &self,
        entries: &[SubtitleEntry],
        target_language: &str,
        credential: &Credential,
    ) -> Result<Vec<SubtitleEntry>>;

    /// Translate free text
    async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
        credential: &Credential,
    ) -> Result<String>;
}

/// Factory for creating subtitle service instances
pub struct SubtitleServiceFactory;

impl SubtitleServiceFactory {
    /// Create the default Gemini-backed service
    pub fn create_default(config: ModelConfig) -> Result<Box<dyn SubtitleService>> {
        let backend = GeminiBackend::new(config)?;
        Ok(Box::new(GeminiSubtitleClient::new(Box::new(backend))))
    }
}
