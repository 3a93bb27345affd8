// Generative model backend
//
// One request in, one reply text out. Everything above this layer (prompts,
// schema validation, error classification) lives in `transcribe`.

pub mod api;

use async_trait::async_trait;
use serde_json::{Value, json};

pub use api::GeminiBackend;
use crate::credential::Credential;
use crate::error::Result;

/// One piece of request content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Binary payload, already base64-encoded
    InlineData { mime_type: String, data: String },
}

/// A single-turn content generation request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    /// When set, the reply is constrained to JSON matching this schema
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(prompt.into())],
            response_schema: None,
        }
    }

    /// Inline media followed by an instruction.
    pub fn with_media(data: impl Into<String>, mime_type: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![
                Part::InlineData {
                    mime_type: mime_type.into(),
                    data: data.into(),
                },
                Part::Text(prompt.into()),
            ],
            response_schema: None,
        }
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Concatenated text parts, for logging and matching.
    pub fn prompt(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_media(&self) -> bool {
        self.parts.iter().any(|part| matches!(part, Part::InlineData { .. }))
    }
}

/// Response schema for an array of subtitle entries.
pub fn subtitle_entries_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "startTime": {
                    "type": "STRING",
                    "description": "The start time of the subtitle entry in 'HH:MM:SS,mmm' format."
                },
                "endTime": {
                    "type": "STRING",
                    "description": "The end time of the subtitle entry in 'HH:MM:SS,mmm' format."
                },
                "text": {
                    "type": "STRING",
                    "description": "The transcribed text for this time segment."
                }
            },
            "required": ["startTime", "endTime", "text"]
        }
    })
}

/// Hosted generative model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Perform exactly one generation call and return the reply text.
    async fn generate(&self, request: GenerateRequest, credential: &Credential) -> Result<String>;
}
