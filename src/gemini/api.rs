use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::credential::Credential;
use crate::error::{Result, SubgenError};
use super::{GenerateRequest, GenerativeBackend, Part};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    fn describe_empty(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return format!("request blocked: {}", reason);
        }
        match self.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            Some(reason) => format!("no text in reply (finish reason: {})", reason),
            None => "no text in reply".to_string(),
        }
    }
}

/// Build the `generateContent` JSON body.
fn build_body(request: &GenerateRequest) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::InlineData { mime_type, data } => json!({
                "inline_data": { "mime_type": mime_type, "data": data }
            }),
        })
        .collect();

    let mut body = json!({
        "contents": [{ "role": "user", "parts": parts }]
    });

    if let Some(schema) = &request.response_schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }

    body
}

/// Gemini REST API client.
pub struct GeminiBackend {
    client: Client,
    config: ModelConfig,
}

impl GeminiBackend {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, request: GenerateRequest, credential: &Credential) -> Result<String> {
        let url = self.url();
        debug!(
            "Sending generateContent request to {} (media: {}, structured: {})",
            url,
            request.has_media(),
            request.response_schema.is_some()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&build_body(&request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}", status);
            return Err(SubgenError::Model(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let reply: GenerateContentResponse = response.json().await?;

        let text = reply
            .text()
            .ok_or_else(|| SubgenError::Model(reply.describe_empty()))?;

        debug!("Raw model reply: {}", text);
        Ok(text)
    }
}
