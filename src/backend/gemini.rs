//! Backend for the Google Gemini `generateContent` API.
//!
//! Translates normalized [`GenRequest`]s into the REST wire format:
//! `system_instruction` for the behavioral instruction, one user content
//! with text and `inline_data` parts, and a `generationConfig` carrying
//! temperature plus the optional JSON response schema.

use super::{Backend, GenRequest, GenResponse};
use crate::error::{PipelineError, Result};
use crate::prompt::Part;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Backend for Gemini's `generateContent` endpoint.
///
/// The API key is sent as the `x-goog-api-key` header. A structured-output
/// request sets `response_mime_type: application/json` together with the
/// call site's `response_schema`.
#[derive(Debug, Clone, Default)]
pub struct GeminiBackend {
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate with the given API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Build the request body for `generateContent`.
    fn build_body(request: &GenRequest) -> Value {
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

        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(ref schema) = request.response_schema {
            generation_config["response_mime_type"] = json!("application/json");
            generation_config["response_schema"] = schema.clone();
        }

        json!({
            "system_instruction": { "parts": [{ "text": request.instruction }] },
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": generation_config,
        })
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(json_resp: &Value) -> String {
        json_resp
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default()
    }

    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        if let Some(v) = json_resp.get("usageMetadata") {
            meta.insert("usage".into(), v.clone());
        }
        if let Some(v) = json_resp.get("modelVersion") {
            meta.insert("model_version".into(), v.clone());
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn generate(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenRequest,
    ) -> Result<GenResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            request.model
        );
        let body = Self::build_body(request);

        debug!(model = %request.model, parts = request.parts.len(), "dispatching generateContent");

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.header("x-goog-api-key", key);
        }

        let resp = req.send().await.map_err(|e| {
            PipelineError::Other(format!("Failed to connect to AI service at {}: {}", url, e))
        })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::HttpError { status, body: text });
        }

        let json_resp: Value = resp.json().await?;
        Ok(GenResponse {
            text: Self::extract_text(&json_resp),
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
