//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over multimodal AI providers, translating
//! between normalized [`GenRequest`]/[`GenResponse`] types and the provider's
//! HTTP API. Built-in implementations: [`GeminiBackend`], [`MockBackend`].
//!
//! ```text
//! GenCall ──► GenRequest ──► Backend::generate() ──► GenResponse
//!                                   │
//!                        ┌──────────┴──────────┐
//!                  GeminiBackend          MockBackend
//!                  generateContent        canned responses
//! ```

pub mod gemini;
pub mod mock;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use crate::error::Result;
use crate::prompt::Part;
use async_trait::async_trait;
use reqwest::Client;

/// A normalized, provider-agnostic generation request.
///
/// [`GenCall`](crate::generation::GenCall) builds this from its config; the
/// [`Backend`] translates it into the provider-specific HTTP request.
#[derive(Debug, Clone)]
pub struct GenRequest {
    /// Model identifier (e.g. `"gemini-2.0-flash"`).
    pub model: String,

    /// Behavioral instruction for the whole call (system-level).
    pub instruction: String,

    /// Ordered multimodal parts.
    pub parts: Vec<Part>,

    /// Sampling temperature for this call site.
    pub temperature: f64,

    /// Structured-output contract. When set, the provider is asked for
    /// JSON constrained to this schema; when `None` the response is free text.
    pub response_schema: Option<serde_json::Value>,
}

/// A normalized generation response.
#[derive(Debug)]
pub struct GenResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, model version).
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over multimodal AI providers.
///
/// One request in, one response out. No retry is performed at this seam;
/// callers re-trigger a whole pipeline stage manually if needed.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a single generation call.
    async fn generate(
        &self,
        client: &Client,
        base_url: &str,
        request: &GenRequest,
    ) -> Result<GenResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
