//! Execution context shared across generation calls.
//!
//! [`ExecCtx`] carries the HTTP client, backend, endpoint, model, and the
//! optional progress observer. It is constructed once and shared across all
//! call sites of a pipeline run.

use crate::backend::{Backend, GeminiBackend};
use crate::config::ServiceConfig;
use crate::progress::ProgressObserver;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Shared execution context for generation calls.
///
/// # Example
///
/// ```
/// use qa_pipeline::ExecCtx;
///
/// let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
///     .model("gemini-2.0-flash")
///     .build();
/// ```
pub struct ExecCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the AI provider.
    pub base_url: String,
    /// Model identifier used for every call site.
    pub model: String,
    /// AI backend. Default: [`GeminiBackend`] without a key.
    pub backend: Arc<dyn Backend>,
    /// Optional observer for pipeline progress events.
    pub observer: Option<Arc<dyn ProgressObserver>>,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ExecCtxBuilder {
        ExecCtxBuilder {
            client: None,
            base_url: base_url.into(),
            model: None,
            backend: None,
            observer: None,
            timeout: None,
        }
    }

    /// Build a context from startup configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::builder(&config.base_url)
            .model(&config.model)
            .backend(Arc::new(
                GeminiBackend::new().with_api_key(&config.api_key),
            ))
            .build()
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("backend", &self.backend.name())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    client: Option<Client>,
    base_url: String,
    model: Option<String>,
    backend: Option<Arc<dyn Backend>>,
    observer: Option<Arc<dyn ProgressObserver>>,
    timeout: Option<Duration>,
}

impl ExecCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the model identifier. Default: `"gemini-2.0-flash"`.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the AI backend. Default: [`GeminiBackend`] without a key.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use the Gemini backend with API key authentication.
    pub fn gemini_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.backend = Some(Arc::new(GeminiBackend::new().with_api_key(api_key)));
        self
    }

    /// Set the progress observer.
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the request timeout. Default: 120 seconds.
    ///
    /// Ignored when a custom `Client` is provided via `.client()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> ExecCtx {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(120));
        let client = self.client.unwrap_or_else(|| {
            Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client")
        });
        ExecCtx {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            model: self
                .model
                .unwrap_or_else(|| crate::config::DEFAULT_MODEL.to_string()),
            backend: self.backend.unwrap_or_else(|| Arc::new(GeminiBackend::new())),
            observer: self.observer,
        }
    }
}
