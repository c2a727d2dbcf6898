//! Startup configuration for the AI service.
//!
//! Credentials are a process-start precondition, not part of the pipeline
//! contract: validate once with [`ServiceConfig::from_env`] and build an
//! [`ExecCtx`](crate::ExecCtx) from the result.

use crate::error::{PipelineError, Result};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the service base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Environment variable overriding the model identifier.
pub const MODEL_VAR: &str = "GEMINI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ServiceConfig {
    /// Read configuration from the environment (loading `.env` if present).
    ///
    /// The API key is required; base URL and model fall back to defaults.
    pub fn from_env() -> Result<Self> {
        // Ignore a missing .env file; real env vars still apply.
        let _ = dotenvy::dotenv();

        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::InvalidConfig(format!("{} is not set", API_KEY_VAR))
            })?;

        Ok(Self {
            api_key,
            base_url: std::env::var(BASE_URL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: std::env::var(MODEL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}
