use thiserror::Error;

/// Errors produced by the pipeline and its components.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The assembled prompt would contain no parts at all. Raised before
    /// any network call; the caller can re-prompt the user.
    #[error("no content to analyze")]
    NoContent,

    /// The input bundle carried neither text, nor a design reference,
    /// nor any ready attachment.
    #[error("input data missing")]
    MissingInput,

    /// A call site returned a shape that fails contract validation.
    /// `stage` names the operation ("analysis", "test plan generation", ...).
    #[error("invalid {stage} response format: {message}")]
    InvalidResponse { stage: String, message: String },

    /// The plan markdown was structurally valid but yielded zero records.
    #[error("failed to parse any test cases from generated markdown")]
    NoTestCases,

    /// A pipeline stage failed with a descriptive message.
    #[error("{stage} failed: {message}")]
    StageFailed { stage: String, message: String },

    /// The provider returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 400, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Invalid configuration detected at startup (missing credentials, etc.).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Wrap an underlying error with the name of the operation that failed.
    /// The underlying message is preserved, never swallowed.
    pub fn in_stage(stage: impl Into<String>, err: PipelineError) -> PipelineError {
        match err {
            // These already carry their own context.
            e @ PipelineError::InvalidResponse { .. } => e,
            e @ PipelineError::StageFailed { .. } => e,
            e @ PipelineError::NoTestCases => e,
            e @ PipelineError::NoContent => e,
            e @ PipelineError::MissingInput => e,
            e => PipelineError::StageFailed {
                stage: stage.into(),
                message: e.to_string(),
            },
        }
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
