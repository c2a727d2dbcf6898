//! AI-assisted QA artifact generation pipeline.
//!
//! `qa_pipeline` turns requirement artifacts (user stories, design
//! references, screenshots, screen recordings) into a prioritized test
//! plan with Gherkin scenarios and a requirement-to-test traceability
//! matrix, using schema-constrained calls to a generative AI backend.
//!
//! The workflow is a fixed sequence of dependent stages:
//!
//! 1. **Analysis** (optional): surface gaps and ambiguities in the inputs.
//! 2. **Plan generation**: produce test cases as a markdown table plus
//!    Gherkin scenarios, parsed into structured records.
//! 3. **Prioritization**: assign a priority and rationale per test case.
//! 4. **Traceability**: map user stories to the test cases covering them.
//!
//! A failure in any stage stops the run immediately; later stages are
//! never invoked with partial data.
//!
//! # Quick start
//!
//! ```no_run
//! use qa_pipeline::{ExecCtx, InputBundle, QaPipeline, ServiceConfig};
//!
//! # async fn run() -> qa_pipeline::Result<()> {
//! let config = ServiceConfig::from_env()?;
//! let ctx = ExecCtx::from_config(&config);
//!
//! let bundle = InputBundle::new()
//!     .with_text("As a user, I can log in with email and password (US-101)");
//!
//! let pipeline = QaPipeline::new();
//! let analysis = pipeline.analyze(&ctx, &bundle).await?;
//! let result = pipeline
//!     .generate_plan(&ctx, &bundle, &analysis.findings)
//!     .await?;
//!
//! for case in &result.cases {
//!     println!("{} [{}] {}", case.record.id, case.priority, case.record.summary);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Backends are pluggable through the [`Backend`] trait; [`MockBackend`]
//! serves canned responses for tests, and [`GeminiBackend`] talks to the
//! Gemini `generateContent` API.

pub mod attachment;
pub mod backend;
pub mod config;
pub mod decode;
pub mod enrich;
pub mod error;
pub mod exec_ctx;
pub mod generation;
pub mod pipeline;
pub mod progress;
pub mod prompt;
pub mod table;
pub mod types;

pub use attachment::{Attachment, AttachmentStatus, InputBundle, MediaKind};
pub use backend::{Backend, GeminiBackend, GenRequest, GenResponse, MockBackend};
pub use config::ServiceConfig;
pub use error::{PipelineError, Result};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use generation::{GenCall, GenOutput};
pub use pipeline::QaPipeline;
pub use progress::{FnObserver, PipelineState, ProgressEvent, ProgressObserver};
pub use prompt::Part;
pub use types::{
    Analysis, Finding, PipelineResult, PrioritizedTestCase, TestCaseRecord, TraceabilityEntry,
};
