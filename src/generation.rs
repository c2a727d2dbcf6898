//! Generation client: one configured call per pipeline call site.
//!
//! A [`GenCall`] bundles the behavioral instruction, sampling temperature,
//! and optional structured-output schema for one operation. Invoking it
//! issues exactly one backend request; there is no internal retry, and every
//! failure is wrapped with the operation name before it propagates.

use crate::backend::GenRequest;
use crate::decode;
use crate::error::{PipelineError, Result};
use crate::exec_ctx::ExecCtx;
use crate::prompt::Part;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Near-deterministic sampling for analysis and parsing-oriented calls.
pub const LOW_TEMPERATURE: f64 = 0.2;

/// Higher sampling for narrative generation (QA documentation).
pub const NARRATIVE_TEMPERATURE: f64 = 0.7;

/// One configured generation call site.
pub struct GenCall {
    /// Operation name used in progress and error context
    /// (e.g. "analysis", "test plan generation").
    stage: String,
    instruction: String,
    temperature: f64,
    response_schema: Option<Value>,
}

impl GenCall {
    pub fn new(stage: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            instruction: instruction.into(),
            temperature: LOW_TEMPERATURE,
            response_schema: None,
        }
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// The requirements-analysis call site: finds gaps and ambiguities.
    pub fn analysis() -> Self {
        Self::new(
            "analysis",
            "You are a senior QA analyst. Review the supplied requirement \
             artifacts and list gaps, ambiguities, and missing acceptance \
             criteria as findings.",
        )
        .with_schema(json!({
            "type": "OBJECT",
            "properties": {
                "findings": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "category": { "type": "STRING" },
                            "description": { "type": "STRING" },
                            "story_id": { "type": "STRING" }
                        },
                        "required": ["category", "description"]
                    }
                }
            },
            "required": ["findings"]
        }))
    }

    /// The test-plan call site: markdown table plus Gherkin scenarios.
    pub fn plan() -> Self {
        Self::new(
            "test plan generation",
            "You are a senior QA engineer. Produce a complete test plan for \
             the supplied requirements as a markdown table with exactly these \
             columns: Test Case ID, Test Type, Summary, Preconditions, Test \
             Steps, Expected Result, Story ID, Risk Type. Separate steps with \
             the \u{2192} character. Also produce Gherkin scenarios covering \
             the same cases.",
        )
        .with_schema(json!({
            "type": "OBJECT",
            "properties": {
                "test_cases_markdown": { "type": "STRING" },
                "gherkin_scenarios": { "type": "STRING" }
            },
            "required": ["test_cases_markdown", "gherkin_scenarios"]
        }))
    }

    /// The prioritization call site over a minimal per-case projection.
    pub fn prioritization() -> Self {
        Self::new(
            "prioritization",
            "You are a QA lead. Assign each test case a priority from P0 \
             (most urgent) to P3 based on its summary and risk, with a short \
             reasoning.",
        )
        .with_schema(json!({
            "type": "OBJECT",
            "properties": {
                "prioritized_cases": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "test_case_id": { "type": "STRING" },
                            "priority": { "type": "STRING" },
                            "reasoning": { "type": "STRING" }
                        },
                        "required": ["test_case_id", "priority", "reasoning"]
                    }
                }
            },
            "required": ["prioritized_cases"]
        }))
    }

    /// The traceability call site over {test_case_id, story_id} pairs.
    pub fn traceability() -> Self {
        Self::new(
            "traceability",
            "Build a requirement traceability matrix: for every story id, \
             list the test case ids covering it.",
        )
        .with_schema(json!({
            "type": "OBJECT",
            "properties": {
                "matrix": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "story_id": { "type": "STRING" },
                            "test_case_ids": {
                                "type": "ARRAY",
                                "items": { "type": "STRING" }
                            }
                        },
                        "required": ["story_id", "test_case_ids"]
                    }
                }
            },
            "required": ["matrix"]
        }))
    }

    /// The free-form QA documentation call site.
    pub fn documentation() -> Self {
        Self::new(
            "QA documentation",
            "You are a QA lead writing for stakeholders. Produce readable QA \
             documentation in markdown for the supplied test plan: scope, \
             approach, prioritization rationale, and coverage summary.",
        )
        .with_temperature(NARRATIVE_TEMPERATURE)
    }

    /// Issue the call once and return its output.
    ///
    /// Transport and HTTP failures come back wrapped with this call site's
    /// operation name, underlying message preserved.
    pub async fn invoke(&self, ctx: &ExecCtx, parts: Vec<Part>) -> Result<GenOutput> {
        if parts.is_empty() {
            return Err(PipelineError::NoContent);
        }

        let request = GenRequest {
            model: ctx.model.clone(),
            instruction: self.instruction.clone(),
            parts,
            temperature: self.temperature,
            response_schema: self.response_schema.clone(),
        };

        debug!(stage = %self.stage, backend = ctx.backend.name(), "issuing generation call");

        let response = ctx
            .backend
            .generate(&ctx.client, &ctx.base_url, &request)
            .await
            .map_err(|e| PipelineError::in_stage(self.stage.clone(), e))?;

        Ok(GenOutput {
            raw: response.text,
            stage: self.stage.clone(),
        })
    }
}

/// Output of one generation call.
#[derive(Debug, Clone)]
pub struct GenOutput {
    raw: String,
    stage: String,
}

impl GenOutput {
    /// Raw response text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consume as free-form text (documentation call site).
    pub fn into_text(self) -> String {
        self.raw
    }

    /// Decode into the expected shape for this call site.
    ///
    /// A parse failure or shape mismatch is a hard failure carrying the
    /// operation name, never silently coerced.
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T> {
        decode::decode_as(&self.raw, &self.stage)
    }
}
