//! Pipeline orchestrator for the QA generation workflow.
//!
//! [`QaPipeline`] sequences the dependent generation calls (analysis, plan,
//! prioritization, traceability, documentation) with fail-fast semantics.
//! It holds no state between invocations; each operation takes its inputs
//! and returns an immutable result, and progress is surfaced only through
//! the context's [`ProgressObserver`](crate::progress::ProgressObserver).

use crate::attachment::InputBundle;
use crate::enrich::{apply_priorities, build_matrix, PriorityAssignment};
use crate::error::{PipelineError, Result};
use crate::exec_ctx::ExecCtx;
use crate::generation::GenCall;
use crate::progress::{emit, PipelineState};
use crate::prompt::{assemble_parts, findings_context, section, Part};
use crate::table::parse_test_cases;
use crate::types::{Analysis, Finding, PipelineResult, PrioritizedTestCase, TraceabilityEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    findings: Vec<Finding>,
}

#[derive(Debug, Deserialize)]
struct PlanResponse {
    test_cases_markdown: String,
    gherkin_scenarios: String,
}

#[derive(Debug, Deserialize)]
struct PrioritizationResponse {
    prioritized_cases: Vec<PriorityAssignment>,
}

#[derive(Debug, Deserialize)]
struct TraceabilityResponse {
    matrix: Vec<TraceabilityEntry>,
}

/// Minimal per-case projection sent to the prioritization call site to
/// control payload size.
#[derive(Debug, Serialize)]
struct CaseProjection<'a> {
    test_case_id: &'a str,
    summary: &'a str,
    risk: &'a str,
}

/// Pair projection sent to the traceability call site.
#[derive(Debug, Serialize)]
struct CoveragePair<'a> {
    test_case_id: &'a str,
    story_id: &'a str,
}

/// Stateless orchestrator over the generation call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct QaPipeline;

impl QaPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Analyze the input bundle for gaps and ambiguities.
    pub async fn analyze(&self, ctx: &ExecCtx, bundle: &InputBundle) -> Result<Analysis> {
        if !bundle.has_content() {
            return Err(PipelineError::MissingInput);
        }

        emit(
            &ctx.observer,
            PipelineState::Analyzing,
            "Analyzing requirement artifacts",
        );

        let outcome: Result<Vec<Finding>> = async {
            let parts = assemble_parts(bundle, None)?;
            let output = GenCall::analysis().invoke(ctx, parts).await?;
            let decoded: AnalysisResponse = output.decode_as()?;
            Ok(decoded.findings)
        }
        .await;

        match outcome {
            Ok(findings) => {
                debug!(findings = findings.len(), "analysis complete");
                Ok(Analysis { findings })
            }
            Err(err) => {
                emit(&ctx.observer, PipelineState::Failed, err.to_string());
                Err(err)
            }
        }
    }

    /// Run the three dependent generation stages:
    /// plan → prioritization → traceability.
    ///
    /// Stages run strictly sequentially; each stage's input is the previous
    /// stage's output. Any failure stops the run immediately with a
    /// contextualized error and nothing partial is stitched together.
    pub async fn generate_plan(
        &self,
        ctx: &ExecCtx,
        bundle: &InputBundle,
        findings: &[Finding],
    ) -> Result<PipelineResult> {
        if !bundle.has_content() {
            return Err(PipelineError::MissingInput);
        }

        match self.run_plan_stages(ctx, bundle, findings).await {
            Ok(result) => Ok(result),
            Err(err) => {
                emit(&ctx.observer, PipelineState::Failed, err.to_string());
                Err(err)
            }
        }
    }

    async fn run_plan_stages(
        &self,
        ctx: &ExecCtx,
        bundle: &InputBundle,
        findings: &[Finding],
    ) -> Result<PipelineResult> {
        // --- Stage: plan ---
        emit(
            &ctx.observer,
            PipelineState::GeneratingPlan,
            "Generating test plan and Gherkin scenarios",
        );

        let extra = if findings.is_empty() {
            None
        } else {
            Some(section(
                "Findings from prior analysis",
                &findings_context(findings),
            ))
        };
        let parts = assemble_parts(bundle, extra.as_deref())?;

        let output = GenCall::plan().invoke(ctx, parts).await?;
        let plan: PlanResponse = output.decode_as()?;

        let records = parse_test_cases(&plan.test_cases_markdown);
        if records.is_empty() {
            warn!("plan markdown yielded no parsable test cases");
            return Err(PipelineError::NoTestCases);
        }
        debug!(cases = records.len(), "test plan parsed");

        // --- Stage: prioritization ---
        emit(
            &ctx.observer,
            PipelineState::PrioritizingPlan,
            "Prioritizing test cases",
        );

        let projection: Vec<CaseProjection<'_>> = records
            .iter()
            .map(|r| CaseProjection {
                test_case_id: &r.id,
                summary: &r.summary,
                risk: &r.risk,
            })
            .collect();
        let parts = vec![Part::text(serde_json::to_string(&projection)?)];

        let output = GenCall::prioritization().invoke(ctx, parts).await?;
        let decoded: PrioritizationResponse = output.decode_as()?;
        let cases = apply_priorities(records, &decoded.prioritized_cases);

        // --- Stage: traceability ---
        emit(
            &ctx.observer,
            PipelineState::GeneratingTraceability,
            "Building traceability matrix",
        );

        let pairs: Vec<CoveragePair<'_>> = cases
            .iter()
            .map(|c| CoveragePair {
                test_case_id: &c.record.id,
                story_id: &c.record.story_id,
            })
            .collect();
        let parts = vec![Part::text(serde_json::to_string(&pairs)?)];

        let output = GenCall::traceability().invoke(ctx, parts).await?;
        let decoded: TraceabilityResponse = output.decode_as()?;
        let traceability = build_matrix(&cases, decoded.matrix);

        emit(
            &ctx.observer,
            PipelineState::PlanGenerated,
            "Test plan ready",
        );

        Ok(PipelineResult {
            cases,
            gherkin: plan.gherkin_scenarios,
            traceability,
        })
    }

    /// Generate narrative QA documentation from a finished pipeline result.
    pub async fn generate_documentation(
        &self,
        ctx: &ExecCtx,
        result: &PipelineResult,
    ) -> Result<String> {
        let parts = vec![
            Part::text(section("Prioritized test plan", &plan_digest(&result.cases))),
            Part::text(section("Gherkin scenarios", &result.gherkin)),
            Part::text(section(
                "Traceability",
                &serde_json::to_string(&result.traceability)?,
            )),
        ];

        let output = GenCall::documentation().invoke(ctx, parts).await?;
        Ok(output.into_text())
    }
}

/// Compact one-line-per-case rendering used as documentation input.
fn plan_digest(cases: &[PrioritizedTestCase]) -> String {
    cases
        .iter()
        .map(|c| {
            format!(
                "{} [{}] {} (story {}, risk {}): {}",
                c.record.id, c.priority, c.record.summary, c.record.story_id, c.record.risk,
                c.record.steps_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::progress::{FnObserver, ProgressEvent};
    use std::sync::{Arc, Mutex};

    const PLAN_TABLE: &str = "| Test Case ID | Test Type | Summary | Preconditions | Test Steps | Expected Result | Story ID | Risk Type |\\n|---|---|---|---|---|---|---|---|\\n| TC-1 | Manual | Login works | None | Open app \u{2192} Enter creds \u{2192} Click login | Redirect to dashboard | US-101 | Low |";

    fn plan_response() -> String {
        format!(
            r#"{{"test_cases_markdown": "{}", "gherkin_scenarios": "Feature: Login"}}"#,
            PLAN_TABLE
        )
    }

    fn prioritization_response() -> String {
        r#"{"prioritized_cases":[{"test_case_id":"TC-1","priority":"P1","reasoning":"Auth is critical"}]}"#
            .to_string()
    }

    fn traceability_response() -> String {
        r#"{"matrix":[{"story_id":"US-101","test_case_ids":["TC-1"]}]}"#.to_string()
    }

    fn ctx_with(mock: Arc<MockBackend>) -> ExecCtx {
        ExecCtx::builder("http://unused").backend(mock).build()
    }

    fn bundle() -> InputBundle {
        InputBundle::new().with_text("Users can log in with email and password")
    }

    #[tokio::test]
    async fn test_end_to_end_plan_generation() {
        let mock = Arc::new(MockBackend::new(vec![
            plan_response(),
            prioritization_response(),
            traceability_response(),
        ]));
        let ctx = ctx_with(mock.clone());

        let result = QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap();

        assert_eq!(result.cases.len(), 1);
        let case = &result.cases[0];
        assert_eq!(case.record.id, "TC-1");
        assert_eq!(case.record.case_type, "Manual");
        assert_eq!(case.record.summary, "Login works");
        assert_eq!(case.record.preconditions, "None");
        assert_eq!(
            case.record.steps_text(),
            "Open app → Enter creds → Click login"
        );
        assert_eq!(case.record.expected_result, "Redirect to dashboard");
        assert_eq!(case.record.story_id, "US-101");
        assert_eq!(case.record.risk, "Low");
        assert_eq!(case.priority, "P1");
        assert_eq!(case.reasoning, "Auth is critical");

        assert_eq!(result.gherkin, "Feature: Login");
        assert_eq!(result.traceability.len(), 1);
        assert_eq!(result.traceability[0].story_id, "US-101");
        assert_eq!(result.traceability[0].test_case_ids, vec!["TC-1"]);

        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fail_fast_on_unparsable_plan() {
        let mock = Arc::new(MockBackend::fixed(
            r#"{"test_cases_markdown": "no table here", "gherkin_scenarios": "Feature: x"}"#,
        ));
        let ctx = ctx_with(mock.clone());

        let err = QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoTestCases));
        // Prioritization and traceability were never attempted.
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_plan_shape_stops_run() {
        let mock = Arc::new(MockBackend::fixed(r#"{"test_cases_markdown": "| t |"}"#));
        let ctx = ctx_with(mock.clone());

        let err = QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap_err();

        assert!(
            matches!(err, PipelineError::InvalidResponse { ref stage, .. } if stage == "test plan generation")
        );
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_bundle_rejected_before_any_call() {
        let mock = Arc::new(MockBackend::fixed("never"));
        let ctx = ctx_with(mock.clone());

        let err = QaPipeline::new()
            .generate_plan(&ctx, &InputBundle::new(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MissingInput));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let mock = Arc::new(MockBackend::new(vec![
            plan_response(),
            prioritization_response(),
            traceability_response(),
        ]));
        let seen: Arc<Mutex<Vec<PipelineState>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let ctx = ExecCtx::builder("http://unused")
            .backend(mock)
            .observer(Arc::new(FnObserver(move |event: ProgressEvent| {
                seen_clone.lock().unwrap().push(event.state);
            })))
            .build();

        QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                PipelineState::GeneratingPlan,
                PipelineState::PrioritizingPlan,
                PipelineState::GeneratingTraceability,
                PipelineState::PlanGenerated,
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_emits_failed_state() {
        let mock = Arc::new(MockBackend::fixed(
            r#"{"test_cases_markdown": "nothing tabular", "gherkin_scenarios": "x"}"#,
        ));
        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let ctx = ExecCtx::builder("http://unused")
            .backend(mock)
            .observer(Arc::new(FnObserver(move |event: ProgressEvent| {
                events_clone.lock().unwrap().push(event);
            })))
            .build();

        QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap_err();

        let events = events.lock().unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.state, PipelineState::Failed);
        assert_eq!(
            last.message,
            "failed to parse any test cases from generated markdown"
        );
    }

    #[tokio::test]
    async fn test_findings_folded_into_plan_context() {
        let mock = Arc::new(MockBackend::new(vec![
            plan_response(),
            prioritization_response(),
            traceability_response(),
        ]));
        let ctx = ctx_with(mock.clone());

        let findings = vec![Finding {
            category: "Ambiguity".into(),
            description: "Lockout policy unspecified".into(),
            story_id: Some("US-101".into()),
        }];

        QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &findings)
            .await
            .unwrap();

        let plan_request = &mock.requests()[0];
        let folded = plan_request.parts.iter().any(|p| {
            matches!(p, Part::Text(t) if t.contains("Ambiguity (US-101): Lockout policy unspecified"))
        });
        assert!(folded);
    }

    #[tokio::test]
    async fn test_unmatched_case_gets_default_priority() {
        let two_rows = PLAN_TABLE.to_string()
            + "\\n| TC-2 | Manual | Logout | None | Click logout | Back to login | US-102 | Low |";
        let plan = format!(
            r#"{{"test_cases_markdown": "{}", "gherkin_scenarios": "Feature: x"}}"#,
            two_rows
        );
        let mock = Arc::new(MockBackend::new(vec![
            plan,
            prioritization_response(), // only covers TC-1
            r#"{"matrix":[]}"#.to_string(),
        ]));
        let ctx = ctx_with(mock);

        let result = QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap();

        assert_eq!(result.cases.len(), 2);
        assert_eq!(result.cases[1].record.id, "TC-2");
        assert_eq!(result.cases[1].priority, "P2");
        assert_eq!(result.cases[1].reasoning, "N/A - Defaulted");
    }

    #[tokio::test]
    async fn test_analyze_decodes_findings() {
        let mock = Arc::new(MockBackend::fixed(
            r#"{"findings":[{"category":"Gap","description":"No error state","story_id":"US-7"}]}"#,
        ));
        let ctx = ctx_with(mock);

        let analysis = QaPipeline::new().analyze(&ctx, &bundle()).await.unwrap();
        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].category, "Gap");
        assert_eq!(analysis.findings[0].story_id.as_deref(), Some("US-7"));
    }

    #[tokio::test]
    async fn test_analyze_invalid_shape() {
        let mock = Arc::new(MockBackend::fixed(r#"{"nothing": true}"#));
        let ctx = ctx_with(mock);

        let err = QaPipeline::new().analyze(&ctx, &bundle()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidResponse { ref stage, .. } if stage == "analysis"));
    }

    #[tokio::test]
    async fn test_generate_documentation() {
        let plan_mock = Arc::new(MockBackend::new(vec![
            plan_response(),
            prioritization_response(),
            traceability_response(),
        ]));
        let ctx = ctx_with(plan_mock);
        let result = QaPipeline::new()
            .generate_plan(&ctx, &bundle(), &[])
            .await
            .unwrap();

        let doc_mock = Arc::new(MockBackend::fixed("# QA Documentation\n\nScope..."));
        let doc_ctx = ctx_with(doc_mock.clone());
        let doc = QaPipeline::new()
            .generate_documentation(&doc_ctx, &result)
            .await
            .unwrap();

        assert!(doc.starts_with("# QA Documentation"));
        let request = &doc_mock.requests()[0];
        assert!(request.response_schema.is_none());
        let mentions_case = request
            .parts
            .iter()
            .any(|p| matches!(p, Part::Text(t) if t.contains("TC-1")));
        assert!(mentions_case);
    }
}
