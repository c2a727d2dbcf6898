use serde::{Deserialize, Serialize};

/// Separator token used when steps are rendered as a single string.
/// Inside the data model steps are a native ordered sequence; this token
/// only appears at the serialization boundary (export, prompts, display).
pub const STEP_SEPARATOR: &str = " → ";

/// Sentinel placeholder for absent cells and identifiers.
pub const NOT_AVAILABLE: &str = "N/A";

/// Priority assigned to test cases the prioritization response did not cover.
pub const DEFAULT_PRIORITY: &str = "P2";

/// Reasoning string attached alongside [`DEFAULT_PRIORITY`].
pub const DEFAULT_REASONING: &str = "N/A - Defaulted";

/// A gap or ambiguity identified in a requirements artifact.
///
/// Produced by the analysis call and consumed as context by plan generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Category label (e.g. "Ambiguity", "Missing acceptance criteria").
    pub category: String,

    /// Free-text description of the gap.
    pub description: String,

    /// Originating requirement identifier, if the finding maps to one.
    #[serde(default)]
    pub story_id: Option<String>,
}

impl Finding {
    /// Render as a context line: `category (story-id-or-N/A): description`.
    pub fn context_line(&self) -> String {
        format!(
            "{} ({}): {}",
            self.category,
            self.story_id.as_deref().unwrap_or(NOT_AVAILABLE),
            self.description
        )
    }
}

/// Result of the analysis call: the findings surfaced over the input bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub findings: Vec<Finding>,
}

/// One row of the generated test plan, parsed from the markdown table.
///
/// The id is the primary key used by downstream enrichment joins.
/// Priority fields are absent at this point; see [`PrioritizedTestCase`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    pub id: String,
    pub case_type: String,
    pub summary: String,
    pub preconditions: String,
    /// Ordered step sequence. Use [`TestCaseRecord::steps_text`] to render
    /// with the separator token.
    pub steps: Vec<String>,
    pub expected_result: String,
    pub story_id: String,
    pub risk: String,
}

impl TestCaseRecord {
    /// Steps joined with [`STEP_SEPARATOR`] for export and display.
    pub fn steps_text(&self) -> String {
        self.steps.join(STEP_SEPARATOR)
    }
}

/// A test case augmented with a priority level and the model's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritizedTestCase {
    #[serde(flatten)]
    pub record: TestCaseRecord,

    /// Ordinal priority, lower-numbered is more urgent (e.g. "P1").
    pub priority: String,

    /// Why this priority was assigned.
    pub reasoning: String,
}

/// One row of the traceability matrix: a requirement and the test cases
/// covering it. Zero covering cases is representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityEntry {
    pub story_id: String,
    pub test_case_ids: Vec<String>,
}

/// Terminal aggregate of a pipeline run. Immutable once produced; a re-run
/// replaces the whole value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Prioritized test cases, in the order the plan produced them.
    pub cases: Vec<PrioritizedTestCase>,

    /// Gherkin scenarios as a single text blob.
    pub gherkin: String,

    /// Requirement-to-test-case coverage.
    pub traceability: Vec<TraceabilityEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TestCaseRecord {
        TestCaseRecord {
            id: "TC-1".into(),
            case_type: "Manual".into(),
            summary: "Login works".into(),
            preconditions: "None".into(),
            steps: vec!["Open app".into(), "Enter creds".into(), "Click login".into()],
            expected_result: "Redirect to dashboard".into(),
            story_id: "US-101".into(),
            risk: "Low".into(),
        }
    }

    #[test]
    fn test_steps_text_uses_separator() {
        assert_eq!(record().steps_text(), "Open app → Enter creds → Click login");
    }

    #[test]
    fn test_steps_text_single_step() {
        let mut r = record();
        r.steps = vec!["Only step".into()];
        assert_eq!(r.steps_text(), "Only step");
    }

    #[test]
    fn test_finding_context_line() {
        let f = Finding {
            category: "Ambiguity".into(),
            description: "Timeout unspecified".into(),
            story_id: Some("US-7".into()),
        };
        assert_eq!(f.context_line(), "Ambiguity (US-7): Timeout unspecified");
    }

    #[test]
    fn test_finding_context_line_without_story() {
        let f = Finding {
            category: "Gap".into(),
            description: "No error state".into(),
            story_id: None,
        };
        assert_eq!(f.context_line(), "Gap (N/A): No error state");
    }

    #[test]
    fn test_prioritized_case_serializes_flat() {
        let p = PrioritizedTestCase {
            record: record(),
            priority: "P1".into(),
            reasoning: "Auth is critical".into(),
        };
        let val = serde_json::to_value(&p).unwrap();
        assert_eq!(val["id"], "TC-1");
        assert_eq!(val["priority"], "P1");
    }
}
