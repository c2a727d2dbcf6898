use qa_pipeline::{ExecCtx, FnObserver, InputBundle, MockBackend, QaPipeline};
use std::sync::Arc;

const PLAN: &str = r#"{
  "test_cases_markdown": "| Test Case ID | Test Type | Summary | Preconditions | Test Steps | Expected Result | Story ID | Risk Type |\n|---|---|---|---|---|---|---|---|\n| TC-1 | Manual | Login with valid credentials | Account exists | Open app → Enter credentials → Submit | Dashboard shown | US-101 | High |\n| TC-2 | Manual | Login with wrong password | Account exists | Open app → Enter wrong password → Submit | Error shown | US-101 | Medium |",
  "gherkin_scenarios": "Feature: Login\n  Scenario: Valid credentials\n    Given an existing account\n    When I submit valid credentials\n    Then I see the dashboard"
}"#;

const PRIORITIES: &str = r#"{"prioritized_cases":[
  {"test_case_id":"TC-1","priority":"P1","reasoning":"Core authentication path"},
  {"test_case_id":"TC-2","priority":"P2","reasoning":"Negative path, lower impact"}
]}"#;

const MATRIX: &str = r#"{"matrix":[{"story_id":"US-101","test_case_ids":["TC-1","TC-2"]}]}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // No network: a mock backend cycles through canned stage responses.
    let mock = Arc::new(MockBackend::new(vec![
        PLAN.to_string(),
        PRIORITIES.to_string(),
        MATRIX.to_string(),
    ]));

    let ctx = ExecCtx::builder("http://localhost")
        .backend(mock)
        .observer(Arc::new(FnObserver(|event| {
            println!("[{:?}] {}", event.state, event.message);
        })))
        .build();

    let bundle = InputBundle::new().with_text("US-101: users can log in");
    let result = QaPipeline::new().generate_plan(&ctx, &bundle, &[]).await?;

    println!();
    for case in &result.cases {
        println!(
            "{} [{}] {} steps: {}",
            case.record.id,
            case.priority,
            case.record.summary,
            case.record.steps_text()
        );
    }
    for entry in &result.traceability {
        println!("{} covered by {}", entry.story_id, entry.test_case_ids.join(", "));
    }

    Ok(())
}
