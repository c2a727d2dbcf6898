use qa_pipeline::{ExecCtx, FnObserver, InputBundle, QaPipeline, ServiceConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Requires GEMINI_API_KEY in the environment (or a .env file).
    let config = ServiceConfig::from_env()?;
    let ctx = ExecCtx::builder(&config.base_url)
        .model(&config.model)
        .gemini_with_key(&config.api_key)
        .observer(Arc::new(FnObserver(|event| {
            println!("[{:?}] {}", event.state, event.message);
        })))
        .build();

    let bundle = InputBundle::new().with_text(
        "US-101: As a user, I can log in with email and password.\n\
         US-102: As a user, I can reset my password via an emailed link.",
    );

    let pipeline = QaPipeline::new();

    let analysis = pipeline.analyze(&ctx, &bundle).await?;
    println!("\nFindings:");
    for finding in &analysis.findings {
        println!("  - {}", finding.context_line());
    }

    let result = pipeline
        .generate_plan(&ctx, &bundle, &analysis.findings)
        .await?;

    println!("\nTest plan:");
    for case in &result.cases {
        println!(
            "  {} [{}] {} ({})",
            case.record.id, case.priority, case.record.summary, case.reasoning
        );
    }

    println!("\nTraceability:");
    for entry in &result.traceability {
        println!("  {} -> {}", entry.story_id, entry.test_case_ids.join(", "));
    }

    println!("\nGherkin:\n{}", result.gherkin);

    Ok(())
}
