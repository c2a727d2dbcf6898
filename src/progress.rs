//! Progress observation for pipeline runs.
//!
//! The orchestrator emits one [`ProgressEvent`] at the start of each
//! long-running stage. This is its only externally visible event stream;
//! an observer is entirely optional.

use std::sync::Arc;

/// States of the orchestrator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Analyzing,
    GeneratingPlan,
    PrioritizingPlan,
    GeneratingTraceability,
    /// Terminal success.
    PlanGenerated,
    /// Terminal failure; the caller reverts to the last stable state.
    Failed,
}

/// A progress update: human-readable message plus the state being entered.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub state: PipelineState,
}

/// Observer for pipeline progress.
///
/// Each event is emitted strictly before the network call it describes,
/// and a later stage's event never fires before the prior stage resolved.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// Emit an event if an observer is present. No-op otherwise.
pub(crate) fn emit(
    observer: &Option<Arc<dyn ProgressObserver>>,
    state: PipelineState,
    message: impl Into<String>,
) {
    if let Some(ref obs) = observer {
        obs.on_progress(ProgressEvent {
            message: message.into(),
            state,
        });
    }
}

/// A [`ProgressObserver`] backed by a closure.
///
/// # Example
///
/// ```
/// use qa_pipeline::progress::{FnObserver, ProgressEvent};
/// use std::sync::Arc;
///
/// let observer = Arc::new(FnObserver(|event: ProgressEvent| {
///     println!("[{:?}] {}", event.state, event.message);
/// }));
/// ```
pub struct FnObserver<F: Fn(ProgressEvent) + Send + Sync>(pub F);

impl<F: Fn(ProgressEvent) + Send + Sync> ProgressObserver for FnObserver<F> {
    fn on_progress(&self, event: ProgressEvent) {
        (self.0)(event);
    }
}
