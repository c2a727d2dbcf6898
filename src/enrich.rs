//! Enrichment steps: priority merge and traceability matrix construction.
//!
//! Both steps join a model response back onto the parsed records by a
//! stable key. The priority merge is a one-to-one augmentation, never a
//! filter: every input record appears exactly once in the output, in
//! original order, with defaults where the response left gaps.

use crate::types::{
    PrioritizedTestCase, TestCaseRecord, TraceabilityEntry, DEFAULT_PRIORITY, DEFAULT_REASONING,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One triple of the prioritization response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityAssignment {
    pub test_case_id: String,
    pub priority: String,
    pub reasoning: String,
}

/// Merge priority assignments onto records by test-case id.
///
/// Unmatched records receive `P2` / `"N/A - Defaulted"`; assignments for
/// unknown ids are ignored. Input order is preserved verbatim.
pub fn apply_priorities(
    records: Vec<TestCaseRecord>,
    assignments: &[PriorityAssignment],
) -> Vec<PrioritizedTestCase> {
    let lookup: HashMap<&str, &PriorityAssignment> = assignments
        .iter()
        .map(|a| (a.test_case_id.as_str(), a))
        .collect();

    records
        .into_iter()
        .map(|record| match lookup.get(record.id.as_str()) {
            Some(a) => PrioritizedTestCase {
                record,
                priority: a.priority.clone(),
                reasoning: a.reasoning.clone(),
            },
            None => PrioritizedTestCase {
                record,
                priority: DEFAULT_PRIORITY.to_string(),
                reasoning: DEFAULT_REASONING.to_string(),
            },
        })
        .collect()
}

/// Restrict a traceability response to requirement ids actually present in
/// the prioritized set.
///
/// An entry with an empty `test_case_ids` list is kept; a requirement can
/// legitimately have zero covering cases. Unknown story ids are dropped.
pub fn build_matrix(
    cases: &[PrioritizedTestCase],
    rows: Vec<TraceabilityEntry>,
) -> Vec<TraceabilityEntry> {
    let known: HashSet<&str> = cases.iter().map(|c| c.record.story_id.as_str()).collect();

    let (kept, dropped): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|row| known.contains(row.story_id.as_str()));

    if !dropped.is_empty() {
        debug!(
            dropped = dropped.len(),
            "traceability rows referenced unknown story ids"
        );
    }

    kept
}
