//! Markdown pipe-table parsing for generated test plans.
//!
//! The model's markdown output is not guaranteed well-formed. Column
//! resolution is name-based so header order does not matter, blank cells
//! fall back to per-field defaults so one malformed row cannot invalidate
//! the batch, and a missing required header aborts the whole parse (a
//! shifted header set would silently scramble every column mapping).

use crate::types::{TestCaseRecord, NOT_AVAILABLE};
use tracing::warn;

/// The eight required column headers, matched case-insensitively.
pub const REQUIRED_HEADERS: [&str; 8] = [
    "Test Case ID",
    "Test Type",
    "Summary",
    "Preconditions",
    "Test Steps",
    "Expected Result",
    "Story ID",
    "Risk Type",
];

/// Default risk assigned when the Risk Type cell is blank.
pub const DEFAULT_RISK: &str = "Medium";

/// Parse a markdown pipe-table into ordered test-case records.
///
/// Returns an empty list when any required header is absent; the caller
/// treats "no test cases produced" as a pipeline failure.
pub fn parse_test_cases(markdown: &str) -> Vec<TestCaseRecord> {
    let rows: Vec<&str> = markdown
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|') && !is_separator_row(line))
        .collect();

    let Some((header, data_rows)) = rows.split_first() else {
        return Vec::new();
    };

    let header_cells = split_row(header);
    let Some(columns) = resolve_columns(&header_cells) else {
        warn!("required column missing from test plan table header, aborting parse");
        return Vec::new();
    };

    data_rows
        .iter()
        .map(|row| {
            let cells = split_row(row);
            record_from_cells(&cells, &columns)
        })
        .collect()
}

/// Resolved index of each required column in the header row.
struct ColumnMap {
    id: usize,
    case_type: usize,
    summary: usize,
    preconditions: usize,
    steps: usize,
    expected_result: usize,
    story_id: usize,
    risk: usize,
}

fn resolve_columns(header_cells: &[String]) -> Option<ColumnMap> {
    let find = |name: &str| {
        header_cells
            .iter()
            .position(|cell| cell.eq_ignore_ascii_case(name))
    };
    Some(ColumnMap {
        id: find("Test Case ID")?,
        case_type: find("Test Type")?,
        summary: find("Summary")?,
        preconditions: find("Preconditions")?,
        steps: find("Test Steps")?,
        expected_result: find("Expected Result")?,
        story_id: find("Story ID")?,
        risk: find("Risk Type")?,
    })
}

/// A row consisting solely of dashes, colons, pipes, and whitespace is the
/// header separator.
fn is_separator_row(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c == '-' || c == ':' || c == '|' || c.is_whitespace())
}

/// Split a pipe row into trimmed cells, dropping only the empty leading and
/// trailing artifacts of the delimiters. Interior blank cells are kept so
/// column positions stay aligned.
fn split_row(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line.split('|').map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn cell_or<'a>(cells: &'a [String], idx: usize, default: &'a str) -> &'a str {
    match cells.get(idx) {
        Some(c) if !c.is_empty() => c,
        _ => default,
    }
}

fn record_from_cells(cells: &[String], columns: &ColumnMap) -> TestCaseRecord {
    let steps = cells
        .get(columns.steps)
        .map(|cell| {
            cell.split('→')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    TestCaseRecord {
        id: cell_or(cells, columns.id, NOT_AVAILABLE).to_string(),
        case_type: cell_or(cells, columns.case_type, NOT_AVAILABLE).to_string(),
        summary: cell_or(cells, columns.summary, NOT_AVAILABLE).to_string(),
        preconditions: cell_or(cells, columns.preconditions, NOT_AVAILABLE).to_string(),
        steps,
        expected_result: cell_or(cells, columns.expected_result, NOT_AVAILABLE).to_string(),
        story_id: cell_or(cells, columns.story_id, NOT_AVAILABLE).to_string(),
        risk: cell_or(cells, columns.risk, DEFAULT_RISK).to_string(),
    }
}
