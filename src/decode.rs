//! Defensive decoding of structured model responses.
//!
//! Schema-constrained call sites still receive text: sometimes clean JSON,
//! sometimes JSON wrapped in markdown fences or prose. Extraction is
//! defensive, but the final typed decode is strict; a shape mismatch maps
//! into [`PipelineError::InvalidResponse`] naming the call site rather than
//! being coerced downstream.

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract JSON content from markdown fenced code blocks.
///
/// Recognizes `` ```json ``, `` ```JSON ``, and plain `` ``` `` fences.
pub fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

/// Try to locate a JSON object or array in text that may contain
/// surrounding prose.
///
/// Tries, in order: markdown code block extraction, then the first `{` or
/// `[` with a matching closer.
pub fn extract_json_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(block) = extract_json_block(trimmed) {
        return Some(block);
    }

    if let Some(idx) = trimmed.find('{').or_else(|| trimmed.find('[')) {
        let candidate = &trimmed[idx..];
        if serde_json::from_str::<Value>(candidate).is_ok() {
            return Some(candidate.to_string());
        }
        let open = candidate.as_bytes()[0];
        let close = if open == b'{' { b'}' } else { b']' };
        if let Some(end) = candidate.rfind(close as char) {
            let substr = &candidate[..=end];
            if serde_json::from_str::<Value>(substr).is_ok() {
                return Some(substr.to_string());
            }
        }
    }

    None
}

/// Fix the two malformations models actually produce: trailing commas
/// before a closer, and single-quoted strings. Returns `None` when the
/// repaired text still fails to parse.
pub fn try_repair_json(text: &str) -> Option<String> {
    let mut repaired = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_double = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_double => {
                in_double = true;
                repaired.push(c);
            }
            '"' if in_double => {
                in_double = false;
                repaired.push(c);
            }
            '\\' if in_double => {
                repaired.push(c);
                if let Some(next) = chars.next() {
                    repaired.push(next);
                }
            }
            '\'' if !in_double => repaired.push('"'),
            ',' if !in_double => {
                // Drop a comma directly before a closer.
                let mut lookahead = chars.clone();
                while let Some(&n) = lookahead.peek() {
                    if n.is_whitespace() {
                        lookahead.next();
                    } else {
                        break;
                    }
                }
                match lookahead.peek() {
                    Some('}') | Some(']') => {}
                    _ => repaired.push(c),
                }
            }
            _ => repaired.push(c),
        }
    }

    serde_json::from_str::<Value>(&repaired)
        .ok()
        .map(|_| repaired)
}

/// Decode raw model text into a typed `T` for the named call site.
///
/// Strategies, in order: direct parse, fence/prose extraction, light repair.
/// Anything that still fails becomes `InvalidResponse { stage }` with the
/// serde message preserved.
pub fn decode_as<T: DeserializeOwned>(text: &str, stage: &str) -> Result<T> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(PipelineError::InvalidResponse {
            stage: stage.to_string(),
            message: "empty response".to_string(),
        });
    }

    let direct_err = match serde_json::from_str::<T>(trimmed) {
        Ok(val) => return Ok(val),
        Err(e) => e,
    };

    if let Some(candidate) = extract_json_candidate(trimmed) {
        match serde_json::from_str::<T>(&candidate) {
            Ok(val) => return Ok(val),
            Err(e) => {
                if let Some(repaired) = try_repair_json(&candidate) {
                    if let Ok(val) = serde_json::from_str::<T>(&repaired) {
                        return Ok(val);
                    }
                }
                return Err(PipelineError::InvalidResponse {
                    stage: stage.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some(repaired) = try_repair_json(trimmed) {
        if let Ok(val) = serde_json::from_str::<T>(&repaired) {
            return Ok(val);
        }
    }

    Err(PipelineError::InvalidResponse {
        stage: stage.to_string(),
        message: direct_err.to_string(),
    })
}
