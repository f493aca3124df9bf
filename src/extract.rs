//! Best-effort recovery of the JSON payload from a free-form model reply.
//!
//! The model is asked for bare JSON but frequently wraps it in a markdown fence.
//! This is a heuristic adapter, not a markdown parser: the first ```json block
//! wins, then the first untagged ``` block, then the whole reply. Blocks tagged
//! with any other language are ignored.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PredictionError, Result};
use crate::models::PredictionResult;

/// One complete fence: info string, then body up to the closing backticks
static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```([A-Za-z0-9_+-]*)[ \t]*\r?\n?([\s\S]*?)\r?\n?```").expect("fence pattern")
});

/// Slice of `content` holding the JSON payload. Fences tagged with another
/// language are skipped.
pub fn extract_json_payload(content: &str) -> &str {
    let mut untagged = None;
    for caps in FENCE.captures_iter(content) {
        let (Some(tag), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if tag.as_str().eq_ignore_ascii_case("json") {
            return body.as_str().trim();
        }
        if tag.as_str().is_empty() && untagged.is_none() {
            untagged = Some(body.as_str());
        }
    }
    untagged.unwrap_or(content).trim()
}

/// Decode a model reply into a PredictionResult. Shape mismatches are rejected,
/// never coerced; the raw reply travels with the error.
pub fn decode_prediction(content: &str) -> Result<PredictionResult> {
    let payload = extract_json_payload(content);
    serde_json::from_str::<PredictionResult>(payload)
        .map_err(|e| PredictionError::malformed(e.to_string(), content))
}
