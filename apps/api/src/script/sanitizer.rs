//! Response sanitization: the decoder for the script output contract.
//!
//! Provider output is untrusted: orders may be missing, duplicated, stringly
//! typed or out of sequence. The result is always a gap-free `0..n` sequence
//! of non-empty chunks, or an error.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("LLM returned an empty response")]
    Empty,

    #[error("LLM response could not be parsed: {0}")]
    Unparseable(String),

    #[error("LLM response is missing required fields")]
    MissingFields,

    #[error("LLM response contained no usable chunks")]
    NoUsableChunks,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptChunk {
    pub order: u32,
    pub text: String,
}

/// `fullText` plus the re-sequenced chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedScript {
    pub full_text: String,
    pub chunks: Vec<ScriptChunk>,
}

pub fn sanitize_script_response(raw: &str) -> Result<SanitizedScript, SanitizeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SanitizeError::Empty);
    }

    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| SanitizeError::Unparseable(e.to_string()))?;

    let full_text = parsed.get("fullText").and_then(Value::as_str);
    let raw_chunks = parsed.get("chunks").and_then(Value::as_array);
    let (Some(full_text), Some(raw_chunks)) = (full_text, raw_chunks) else {
        return Err(SanitizeError::MissingFields);
    };

    let mut candidates: Vec<(f64, String)> = raw_chunks
        .iter()
        .filter_map(|entry| {
            let order = entry.get("order").and_then(coerce_order)?;
            let text = entry
                .get("text")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            (order.is_finite() && !text.is_empty()).then(|| (order, text.to_string()))
        })
        .collect();

    if candidates.is_empty() {
        return Err(SanitizeError::NoUsableChunks);
    }

    // stable: equal orders (including -0 and 0) keep their original sequence
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let chunks: Vec<ScriptChunk> = candidates
        .into_iter()
        .enumerate()
        .map(|(index, (_, text))| ScriptChunk {
            order: index as u32,
            text,
        })
        .collect();

    let full_text = match full_text.trim() {
        "" => chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        trimmed => trimmed.to_string(),
    };

    Ok(SanitizedScript { full_text, chunks })
}

/// Numeric coercion of a raw `order` value. Numbers pass through, numeric
/// strings are parsed (blank counts as 0), `null` is 0 and booleans are 0/1.
/// Anything else, or an absent order, yields `None`.
fn coerce_order(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Array(_) | Value::Object(_) => None,
    }
}
