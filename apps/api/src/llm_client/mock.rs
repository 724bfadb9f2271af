//! Deterministic stand-in for the LLM, enabled with `MOCK_SCRIPT=true`.
//!
//! Builds the script from the "Prompt guidance:" line of the request, one
//! chunk per sentence. Chunk orders are emitted in reverse so the normal
//! sanitization path is exercised end to end.

use async_trait::async_trait;
use serde_json::json;

use crate::llm_client::LlmError;
use crate::script::provider::{ScriptContentProvider, ScriptRequest};

const GUIDANCE_PREFIX: &str = "Prompt guidance:";
const FALLBACK_SCRIPT: &str = "Hello! Let's practice together.";

#[derive(Debug, Default, Clone, Copy)]
pub struct MockScriptProvider;

#[async_trait]
impl ScriptContentProvider for MockScriptProvider {
    async fn generate(&self, request: &ScriptRequest) -> Result<String, LlmError> {
        let guidance = request
            .user
            .lines()
            .find_map(|line| line.strip_prefix(GUIDANCE_PREFIX))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_SCRIPT);

        let sentences = split_sentences(guidance);
        let chunks: Vec<_> = sentences
            .iter()
            .enumerate()
            .rev()
            .map(|(order, text)| json!({"order": order, "text": text}))
            .collect();

        Ok(json!({
            "fullText": sentences.join(" "),
            "chunks": chunks,
        })
        .to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Splits after `.`, `!` and `?`, keeping the punctuation.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}
