//! Script-content provider: the pluggable backend that turns a fully built
//! request into raw structured text.
//!
//! `LlmClient` (Anthropic) is the production backend; `MockScriptProvider`
//! is selected with `MOCK_SCRIPT`. `AppState` carries a `ScriptBackend`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::LlmError;

/// Everything the provider needs for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRequest {
    /// System-level instructions.
    pub system: String,
    /// Learner context and prompt guidance.
    pub user: String,
    /// JSON Schema the response must satisfy.
    pub output_schema: Value,
    pub max_output_tokens: u32,
}

#[async_trait]
pub trait ScriptContentProvider: Send + Sync {
    /// Returns the raw (unsanitized) structured text produced for `request`.
    async fn generate(&self, request: &ScriptRequest) -> Result<String, LlmError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Provider configuration resolved at startup. An unavailable backend is not
/// fatal; each generation request reports it as a failed precondition.
#[derive(Clone)]
pub enum ScriptBackend {
    Ready(Arc<dyn ScriptContentProvider>),
    Unavailable(String),
}

impl ScriptBackend {
    pub fn acquire(&self) -> Result<&dyn ScriptContentProvider, AppError> {
        match self {
            ScriptBackend::Ready(provider) => Ok(provider.as_ref()),
            ScriptBackend::Unavailable(reason) => Err(AppError::FailedPrecondition(format!(
                "Script generation is not configured: {reason}"
            ))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScriptBackend::Ready(provider) => provider.name().to_string(),
            ScriptBackend::Unavailable(reason) => format!("unavailable ({reason})"),
        }
    }
}
