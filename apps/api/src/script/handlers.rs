//! Axum route handlers for the Script API.

use std::time::Duration;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use tracing::debug;

use crate::auth::Subject;
use crate::errors::AppError;
use crate::script::generator::{GenerateScriptResponse, ScriptPipeline};
use crate::state::AppState;

/// POST /api/v1/scripts/generate
///
/// The subject check runs before body validation, so an unreadable body is
/// handed to the pipeline as a non-object payload rather than rejected here.
pub async fn handle_generate_script(
    subject: Option<Subject>,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateScriptResponse>, AppError> {
    let payload = match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            debug!("Unreadable generate-script body: {rejection}");
            Value::Null
        }
    };

    let pipeline = ScriptPipeline {
        catalog: state.catalog.as_ref(),
        backend: &state.script_backend,
        cache: state.script_cache.as_deref(),
        cache_ttl: Duration::from_secs(state.config.script_cache_ttl_secs),
    };

    let response = pipeline
        .generate(subject.as_ref().map(Subject::as_str), &payload)
        .await?;

    Ok(Json(response))
}
