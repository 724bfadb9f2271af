//! Payload validation: turns an untyped request body into a typed command.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::AppError;

/// Learner-supplied values keyed by field name. Sorted so the summary and
/// cache key are deterministic.
pub type Personalization = BTreeMap<String, String>;

/// A validated `GenerateScript` request. All strings are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateScriptCommand {
    pub lesson_id: String,
    pub language_code: String,
    pub target_level: String,
    pub personalization: Personalization,
}

pub fn validate_payload(payload: &Value) -> Result<GenerateScriptCommand, AppError> {
    let root = payload.as_object().ok_or_else(|| {
        AppError::InvalidArgument("Request body must be a JSON object".to_string())
    })?;

    let lesson_id = required_string(root, "lessonId")?;
    let language_code = required_string(root, "languageCode")?;
    let target_level = required_string(root, "targetLevel")?;
    let personalization = personalization_map(root)?;

    Ok(GenerateScriptCommand {
        lesson_id,
        language_code,
        target_level,
        personalization,
    })
}

fn required_string(root: &Map<String, Value>, field: &str) -> Result<String, AppError> {
    root.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidArgument(format!("{field} must be a non-empty string")))
}

/// Empty-after-trim values are kept here; coverage is enforced per lesson later.
fn personalization_map(root: &Map<String, Value>) -> Result<Personalization, AppError> {
    let raw = root
        .get("personalization")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::InvalidArgument("personalization must be an object".to_string()))?;

    raw.iter()
        .map(|(key, value)| {
            value
                .as_str()
                .map(|s| (key.clone(), s.trim().to_string()))
                .ok_or_else(|| {
                    AppError::InvalidArgument(format!("personalization.{key} must be a string"))
                })
        })
        .collect()
}
