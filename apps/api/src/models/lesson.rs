use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A lesson in the static catalog. Read-only from the API's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonTemplate {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub estimated_duration_seconds: i32,
    #[serde(default)]
    pub is_locked: bool,
    /// Ordered; each entry must be satisfied by the learner's personalization.
    #[serde(default)]
    pub required_personalization_fields: Vec<String>,
    pub prompt_template_id: String,
}
