use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::auth::Subject;
use crate::errors::AppError;
use crate::models::lesson::LessonTemplate;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LessonListResponse {
    pub lessons: Vec<LessonTemplate>,
}

/// GET /api/v1/lessons
pub async fn handle_list_lessons(
    subject: Subject,
    State(state): State<AppState>,
) -> Result<Json<LessonListResponse>, AppError> {
    let lessons = state.catalog.list_lessons().await?;
    debug!("Listing {} lessons for subject {}", lessons.len(), subject.0);
    Ok(Json(LessonListResponse { lessons }))
}
