use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::CatalogStore;
use crate::errors::AppError;
use crate::models::lesson::LessonTemplate;
use crate::models::prompt::{PromptTemplate, PromptTemplateRow};

const LESSON_COLUMNS: &str = "id, title, subtitle, category, estimated_duration_seconds, \
    is_locked, required_personalization_fields, prompt_template_id";

/// Catalog backed by the `lessons` and `prompt_templates` tables.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_lessons(&self) -> Result<Vec<LessonTemplate>, AppError> {
        let lessons = sqlx::query_as::<_, LessonTemplate>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY category, title"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(lessons)
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonTemplate>, AppError> {
        let lesson = sqlx::query_as::<_, LessonTemplate>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"
        ))
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lesson)
    }

    async fn get_prompt_template(
        &self,
        prompt_id: &str,
    ) -> Result<Option<PromptTemplate>, AppError> {
        let row = sqlx::query_as::<_, PromptTemplateRow>(
            r#"
            SELECT id, user_prompt, system_prompt, chunking_type, chunking_max_length
            FROM prompt_templates
            WHERE id = $1
            "#,
        )
        .bind(prompt_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PromptTemplate::from))
    }
}
