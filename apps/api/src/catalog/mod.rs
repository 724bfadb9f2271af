//! Lesson catalog: read-only access to lessons and their prompt templates.
//!
//! `AppState` holds an `Arc<dyn CatalogStore>`: `PgCatalogStore` when
//! `DATABASE_URL` is set, otherwise `InMemoryCatalog` loaded from a seed file.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::lesson::LessonTemplate;
use crate::models::prompt::PromptTemplate;

pub mod handlers;
pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::PgCatalogStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All lessons, ordered by category then title.
    async fn list_lessons(&self) -> Result<Vec<LessonTemplate>, AppError>;

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonTemplate>, AppError>;

    async fn get_prompt_template(
        &self,
        prompt_id: &str,
    ) -> Result<Option<PromptTemplate>, AppError>;
}
