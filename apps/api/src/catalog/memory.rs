use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::catalog::CatalogStore;
use crate::errors::AppError;
use crate::models::lesson::LessonTemplate;
use crate::models::prompt::PromptTemplate;

/// Shape of the catalog seed file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub lessons: Vec<LessonTemplate>,
    #[serde(default)]
    pub prompts: Vec<PromptTemplate>,
}

/// Immutable in-process catalog, loaded once at startup.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    lessons: HashMap<String, LessonTemplate>,
    prompts: HashMap<String, PromptTemplate>,
}

impl InMemoryCatalog {
    pub fn new(lessons: Vec<LessonTemplate>, prompts: Vec<PromptTemplate>) -> Self {
        Self {
            lessons: lessons.into_iter().map(|l| (l.id.clone(), l)).collect(),
            prompts: prompts.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog seed file {}", path.display()))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .with_context(|| format!("Catalog seed file {} is not valid", path.display()))?;

        info!(
            "Loaded catalog seed: {} lessons, {} prompt templates",
            seed.lessons.len(),
            seed.prompts.len()
        );
        Ok(Self::new(seed.lessons, seed.prompts))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_lessons(&self) -> Result<Vec<LessonTemplate>, AppError> {
        let mut lessons: Vec<LessonTemplate> = self.lessons.values().cloned().collect();
        lessons.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(lessons)
    }

    async fn get_lesson(&self, lesson_id: &str) -> Result<Option<LessonTemplate>, AppError> {
        Ok(self.lessons.get(lesson_id).cloned())
    }

    async fn get_prompt_template(
        &self,
        prompt_id: &str,
    ) -> Result<Option<PromptTemplate>, AppError> {
        Ok(self.prompts.get(prompt_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lesson(id: &str, category: &str, title: &str) -> LessonTemplate {
        LessonTemplate {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: String::new(),
            category: category.to_string(),
            estimated_duration_seconds: 60,
            is_locked: false,
            required_personalization_fields: vec![],
            prompt_template_id: "p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_lessons_orders_by_category_then_title() {
        let catalog = InMemoryCatalog::new(
            vec![
                lesson("c", "travel", "At the Airport"),
                lesson("b", "basics", "Numbers"),
                lesson("a", "basics", "Greetings"),
            ],
            vec![],
        );

        let ids: Vec<String> = catalog
            .list_lessons()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "lessons": [{{
                    "id": "intro",
                    "title": "Introduce Yourself",
                    "requiredPersonalizationFields": ["user_name"],
                    "promptTemplateId": "intro-prompt"
                }}],
                "prompts": [{{"id": "intro-prompt", "userPrompt": "Hi {{{{user_name}}}}"}}]
            }}"#
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_seed_file(file.path()).unwrap();
        let lesson = catalog.get_lesson("intro").await.unwrap().unwrap();
        assert_eq!(lesson.required_personalization_fields, vec!["user_name"]);
        assert!(!lesson.is_locked);

        let prompt = catalog
            .get_prompt_template("intro-prompt")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(prompt.user_prompt, "Hi {{user_name}}");
        assert!(catalog.get_lesson("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bundled_seed_is_consistent() {
        let catalog =
            InMemoryCatalog::from_seed_file(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog.seed.json"))
                .unwrap();
        for lesson in catalog.list_lessons().await.unwrap() {
            assert!(
                catalog
                    .get_prompt_template(&lesson.prompt_template_id)
                    .await
                    .unwrap()
                    .is_some(),
                "lesson {} has no prompt template",
                lesson.id
            );
        }
    }

    #[test]
    fn test_from_seed_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(InMemoryCatalog::from_seed_file(file.path()).is_err());
    }
}
