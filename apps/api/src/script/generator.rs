//! Script generation: orchestrates the full pipeline.
//!
//! Flow: subject check → validate payload → fetch lesson → personalization
//!       coverage → cache lookup → fetch prompt template → acquire provider →
//!       build request → provider call → sanitize → cache store → respond.
//!
//! One provider attempt per invocation; failures are terminal.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::errors::AppError;
use crate::script::cache::{script_cache_key, CachedScript, ScriptCache};
use crate::script::coverage::ensure_personalization_coverage;
use crate::script::payload::validate_payload;
use crate::script::provider::ScriptBackend;
use crate::script::request::build_script_request;
use crate::script::sanitizer::{sanitize_script_response, ScriptChunk};

/// Response body of `GenerateScript`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScriptResponse {
    pub lesson_id: String,
    pub title: String,
    pub full_text: String,
    pub chunks: Vec<ScriptChunk>,
}

/// Collaborators for one pipeline run.
pub struct ScriptPipeline<'a> {
    pub catalog: &'a dyn CatalogStore,
    pub backend: &'a ScriptBackend,
    pub cache: Option<&'a dyn ScriptCache>,
    pub cache_ttl: Duration,
}

impl ScriptPipeline<'_> {
    /// Runs the pipeline. The subject check happens before anything else
    /// looks at the payload.
    pub async fn generate(
        &self,
        subject: Option<&str>,
        payload: &Value,
    ) -> Result<GenerateScriptResponse, AppError> {
        // Step 1: Subject
        let subject = subject
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        // Step 2: Validate payload
        let command = validate_payload(payload)?;
        info!(
            "Generating script for lesson {} (subject {subject}, {} {})",
            command.lesson_id, command.language_code, command.target_level
        );

        // Step 3: Lesson
        let lesson = self
            .catalog
            .get_lesson(&command.lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", command.lesson_id)))?;

        // Step 4: Personalization coverage
        ensure_personalization_coverage(
            &lesson.required_personalization_fields,
            &command.personalization,
        )?;

        // Cached result for identical inputs
        let cache_key = script_cache_key(subject, &command);
        if let Some(cached) = self.cached(&cache_key).await {
            info!(
                "Cache hit for lesson {} (generated at {})",
                command.lesson_id, cached.generated_at
            );
            return Ok(cached.response);
        }

        // Step 5: Prompt template
        let prompt = self
            .catalog
            .get_prompt_template(&lesson.prompt_template_id)
            .await?
            .ok_or_else(|| {
                AppError::FailedPrecondition(format!(
                    "Lesson {} references missing prompt template {}",
                    lesson.id, lesson.prompt_template_id
                ))
            })?;

        // Step 6: Provider
        let provider = self.backend.acquire()?;

        // Step 7: Build, call, sanitize
        let request = build_script_request(&lesson, &prompt, &command, subject);
        debug!(
            "Calling {} provider: {} system chars, {} user chars",
            provider.name(),
            request.system.len(),
            request.user.len()
        );

        let raw = provider.generate(&request).await.map_err(|e| {
            warn!("Provider {} failed for lesson {}: {e}", provider.name(), lesson.id);
            AppError::from(e)
        })?;
        let script = sanitize_script_response(&raw).map_err(|e| {
            warn!("Discarding provider output for lesson {}: {e}", lesson.id);
            AppError::from(e)
        })?;

        // Step 8: Respond
        let response = GenerateScriptResponse {
            lesson_id: lesson.id,
            title: lesson.title,
            full_text: script.full_text,
            chunks: script.chunks,
        };
        info!(
            "Generated script for lesson {} with {} chunks",
            response.lesson_id,
            response.chunks.len()
        );

        self.store(&cache_key, &response).await;
        Ok(response)
    }

    async fn cached(&self, key: &str) -> Option<CachedScript> {
        let cache = self.cache?;
        match cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Script cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    async fn store(&self, key: &str, response: &GenerateScriptResponse) {
        let Some(cache) = self.cache else {
            return;
        };
        let entry = CachedScript {
            response: response.clone(),
            generated_at: Utc::now(),
        };
        if let Err(e) = cache.put(key, &entry, self.cache_ttl).await {
            warn!("Script cache write failed: {e}");
        }
    }
}
