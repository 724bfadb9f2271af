//! Result cache for generated scripts.
//!
//! Keys are derived from the subject, the lesson and a SHA-256 over the
//! inputs that shape the script. Eviction is TTL-based on the store side.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::script::generator::GenerateScriptResponse;
use crate::script::payload::GenerateScriptCommand;

const KEY_PREFIX: &str = "scripts";

/// What gets stored under a cache key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CachedScript {
    pub response: GenerateScriptResponse,
    pub generated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ScriptCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedScript>, AppError>;

    async fn put(&self, key: &str, value: &CachedScript, ttl: Duration) -> Result<(), AppError>;
}

/// `scripts:{subject}:{lesson_id}:{sha256(language, level, personalization)}`
///
/// `%` and `:` in the subject and lesson id are percent-escaped so distinct
/// pairs never share a key.
pub fn script_cache_key(subject: &str, command: &GenerateScriptCommand) -> String {
    // personalization is a BTreeMap, so the serialized form is canonical
    let fingerprint = json!({
        "languageCode": command.language_code,
        "targetLevel": command.target_level,
        "personalization": command.personalization,
    });
    let digest = Sha256::digest(fingerprint.to_string().as_bytes());
    format!(
        "{KEY_PREFIX}:{}:{}:{}",
        escape_segment(subject),
        escape_segment(&command.lesson_id),
        hex::encode(digest)
    )
}

fn escape_segment(segment: &str) -> String {
    segment.replace('%', "%25").replace(':', "%3A")
}

// ────────────────────────────────────────────────────────────────────────────
// Redis
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisScriptCache {
    client: redis::Client,
}

impl RedisScriptCache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Cache(format!("Redis connection failed: {e}")))
    }
}

#[async_trait]
impl ScriptCache for RedisScriptCache {
    async fn get(&self, key: &str) -> Result<Option<CachedScript>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Cache(format!("Redis GET failed: {e}")))?;

        raw.map(|s| {
            serde_json::from_str(&s)
                .map_err(|e| AppError::Cache(format!("Cached script is corrupt: {e}")))
        })
        .transpose()
    }

    async fn put(&self, key: &str, value: &CachedScript, ttl: Duration) -> Result<(), AppError> {
        let payload = serde_json::to_string(value)
            .map_err(|e| AppError::Cache(format!("Failed to serialize script: {e}")))?;
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Cache(format!("Redis SET failed: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process
// ────────────────────────────────────────────────────────────────────────────

/// Process-local cache. Expired entries are purged on every write and
/// dropped on read.
#[derive(Default)]
pub struct InMemoryScriptCache {
    entries: RwLock<HashMap<String, (CachedScript, Instant)>>,
}

impl InMemoryScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ScriptCache for InMemoryScriptCache {
    async fn get(&self, key: &str) -> Result<Option<CachedScript>, AppError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: &CachedScript, ttl: Duration) -> Result<(), AppError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value.clone(), now + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::sanitizer::ScriptChunk;

    fn command(level: &str, pairs: &[(&str, &str)]) -> GenerateScriptCommand {
        GenerateScriptCommand {
            lesson_id: "intro".into(),
            language_code: "en-US".into(),
            target_level: level.into(),
            personalization: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn cached() -> CachedScript {
        CachedScript {
            response: GenerateScriptResponse {
                lesson_id: "intro".into(),
                title: "Introduce Yourself".into(),
                full_text: "Hello.".into(),
                chunks: vec![ScriptChunk {
                    order: 0,
                    text: "Hello.".into(),
                }],
            },
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_key_is_deterministic_and_input_sensitive() {
        let a = script_cache_key("uid-1", &command("B1", &[("a", "1"), ("b", "2")]));
        let b = script_cache_key("uid-1", &command("B1", &[("b", "2"), ("a", "1")]));
        assert_eq!(a, b);
        assert!(a.starts_with("scripts:uid-1:intro:"));
        assert_eq!(a.rsplit(':').next().unwrap().len(), 64);

        assert_ne!(a, script_cache_key("uid-2", &command("B1", &[("a", "1"), ("b", "2")])));
        assert_ne!(a, script_cache_key("uid-1", &command("B2", &[("a", "1"), ("b", "2")])));
        assert_ne!(a, script_cache_key("uid-1", &command("B1", &[("a", "1"), ("b", "3")])));
    }

    #[test]
    fn test_key_separators_in_ids_do_not_collide() {
        let mut lesson_c = command("B1", &[]);
        lesson_c.lesson_id = "c".into();
        let mut lesson_bc = command("B1", &[]);
        lesson_bc.lesson_id = "b:c".into();

        let first = script_cache_key("a:b", &lesson_c);
        let second = script_cache_key("a", &lesson_bc);
        assert_ne!(first, second);
        assert!(first.starts_with("scripts:a%3Ab:c:"));
        assert!(second.starts_with("scripts:a:b%3Ac:"));

        let mut literal = command("B1", &[]);
        literal.lesson_id = "%3A".into();
        let mut colon = command("B1", &[]);
        colon.lesson_id = ":".into();
        assert_ne!(script_cache_key("u", &literal), script_cache_key("u", &colon));
    }

    #[tokio::test]
    async fn test_in_memory_cache_round_trip() {
        let cache = InMemoryScriptCache::new();
        assert!(cache.get("k").await.unwrap().is_none());

        cache.put("k", &cached(), Duration::from_secs(60)).await.unwrap();
        let hit = cache.get("k").await.unwrap().unwrap();
        assert_eq!(hit.response.full_text, "Hello.");
    }

    #[tokio::test]
    async fn test_in_memory_cache_expires_entries() {
        let cache = InMemoryScriptCache::new();
        cache.put("k", &cached(), Duration::ZERO).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_in_memory_cache_purges_other_expired_keys_on_write() {
        let cache = InMemoryScriptCache::new();
        for i in 0..100 {
            cache
                .put(&format!("stale-{i}"), &cached(), Duration::ZERO)
                .await
                .unwrap();
        }
        cache.put("fresh", &cached(), Duration::from_secs(60)).await.unwrap();

        assert!(cache.get("fresh").await.unwrap().is_some());
        assert_eq!(cache.len().await, 1);
    }
}
