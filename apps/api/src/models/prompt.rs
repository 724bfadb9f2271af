use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How the generated script should be split into chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingStrategy {
    /// Free-form label, e.g. "sentence" or "breath-group".
    #[serde(rename = "type", default)]
    pub strategy_type: Option<String>,
    /// Character budget per chunk.
    #[serde(default)]
    pub max_length: Option<i64>,
}

impl ChunkingStrategy {
    /// The per-chunk character ceiling, only when it is a positive number.
    pub fn max_length_limit(&self) -> Option<i64> {
        self.max_length.filter(|n| *n > 0)
    }

    pub fn label(&self) -> Option<&str> {
        self.strategy_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A reusable prompt with `{{key}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub user_prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub chunking_strategy: Option<ChunkingStrategy>,
}

/// Flat row shape of the `prompt_templates` table.
#[derive(Debug, Clone, FromRow)]
pub struct PromptTemplateRow {
    pub id: String,
    pub user_prompt: String,
    pub system_prompt: Option<String>,
    pub chunking_type: Option<String>,
    pub chunking_max_length: Option<i32>,
}

impl From<PromptTemplateRow> for PromptTemplate {
    fn from(row: PromptTemplateRow) -> Self {
        let chunking_strategy = if row.chunking_type.is_some() || row.chunking_max_length.is_some()
        {
            Some(ChunkingStrategy {
                strategy_type: row.chunking_type,
                max_length: row.chunking_max_length.map(i64::from),
            })
        } else {
            None
        };

        PromptTemplate {
            id: row.id,
            user_prompt: row.user_prompt,
            system_prompt: row.system_prompt,
            chunking_strategy,
        }
    }
}
