//! Prompt template rendering.
//!
//! Placeholders look like `{{ key }}` where `key` is word characters and dots.
//! Rendering is a single pass: substituted values are never re-scanned, and
//! unknown placeholders are left verbatim.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::lesson::LessonTemplate;
use crate::script::payload::{GenerateScriptCommand, Personalization};

/// Regex pattern matching `{{ placeholder }}` tokens in prompt templates.
pub const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([\w.]+)\s*\}\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

/// Prefix under which every personalization field is always reachable,
/// even when its bare name collides with a fixed key.
pub const PERSONALIZATION_NAMESPACE: &str = "personalization.";

/// Anything that can resolve a placeholder key to a value.
pub trait PlaceholderSource {
    fn resolve(&self, key: &str) -> Option<&str>;
}

impl PlaceholderSource for HashMap<String, String> {
    fn resolve(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl PlaceholderSource for BTreeMap<String, String> {
    fn resolve(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

pub fn render_template<P: PlaceholderSource + ?Sized>(template: &str, values: &P) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match values.resolve(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Replacement values for a lesson prompt, layered with explicit precedence:
///
/// 1. fixed keys (`lesson_title`, `lesson_subtitle`, `language_code`,
///    `target_level`, `learner_uid`, `personalization_summary`)
/// 2. personalization fields under their own names, unless a fixed key
///    already claims the name
/// 3. `personalization.<key>` for every personalization field
#[derive(Debug, Clone)]
pub struct ReplacementValues<'a> {
    fixed: BTreeMap<&'static str, String>,
    personalization: &'a Personalization,
}

impl<'a> ReplacementValues<'a> {
    pub fn new(
        lesson: &LessonTemplate,
        command: &'a GenerateScriptCommand,
        learner_uid: &str,
    ) -> Self {
        let fixed = BTreeMap::from([
            ("lesson_title", lesson.title.clone()),
            ("lesson_subtitle", lesson.subtitle.clone()),
            ("language_code", command.language_code.clone()),
            ("target_level", command.target_level.clone()),
            ("learner_uid", learner_uid.to_string()),
            (
                "personalization_summary",
                personalization_summary(&command.personalization),
            ),
        ]);

        Self {
            fixed,
            personalization: &command.personalization,
        }
    }

    pub fn summary(&self) -> &str {
        self.fixed
            .get("personalization_summary")
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl PlaceholderSource for ReplacementValues<'_> {
    fn resolve(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.fixed.get(key) {
            return Some(value);
        }
        if let Some(value) = self.personalization.get(key) {
            return Some(value);
        }
        key.strip_prefix(PERSONALIZATION_NAMESPACE)
            .and_then(|field| self.personalization.get(field))
            .map(String::as_str)
    }
}

/// `user_name` → `User Name`. Word characters are ASCII letters, digits and
/// underscores; any other character starts a new word.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_is_word = false;
    for c in spaced.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out.trim().to_string()
}

/// `"Humanized Key: value"` pairs in key order, joined by `"; "`.
pub fn personalization_summary(personalization: &Personalization) -> String {
    personalization
        .iter()
        .map(|(key, value)| format!("{}: {}", humanize_key(key), value))
        .collect::<Vec<_>>()
        .join("; ")
}
