// Script generation pipeline.
// validate → coverage → render → build request → provider → sanitize.
// All Anthropic calls go through llm_client via the ScriptContentProvider seam.

pub mod cache;
pub mod coverage;
pub mod generator;
pub mod handlers;
pub mod payload;
pub mod prompts;
pub mod provider;
pub mod request;
pub mod sanitizer;
pub mod template;
