//! Subject extraction.
//!
//! Token verification happens in the identity provider in front of this
//! service; it forwards the verified subject id in a configured header
//! (`AUTH_SUBJECT_HEADER`). All this layer enforces is "non-empty or reject".

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::state::AppState;

/// Opaque identifier of the authenticated learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

impl Subject {
    pub fn from_headers(headers: &HeaderMap, header_name: &str) -> Option<Self> {
        headers
            .get(header_name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Subject(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Subject {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Subject::from_headers(&parts.headers, &state.config.auth_subject_header)
            .ok_or(AppError::Unauthenticated)
    }
}
