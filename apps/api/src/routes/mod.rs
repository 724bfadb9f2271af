pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers::handle_list_lessons;
use crate::script::handlers::handle_generate_script;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog API
        .route("/api/v1/lessons", get(handle_list_lessons))
        // Script API
        .route("/api/v1/scripts/generate", post(handle_generate_script))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::InMemoryCatalog;
    use crate::config::Config;
    use crate::llm_client::MockScriptProvider;
    use crate::models::lesson::LessonTemplate;
    use crate::models::prompt::PromptTemplate;
    use crate::script::cache::InMemoryScriptCache;
    use crate::script::provider::ScriptBackend;

    const SUBJECT_HEADER: &str = "x-authenticated-subject";

    fn test_state() -> AppState {
        let catalog = InMemoryCatalog::new(
            vec![
                LessonTemplate {
                    id: "intro".into(),
                    title: "Introduce Yourself".into(),
                    subtitle: "First conversations".into(),
                    category: "basics".into(),
                    estimated_duration_seconds: 90,
                    is_locked: false,
                    required_personalization_fields: vec!["user_name".into()],
                    prompt_template_id: "intro-prompt".into(),
                },
                LessonTemplate {
                    id: "airport".into(),
                    title: "At the Airport".into(),
                    subtitle: String::new(),
                    category: "travel".into(),
                    estimated_duration_seconds: 120,
                    is_locked: true,
                    required_personalization_fields: vec![],
                    prompt_template_id: "intro-prompt".into(),
                },
            ],
            vec![PromptTemplate {
                id: "intro-prompt".into(),
                user_prompt: "Hi, I'm {{user_name}}. Nice to meet you!".into(),
                system_prompt: None,
                chunking_strategy: None,
            }],
        );

        AppState {
            catalog: Arc::new(catalog),
            script_backend: ScriptBackend::Ready(Arc::new(MockScriptProvider)),
            script_cache: Some(Arc::new(InMemoryScriptCache::new())),
            config: Config {
                database_url: None,
                catalog_seed_path: Some("catalog.json".into()),
                redis_url: None,
                script_cache_ttl_secs: 60,
                anthropic_api_key: None,
                mock_script: true,
                llm_timeout_secs: 5,
                auth_subject_header: SUBJECT_HEADER.into(),
                port: 0,
                rust_log: "info".into(),
            },
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn generate_request(subject: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/scripts/generate")
            .header("content-type", "application/json");
        if let Some(subject) = subject {
            builder = builder.header(SUBJECT_HEADER, subject);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_lessons_requires_subject() {
        let response = build_router(test_state())
            .oneshot(Request::get("/api/v1/lessons").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_list_lessons_ordered_with_ids() {
        let response = build_router(test_state())
            .oneshot(
                Request::get("/api/v1/lessons")
                    .header(SUBJECT_HEADER, "uid-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let lessons = body["lessons"].as_array().unwrap();
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0]["id"], "intro");
        assert_eq!(lessons[0]["requiredPersonalizationFields"], json!(["user_name"]));
        assert_eq!(lessons[1]["id"], "airport");
        assert_eq!(lessons[1]["isLocked"], true);
    }

    #[tokio::test]
    async fn test_generate_without_subject_is_unauthenticated_even_with_bad_body() {
        let response = build_router(test_state())
            .oneshot(generate_request(None, "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_generate_with_bad_body_is_invalid_argument() {
        let response = build_router(test_state())
            .oneshot(generate_request(Some("uid-1"), "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalid-argument");
    }

    #[tokio::test]
    async fn test_generate_unknown_lesson_is_not_found() {
        let body = json!({
            "lessonId": "does-not-exist",
            "languageCode": "en-US",
            "targetLevel": "B1",
            "personalization": {}
        });
        let response = build_router(test_state())
            .oneshot(generate_request(Some("uid-1"), &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "not-found");
    }

    #[tokio::test]
    async fn test_generate_with_mock_backend() {
        let body = json!({
            "lessonId": "intro",
            "languageCode": "en-US",
            "targetLevel": "B1",
            "personalization": {"user_name": " Alex "}
        });
        let response = build_router(test_state())
            .oneshot(generate_request(Some("uid-1"), &body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["lessonId"], "intro");
        assert_eq!(body["title"], "Introduce Yourself");
        assert_eq!(body["fullText"], "Hi, I'm Alex. Nice to meet you!");
        assert_eq!(
            body["chunks"],
            json!([
                {"order": 0, "text": "Hi, I'm Alex."},
                {"order": 1, "text": "Nice to meet you!"}
            ])
        );
    }
}
