//! Axum router configuration with middleware.
//!
//! The page is served at `/`, the API under `/api/v1/`.
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/session", get(handlers::session::get_session))
        .route("/chat/stream", post(handlers::chat::stream_chat))
        .route("/history", delete(handlers::history::delete_history));

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use shelfchat_core::chat::history::HistoryStore;
    use shelfchat_core::llm::provider::{EventStream, LlmProvider};
    use shelfchat_infra::sqlite::kv::SqliteKvStore;
    use shelfchat_infra::sqlite::pool::{DatabasePool, database_url};
    use shelfchat_types::chat::Message;
    use shelfchat_types::config::ChatConfig;
    use shelfchat_types::llm::{CompletionRequest, LlmError, StreamEvent};

    /// Replies with fixed fragments, or fails after them.
    struct FixedProvider {
        fragments: Vec<&'static str>,
        fail_with: Option<&'static str>,
    }

    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn stream(&self, _request: CompletionRequest) -> EventStream {
            let mut events: Vec<Result<StreamEvent, LlmError>> = self
                .fragments
                .iter()
                .map(|t| Ok(StreamEvent::TextDelta { text: t.to_string() }))
                .collect();
            match self.fail_with {
                Some(msg) => events.push(Err(LlmError::Transport(msg.to_string()))),
                None => events.push(Ok(StreamEvent::Done)),
            }
            Box::pin(futures_util::stream::iter(events))
        }
    }

    async fn test_state(provider: Option<FixedProvider>) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::new(&database_url(dir.path())).await.unwrap();
        let state = AppState::assemble(ChatConfig::default(), dir.path().to_path_buf(), pool, provider)
            .await
            .unwrap();
        (state, dir)
    }

    fn replying(fragments: Vec<&'static str>) -> Option<FixedProvider> {
        Some(FixedProvider {
            fragments,
            fail_with: None,
        })
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn chat_request(message: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/v1/chat/stream")
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "message": message }).to_string(),
            ))
            .unwrap()
    }

    fn persisted(state: &AppState) -> HistoryStore<SqliteKvStore> {
        HistoryStore::new(SqliteKvStore::new(state.db_pool.clone()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _dir) = test_state(replying(vec![])).await;
        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_index_page() {
        let (state, _dir) = test_state(replying(vec![])).await;
        let response = build_router(state)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("ChatGPT-like Chatbot Demo"));
        assert!(html.contains("How can I help?"));
    }

    #[tokio::test]
    async fn test_session_starts_empty_and_idle() {
        let (state, _dir) = test_state(replying(vec![])).await;
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"]["status"], "idle");
        assert_eq!(json["data"]["model"], "gpt-3.5-turbo");
        assert!(json["data"]["halted_reason"].is_null());
        assert_eq!(json["data"]["messages"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_chat_stream_runs_turn() {
        let (state, _dir) = test_state(replying(vec!["Hel", "lo"])).await;
        let response = build_router(state.clone())
            .oneshot(chat_request("Hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("event: user"));
        assert!(body.contains("event: delta"));
        assert!(body.contains(r#""content":"Hello""#));
        assert!(body.contains("event: done"));

        let expected = vec![Message::user("Hi"), Message::assistant("Hello")];
        assert_eq!(state.session.lock().await.messages(), expected.as_slice());
        assert_eq!(persisted(&state).load().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_chat_stream_failure_becomes_error_reply() {
        let provider = Some(FixedProvider {
            fragments: vec!["par"],
            fail_with: Some("connection refused"),
        });
        let (state, _dir) = test_state(provider).await;
        let response = build_router(state.clone())
            .oneshot(chat_request("Hi"))
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("event: error"));
        assert!(body.contains("event: done"));

        let messages = persisted(&state).load().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].content,
            "[Error: transport error: connection refused]"
        );
    }

    #[tokio::test]
    async fn test_chat_stream_rejects_empty_message() {
        let (state, _dir) = test_state(replying(vec!["x"])).await;
        let response = build_router(state.clone())
            .oneshot(chat_request(""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.session.lock().await.messages().is_empty());
    }

    #[tokio::test]
    async fn test_chat_stream_accepts_whitespace_message() {
        let (state, _dir) = test_state(replying(vec!["ok"])).await;
        let response = build_router(state.clone())
            .oneshot(chat_request("   "))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("event: done"));
        let expected = vec![Message::user("   "), Message::assistant("ok")];
        assert_eq!(persisted(&state).load().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_reply_markdown_rendered_as_html() {
        let (state, _dir) = test_state(replying(vec!["**", "x**"])).await;
        let router = build_router(state);

        let body = body_text(router.clone().oneshot(chat_request("Bold?")).await.unwrap()).await;
        let done = body
            .split("\n\n")
            .find(|block| block.contains("event: done"))
            .unwrap();
        assert!(done.contains("<strong>x</strong>"));
        assert!(done.contains(r#""content":"**x**""#));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let reply = &json["data"]["messages"][1];
        assert_eq!(reply["role"], "assistant");
        assert_eq!(reply["content"], "**x**");
        assert!(reply["html"].as_str().unwrap().contains("<strong>x</strong>"));
    }

    #[tokio::test]
    async fn test_storage_failure_has_its_own_event() {
        let (state, _dir) = test_state(replying(vec!["ok"])).await;
        state.db_pool.writer.close().await;

        let response = build_router(state.clone())
            .oneshot(chat_request("Hi"))
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("event: storage_error"));
        assert!(body.contains("history storage error"));
        assert!(!body.contains("event: error"));
        assert!(!body.contains("event: done"));
    }

    #[tokio::test]
    async fn test_session_reports_turn_in_progress() {
        let (state, _dir) = test_state(replying(vec!["ok"])).await;
        let router = build_router(state.clone());
        let _ = body_text(router.clone().oneshot(chat_request("Hi")).await.unwrap()).await;

        let _turn = state.session.lock().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"]["status"], "awaiting_completion");
        assert_eq!(json["data"]["model"], "gpt-3.5-turbo");
        let messages = json["data"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["content"], "ok");
    }

    #[tokio::test]
    async fn test_delete_history_clears() {
        let (state, _dir) = test_state(replying(vec!["ok"])).await;
        let router = build_router(state.clone());
        let _ = body_text(router.clone().oneshot(chat_request("Hi")).await.unwrap()).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/history")
                    .method(Method::DELETE)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.session.lock().await.messages().is_empty());
        assert!(persisted(&state).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_halted_session() {
        let (state, _dir) = test_state(None).await;
        let router = build_router(state);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"]["status"], "halted");
        assert_eq!(
            json["data"]["halted_reason"],
            "OpenAI API key not found. Set OPENAI_API_KEY in your environment."
        );

        let response = router.clone().oneshot(chat_request("Hi")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["errors"][0]["code"], "SESSION_HALTED");

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/history")
                    .method(Method::DELETE)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
