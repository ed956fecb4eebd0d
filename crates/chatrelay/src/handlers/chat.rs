//! Chat HTTP handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::{Turn, deserialize_history};
use crate::response;
use crate::server::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /api/chat`.
///
/// Clients always send `conversation_id`, but it is parsed leniently: a
/// missing id is accepted and the value is only used for logging. Only a
/// blank `message` is rejected.
#[derive(Deserialize)]
pub struct ChatPayload {
    message: String,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    model: String,
    #[serde(default, deserialize_with = "deserialize_history")]
    history: Vec<Turn>,
}

#[derive(Serialize)]
pub struct ChatResponseBody {
    output: OutputMessage,
}

#[derive(Serialize)]
pub struct OutputMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    via: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    messages: Vec<Turn>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/chat
///
/// Always answers 200 once the payload is valid; provider failures are
/// reported in `output.content` and `via` is omitted.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatPayload>) -> Response {
    if req.message.trim().is_empty() {
        return response::bad_request("message must not be empty").into_response();
    }

    debug!(
        conversation_id = req.conversation_id.as_deref().unwrap_or_default(),
        model = %req.model,
        history_len = req.history.len(),
        "Received chat message"
    );

    let reply = state
        .dispatcher
        .dispatch(&req.message, &req.history, &req.model)
        .await;

    let via = (!reply.is_error()).then_some(reply.source_label);
    let body = ChatResponseBody {
        output: OutputMessage {
            role: "assistant",
            content: reply.content,
            via,
        },
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/clear/{conversation_id}
///
/// Conversations are not stored server-side, so there is nothing to clear.
pub async fn clear_conversation(Path(conversation_id): Path<String>) -> Json<ClearResponse> {
    debug!(%conversation_id, "Clear requested");
    Json(ClearResponse { status: "ok" })
}

/// GET /api/history/{conversation_id}
///
/// History lives with the client; the server always reports none.
pub async fn get_history(Path(conversation_id): Path<String>) -> Json<HistoryResponse> {
    debug!(%conversation_id, "History requested");
    Json(HistoryResponse {
        messages: Vec::new(),
    })
}

pub async fn not_found() -> Response {
    response::not_found("Route not found").into_response()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::dispatch::{DispatchSettings, Dispatcher};
    use crate::llm::{
        ChatRequest, ChatResponse, Choice, LLMError, LLMProvider, Message, Provider,
        ProviderRegistry, Role,
    };
    use crate::server::{AppState, build_app};

    /// Echoes the history length and the message back.
    struct EchoProvider;

    #[async_trait]
    impl LLMProvider for EchoProvider {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
            let content = format!("{} turns, you said: {}", request.history.len(), request.message);
            Ok(ChatResponse {
                id: None,
                choices: vec![Choice {
                    index: 0,
                    message: Some(Message::text(Role::Assistant, content)),
                    finish_reason: None,
                }],
                usage: None,
            })
        }
    }

    fn app(with_gemini: bool) -> Router {
        let mut registry = ProviderRegistry::new();
        if with_gemini {
            registry.register(Provider::Gemini, Arc::new(EchoProvider));
        }
        let dispatcher = Dispatcher::new(registry, DispatchSettings::from(&Config::default()));
        build_app(AppState { dispatcher }, 30)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn chat_returns_reply_with_via() {
        let body = json!({
            "message": "hello",
            "conversation_id": "c1",
            "model": "gemini-flash",
            "history": [
                {"role": "user", "content": "earlier"},
                {"role": "assistant", "content": "reply"}
            ]
        });
        let (status, body) = send(app(true), post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "output": {
                    "role": "assistant",
                    "content": "2 turns, you said: hello",
                    "via": "gemini/gemini-2.5-flash"
                }
            })
        );
    }

    #[tokio::test]
    async fn chat_tolerates_non_array_history() {
        let body = json!({"message": "hi", "conversation_id": "c1", "model": "gemini", "history": "nope"});
        let (status, body) = send(app(true), post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["content"], "0 turns, you said: hi");
    }

    #[tokio::test]
    async fn chat_accepts_missing_conversation_id() {
        let body = json!({"message": "hi", "model": "gemini-flash"});
        let (status, body) = send(app(true), post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["content"], "0 turns, you said: hi");
    }

    #[tokio::test]
    async fn chat_reports_missing_provider_in_band() {
        let body = json!({"message": "hi", "conversation_id": "c1", "model": "gemini-pro"});
        let (status, body) = send(app(false), post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["role"], "assistant");
        let content = body["output"]["content"].as_str().unwrap();
        assert!(content.contains("configuration_error"));
        assert!(body["output"].get("via").is_none());
    }

    #[tokio::test]
    async fn chat_rejects_blank_message() {
        let body = json!({"message": "   ", "conversation_id": "c1", "model": "gemini"});
        let (status, body) = send(app(true), post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn chat_rejects_missing_message() {
        let body = json!({"conversation_id": "c1", "model": "gemini"});
        let (status, _) = send(app(true), post_json("/api/chat", body)).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn clear_is_ok() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/clear/c1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(true), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn history_is_empty() {
        let request = Request::builder()
            .uri("/api/history/c1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(true), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"messages": []}));
    }

    #[tokio::test]
    async fn readyz_reports_providers() {
        let request = Request::builder().uri("/readyz").body(Body::empty()).unwrap();
        let (status, body) = send(app(true), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": "ok", "providers": {"gemini": true, "groq": false}})
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let (status, body) = send(app(true), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }
}
