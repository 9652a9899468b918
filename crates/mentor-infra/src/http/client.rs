//! HttpChatBackend -- concrete [`ChatBackend`] for the remote persona service.
//!
//! Each exchange is a single `POST {base}/api/{endpoint}` carrying
//! `{"message", "sessionId"}` and answered with `{"reply", "timestamp"?}`.
//! There is no retry; the engine turns any error into its apology message.

use std::time::Duration;

use mentor_core::chat::ChatBackend;
use mentor_types::chat::{ChatReply, ChatRequest};
use mentor_types::config::GlobalConfig;
use mentor_types::error::BackendError;
use tracing::debug;

/// reqwest-backed chat endpoint client.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Create a client for `base_url` (trailing slashes are trimmed) with a
    /// whole-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &GlobalConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a persona endpoint slug.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

impl ChatBackend for HttpChatBackend {
    async fn send(&self, endpoint: &str, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        let url = self.url(endpoint);
        debug!(%url, session_id = %request.session_id, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("failed to read response: {e}")))?;

        serde_json::from_str::<ChatReply>(&body)
            .map_err(|e| BackendError::Decode(format!("failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    async fn echo(Path(slug): Path<String>, Json(body): Json<Value>) -> Json<Value> {
        Json(json!({
            "reply": format!(
                "{slug}:{}:{}",
                body["message"].as_str().unwrap_or_default(),
                body["sessionId"].as_str().unwrap_or_default()
            ),
            "timestamp": "2024-01-02T03:04:05Z",
        }))
    }

    async fn broken() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
    }

    async fn garbage() -> &'static str {
        "not json at all"
    }

    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({ "reply": "too late" }))
    }

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route("/api/broken", post(broken))
            .route("/api/garbage", post(garbage))
            .route("/api/slow", post(slow))
            .route("/api/{slug}", post(echo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            session_id: "sess-1".to_string(),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpChatBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("hitesh-chat"), "http://localhost:8000/api/hitesh-chat");
    }

    #[test]
    fn test_from_config_uses_api_url() {
        let backend = HttpChatBackend::from_config(&GlobalConfig::default()).unwrap();
        assert_eq!(backend.url("piyush-chat"), "http://localhost:8000/api/piyush-chat");
    }

    #[tokio::test]
    async fn test_send_posts_message_and_session() {
        let addr = spawn_server().await;
        let backend = HttpChatBackend::new(&format!("http://{addr}/"), Duration::from_secs(5)).unwrap();

        let reply = backend.send("hitesh-chat", &request("hello")).await.unwrap();
        assert_eq!(reply.reply, "hitesh-chat:hello:sess-1");
        assert_eq!(reply.timestamp.as_deref(), Some("2024-01-02T03:04:05Z"));
    }

    #[tokio::test]
    async fn test_non_success_maps_to_status() {
        let addr = spawn_server().await;
        let backend = HttpChatBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let err = backend.send("broken", &request("hi")).await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode() {
        let addr = spawn_server().await;
        let backend = HttpChatBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let err = backend.send("garbage", &request("hi")).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_transport() {
        let addr = spawn_server().await;
        let backend =
            HttpChatBackend::new(&format!("http://{addr}"), Duration::from_millis(100)).unwrap();

        let err = backend.send("slow", &request("hi")).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpChatBackend::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = backend.send("hitesh-chat", &request("hi")).await.unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_engine_round_trip_over_http() {
        use crate::sqlite::kv::SqliteKvStore;
        use crate::sqlite::pool::{DatabasePool, database_url};
        use mentor_core::chat::{ChatEngine, FALLBACK_REPLY};
        use mentor_core::persona::catalog::builtin_personas;
        use mentor_types::chat::{EngineState, SendOutcome};

        let addr = spawn_server().await;
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteKvStore::new(DatabasePool::new(&database_url(dir.path())).await.unwrap());
        let backend = HttpChatBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();

        let mut personas = builtin_personas();
        let mut broken = personas[1].clone();
        broken.endpoint = Some("broken".to_string());

        let engine = ChatEngine::new(personas.remove(0), store.clone(), backend.clone()).unwrap();
        let outcome = engine.send_message("hello").await;
        let session_id = engine.session_id().await.unwrap();
        match outcome {
            SendOutcome::Replied(reply) => {
                assert_eq!(reply.content, format!("hitesh-chat:hello:{session_id}"));
                assert_eq!(reply.timestamp.to_rfc3339(), "2024-01-02T03:04:05+00:00");
            }
            other => panic!("expected reply, got {other:?}"),
        }

        let failing = ChatEngine::new(broken, store, backend).unwrap();
        let outcome = failing.send_message("hello").await;
        assert!(matches!(outcome, SendOutcome::Fallback(_)));
        let log = failing.messages();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].content, FALLBACK_REPLY);
        assert_eq!(failing.state(), EngineState::Idle);
    }
}
