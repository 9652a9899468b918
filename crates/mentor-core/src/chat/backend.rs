//! ChatBackend trait definition.
//!
//! The remote inference service is opaque: one request in, one reply out.
//! Implementations live in mentor-infra (e.g., `HttpChatBackend`).

use mentor_types::chat::{ChatReply, ChatRequest};
use mentor_types::error::BackendError;

/// Trait for a persona-scoped remote chat endpoint.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatBackend: Send + Sync {
    /// Send one message to the endpoint named by `endpoint` (a slug such as
    /// "hitesh-chat") and return its reply. Exactly one attempt; no retry.
    fn send(
        &self,
        endpoint: &str,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatReply, BackendError>> + Send;
}
