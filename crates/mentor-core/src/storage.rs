//! Key-value store trait.
//!
//! Durable client-local storage for the two values Mentor keeps between runs:
//! the custom persona list and per-persona chat session ids. Values are
//! strings and every write replaces the whole value.
//! Implementations live in mentor-infra.

use mentor_types::error::RepositoryError;
use mentor_types::persona::PersonaId;

/// Storage key holding the JSON array of custom personas.
pub const CUSTOM_PERSONAS_KEY: &str = "custom-personas";

/// Storage key prefix for chat session ids (`chatSessionId:<persona-id>`).
pub const SESSION_ID_KEY: &str = "chatSessionId";

/// Storage key for the session id of one persona.
pub fn session_key(persona_id: &PersonaId) -> String {
    format!("{SESSION_ID_KEY}:{persona_id}")
}

/// Trait for string-valued persistent storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Set a value for a key (upsert, whole-value replace).
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
