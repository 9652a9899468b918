//! Application state wiring storage, registry, and chat backend together.
//!
//! Core types are generic over the storage and backend traits; AppState pins
//! them to the concrete infra implementations.

use anyhow::Context;
use mentor_core::chat::ChatEngine;
use mentor_core::persona::PersonaRegistry;
use mentor_infra::config::{load_global_config, resolve_data_dir};
use mentor_infra::http::HttpChatBackend;
use mentor_infra::sqlite::kv::SqliteKvStore;
use mentor_infra::sqlite::pool::{DatabasePool, database_url};
use mentor_types::error::PersonaError;
use mentor_types::persona::Persona;
use tracing::debug;

/// Concrete type aliases for the core generics pinned to infra implementations.
pub type ConcreteRegistry = PersonaRegistry<SqliteKvStore>;

pub type ConcreteChatEngine = ChatEngine<SqliteKvStore, HttpChatBackend>;

/// Application state shared by all CLI commands.
pub struct AppState {
    pub registry: ConcreteRegistry,
    pub store: SqliteKvStore,
    pub backend: HttpChatBackend,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, load personas.
    ///
    /// `api_url` (from `--api-url` or `MENTOR_API_URL`) wins over config.toml.
    pub async fn init(api_url: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let mut config = load_global_config(&data_dir).await;
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            config.api_url = url;
        }

        let db_pool = DatabasePool::new(&database_url(&data_dir))
            .await
            .context("Failed to open the Mentor database")?;
        let store = SqliteKvStore::new(db_pool);

        let registry = PersonaRegistry::load(store.clone()).await;
        let backend = HttpChatBackend::from_config(&config)?;
        debug!(
            data_dir = %data_dir.display(),
            api_url = %backend.base_url(),
            timeout_secs = config.request_timeout_secs,
            "Application state ready"
        );

        Ok(Self {
            registry,
            store,
            backend,
        })
    }

    /// Look a persona up by id, falling back to display name.
    pub fn persona(&self, id_or_name: &str) -> Result<Persona, PersonaError> {
        self.registry
            .resolve(id_or_name)
            .cloned()
            .ok_or_else(|| PersonaError::NotFound(id_or_name.to_string()))
    }

    /// Build a chat engine bound to `persona`.
    pub fn chat_engine(&self, persona: Persona) -> anyhow::Result<ConcreteChatEngine> {
        Ok(ChatEngine::new(persona, self.store.clone(), self.backend.clone())?)
    }
}
