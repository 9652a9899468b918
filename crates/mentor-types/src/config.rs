//! Global configuration types for Mentor.
//!
//! `GlobalConfig` represents the top-level `config.toml` that points the
//! client at the remote chat service.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Mentor client.
///
/// Loaded from `~/.mentor/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Base URL of the remote chat service (endpoints live under `/api/`).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout for the chat endpoint, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
