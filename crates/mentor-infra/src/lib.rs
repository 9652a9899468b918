//! Infrastructure layer for Mentor.
//!
//! Contains implementations of the ports defined in `mentor-core`: the
//! SQLite-backed key-value store, the reqwest-backed chat endpoint client,
//! and the global configuration loader.

pub mod config;
pub mod http;
pub mod sqlite;
