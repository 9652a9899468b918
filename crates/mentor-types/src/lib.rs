//! Shared domain types for Mentor.
//!
//! This crate contains the core domain types used across the Mentor workspace:
//! Persona, ChatMessage, the chat wire payloads, global configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod persona;
