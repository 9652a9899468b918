//! Chat session engine and the remote chat endpoint port.
//!
//! `ChatEngine` owns one conversation's message log and drives one
//! request/response cycle per submitted message against a `ChatBackend`.

pub mod backend;
pub mod engine;

pub use backend::ChatBackend;
pub use engine::{ChatEngine, FALLBACK_REPLY};
