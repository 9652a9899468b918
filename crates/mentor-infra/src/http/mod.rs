//! HTTP client for the remote persona chat service.

pub mod client;

pub use client::HttpChatBackend;
