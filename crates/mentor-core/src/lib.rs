//! Business logic and port trait definitions for Mentor.
//!
//! This crate defines the "ports" (storage and chat backend traits) that the
//! infrastructure layer implements, plus the two services built on them:
//! the persona registry and the chat session engine. It depends only on
//! `mentor-types` -- never on `mentor-infra` or any database/HTTP crate.

pub mod chat;
pub mod persona;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
