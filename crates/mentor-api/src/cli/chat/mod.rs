//! Interactive CLI chat with a persona.
//!
//! Welcome banner, greeting, async readline input, a spinner while the
//! engine is busy, and slash commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
