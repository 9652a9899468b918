//! Session CLI commands: show and reset the stored chat session id.
//!
//! These work on storage directly, so they also answer for personas that
//! have no endpoint (and therefore never have a session).

use anyhow::Result;
use clap::Subcommand;
use console::style;

use mentor_core::storage::{KvStore, session_key};
use mentor_types::error::RepositoryError;
use mentor_types::persona::Persona;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the stored session id for a persona.
    Show {
        /// Persona id or name.
        persona: String,
    },

    /// Discard the stored session id so the next message starts fresh.
    Reset {
        /// Persona id or name.
        persona: String,
    },
}

pub async fn run(state: &AppState, command: SessionCommand, json: bool) -> Result<()> {
    match command {
        SessionCommand::Show { persona } => show_session(state, &persona, json).await,
        SessionCommand::Reset { persona } => reset_session(state, &persona, json).await,
    }
}

pub async fn show_session(state: &AppState, id_or_name: &str, json: bool) -> Result<()> {
    let persona = state.persona(id_or_name)?;
    let session_id = stored_session_id(&state.store, &persona).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "persona": persona.id, "sessionId": session_id })
        );
        return Ok(());
    }

    match session_id {
        Some(id) => println!(
            "  {}  {}  {}",
            style(&persona.name).cyan().bold(),
            style("Session:").bold(),
            id
        ),
        None => println!(
            "  {} No session yet for '{}'. One starts with the first message.",
            style("i").blue().bold(),
            style(&persona.name).cyan()
        ),
    }
    Ok(())
}

pub async fn reset_session(state: &AppState, id_or_name: &str, json: bool) -> Result<()> {
    let persona = state.persona(id_or_name)?;
    discard_session(&state.store, &persona).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "persona": persona.id, "reset": true })
        );
    } else {
        println!(
            "  {} Session for '{}' reset.",
            style("✓").green().bold(),
            persona.name
        );
    }
    Ok(())
}

async fn stored_session_id<S: KvStore>(
    store: &S,
    persona: &Persona,
) -> Result<Option<String>, RepositoryError> {
    store.get(&session_key(&persona.id)).await
}

async fn discard_session<S: KvStore>(store: &S, persona: &Persona) -> Result<(), RepositoryError> {
    store.remove(&session_key(&persona.id)).await
}
