//! CLI command definitions and dispatch for the `mentor` binary.
//!
//! Uses clap derive macros for argument parsing. Persona management lives
//! under `mentor personas`, conversations under `mentor chat` / `mentor ask`.

pub mod ask;
pub mod chat;
pub mod persona;
pub mod session;

use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Chat with AI mentor personas.
#[derive(Parser)]
#[command(name = "mentor", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the chat service (overrides config.toml).
    #[arg(long, global = true, env = "MENTOR_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage personas (list, show, add, update, delete, icons).
    #[command(alias = "persona")]
    Personas {
        #[command(subcommand)]
        action: persona::PersonaCommand,
    },

    /// Start an interactive chat with a persona.
    Chat {
        /// Persona id or name.
        persona: String,
    },

    /// Send a single message to a persona and print the reply.
    Ask {
        /// Persona id or name.
        persona: String,

        /// Message text.
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Inspect or discard the stored chat session of a persona.
    Session {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Cyan steady-tick spinner used while waiting on storage or the network.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
