//! Mentor CLI entry point.
//!
//! Binary name: `mentor`
//!
//! Parses CLI arguments, initializes storage and the chat backend, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,mentor_core=debug,mentor_infra=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mentor", &mut std::io::stdout());
        return Ok(());
    }

    let mut state = AppState::init(cli.api_url).await?;

    match cli.command {
        Commands::Personas { action } => {
            cli::persona::run(&mut state, action, cli.json).await?;
        }

        Commands::Chat { persona } => {
            cli::chat::loop_runner::run_chat_loop(&state, &persona).await?;
        }

        Commands::Ask { persona, message } => {
            cli::ask::ask(&state, &persona, &message.join(" "), cli.json).await?;
        }

        Commands::Session { action } => {
            cli::session::run(&state, action, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
