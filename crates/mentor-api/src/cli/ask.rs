//! One-shot exchange: `mentor ask <persona> <message...>`.

use anyhow::Result;
use console::style;

use mentor_types::chat::{RejectReason, SendOutcome};

use super::persona::display_name;
use crate::state::AppState;

/// Send one message and print the reply.
///
/// With `--json` the whole message log (greeting, user message, reply) is
/// printed instead.
pub async fn ask(state: &AppState, id_or_name: &str, message: &str, json: bool) -> Result<()> {
    let persona = state.persona(id_or_name)?;
    let engine = state.chat_engine(persona)?;

    let spinner = (!json).then(|| super::spinner("thinking..."));
    let outcome = engine.send_message(message).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.messages())?);
        return Ok(());
    }

    match outcome {
        SendOutcome::Replied(reply) => {
            println!();
            println!("  {}", style(display_name(engine.persona())).cyan().bold());
            for line in reply.content.lines() {
                println!("  {line}");
            }
            println!();
        }
        SendOutcome::Fallback(reply) => {
            eprintln!("  {} {}", style("!").yellow().bold(), reply.content);
        }
        SendOutcome::Rejected(RejectReason::Empty) => {
            anyhow::bail!("Message is empty");
        }
        SendOutcome::Rejected(RejectReason::Busy) => {
            anyhow::bail!("A request is already in flight");
        }
    }

    Ok(())
}
