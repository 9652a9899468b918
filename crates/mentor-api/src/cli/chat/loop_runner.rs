//! Main chat loop orchestration.
//!
//! Resolves the persona, builds its engine, shows the banner and greeting,
//! then reads lines until Ctrl+D or `/exit`. Each non-command line is one
//! `send_message` exchange with a spinner while the engine is busy.

use console::style;
use tracing::{debug, info};

use mentor_types::chat::{ChatMessage, RejectReason, SendOutcome, Sender};

use crate::cli::persona::display_name;
use crate::state::{AppState, ConcreteChatEngine};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// Run the interactive chat loop for a persona.
pub async fn run_chat_loop(state: &AppState, id_or_name: &str) -> anyhow::Result<()> {
    let persona = state.persona(id_or_name)?;
    let engine = state.chat_engine(persona)?;
    let label = display_name(engine.persona());

    let endpoint_url = engine
        .persona()
        .endpoint
        .as_deref()
        .map(|e| state.backend.url(e))
        .unwrap_or_default();
    let session_id = engine.session_id().await;
    print_welcome_banner(engine.persona(), &endpoint_url, session_id.as_deref());
    info!(persona = %engine.persona().id, resumed = session_id.is_some(), "Chat started");

    for message in engine.messages() {
        print_message(&label, &message);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Chat ended.").dim());
                            break;
                        }
                        ChatCommand::History => print_history(&engine, &label),
                        ChatCommand::Reset => {
                            engine.reset_session().await;
                            engine.initialize();
                            println!("\n  {} Started a new session.\n", style("✓").green().bold());
                            for message in engine.messages() {
                                print_message(&label, &message);
                            }
                        }
                        ChatCommand::Unknown(name) => println!(
                            "\n  {} Unknown command: {}. Type /help for available commands.\n",
                            style("?").yellow().bold(),
                            style(name).dim()
                        ),
                    }
                    continue;
                }

                let spinner = crate::cli::spinner("thinking...");
                let outcome = engine.send_message(&text).await;
                spinner.finish_and_clear();

                match outcome {
                    SendOutcome::Replied(reply) => print_message(&label, &reply),
                    SendOutcome::Fallback(reply) => {
                        println!("\n  {} {}\n", style("!").yellow().bold(), style(&reply.content).yellow());
                    }
                    SendOutcome::Rejected(RejectReason::Busy) => {
                        println!("  {}", style("Still waiting for the last reply...").dim());
                    }
                    SendOutcome::Rejected(RejectReason::Empty) => {
                        debug!("Blank message ignored");
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_message(label: &str, message: &ChatMessage) {
    println!();
    println!("  {}", style(label).cyan().bold());
    for line in message.content.lines() {
        println!("  {line}");
    }
    println!();
}

fn print_history(engine: &ConcreteChatEngine, label: &str) {
    println!();
    for message in engine.messages() {
        let who = match message.sender {
            Sender::User => format!("{}", style("You").green().bold()),
            Sender::Ai => format!("{}", style(label).cyan().bold()),
        };
        println!(
            "  {} {} {}",
            style(message.timestamp.format("%H:%M")).dim(),
            who,
            preview(&message.content)
        );
    }
    println!();
}

fn preview(content: &str) -> String {
    let single_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > 100 {
        let cut: String = single_line.chars().take(97).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello there"), "hello there");
    }

    #[test]
    fn test_preview_collapses_newlines() {
        assert_eq!(preview("line one\nline two"), "line one line two");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        let out = preview(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 100);
    }
}
