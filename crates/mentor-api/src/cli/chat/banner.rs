//! Welcome banner display for chat sessions.

use console::style;

use mentor_types::persona::Persona;

use crate::cli::persona::icon_glyph;

/// Print the banner shown when a chat starts: persona identity, endpoint,
/// and the stored session id if the conversation is being resumed.
pub fn print_welcome_banner(persona: &Persona, endpoint_url: &str, session_id: Option<&str>) {
    println!();
    println!(
        "  {} {}",
        icon_glyph(&persona.icon),
        style(&persona.name).cyan().bold()
    );
    println!("  {}", style(&persona.description).dim());
    println!();
    println!("  {}  {}", style("Endpoint:").bold(), style(endpoint_url).dim());
    println!(
        "  {}   {}",
        style("Session:").bold(),
        style(short_session(session_id)).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

fn short_session(session_id: Option<&str>) -> String {
    match session_id {
        Some(id) => id.chars().take(8).collect(),
        None => "new".to_string(),
    }
}
