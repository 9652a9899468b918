//! Persona CLI commands: list, show, add, update, delete, icons.

use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use mentor_core::persona::catalog::greeting_for;
use mentor_types::persona::{CreatePersonaRequest, Persona, UpdatePersonaRequest, parse_tags};

use crate::state::AppState;

/// Icon tags a persona can carry, with the glyph and label shown for each.
pub const ICONS: &[(&str, &str, &str)] = &[
    ("GraduationCap", "🎓", "Teacher"),
    ("Code", "💻", "Developer"),
    ("Heart", "❤️", "Therapist"),
    ("Briefcase", "💼", "Business"),
    ("Gamepad2", "🎮", "Gamer"),
    ("Palette", "🎨", "Artist"),
    ("BookOpen", "📚", "Scientist"),
    ("Stethoscope", "🩺", "Doctor"),
    ("Music", "🎵", "Musician"),
    ("Camera", "📷", "Photographer"),
];

const UNKNOWN_ICON_GLYPH: &str = "🤖";

#[derive(Subcommand)]
pub enum PersonaCommand {
    /// List all personas, built-in first.
    #[command(alias = "ls")]
    List,

    /// Show the full profile of a persona.
    Show {
        /// Persona id or name.
        persona: String,
    },

    /// Create a custom persona (prompts for missing name/description).
    Add {
        #[command(flatten)]
        fields: PersonaFields,
    },

    /// Edit a custom persona. Only the given fields change.
    Update {
        /// Persona id or name.
        persona: String,

        #[command(flatten)]
        fields: PersonaFields,
    },

    /// Delete a custom persona.
    #[command(alias = "rm")]
    Delete {
        /// Persona id or name.
        persona: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// List the available icon tags.
    Icons,
}

/// Editable persona fields shared by `add` and `update`.
#[derive(clap::Args, Debug, Default)]
pub struct PersonaFields {
    /// Display name.
    #[arg(long)]
    pub name: Option<String>,

    /// Short description.
    #[arg(long)]
    pub description: Option<String>,

    /// Icon tag (see `mentor personas icons`).
    #[arg(long)]
    pub icon: Option<String>,

    /// Comma-separated tags, e.g. "rust,backend".
    #[arg(long)]
    pub tags: Option<String>,

    /// Behavior instructions passed to the chat service.
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Endpoint slug under `<api_url>/api/`.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Opening line of each conversation.
    #[arg(long)]
    pub greeting: Option<String>,
}

impl PersonaFields {
    fn into_update(self) -> UpdatePersonaRequest {
        UpdatePersonaRequest {
            name: self.name,
            description: self.description,
            icon: self.icon,
            tags: self.tags.as_deref().map(parse_tags),
            system_prompt: self.system_prompt,
            endpoint: self.endpoint,
            greeting: self.greeting,
        }
    }
}

pub async fn run(state: &mut AppState, command: PersonaCommand, json: bool) -> Result<()> {
    match command {
        PersonaCommand::List => list_personas(state, json),
        PersonaCommand::Show { persona } => show_persona(state, &persona, json),
        PersonaCommand::Add { fields } => add_persona(state, fields, json).await,
        PersonaCommand::Update { persona, fields } => {
            update_persona(state, &persona, fields, json).await
        }
        PersonaCommand::Delete { persona, force } => {
            delete_persona(state, &persona, force, json).await
        }
        PersonaCommand::Icons => list_icons(json),
    }
}

/// List all personas in a table.
pub fn list_personas(state: &AppState, json: bool) -> Result<()> {
    let personas = state.registry.list();

    if json {
        println!("{}", serde_json::to_string_pretty(personas)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Id").fg(Color::White),
        Cell::new("Tags").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Endpoint").fg(Color::White),
    ]);

    for persona in personas {
        let kind = if persona.is_custom {
            Cell::new("custom").fg(Color::Yellow)
        } else {
            Cell::new("built-in").fg(Color::Green)
        };
        let endpoint = match persona.endpoint.as_deref() {
            Some(e) if persona.has_endpoint() => Cell::new(e).fg(Color::White),
            _ => Cell::new("(none)").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(format!("{} {}", icon_glyph(&persona.icon), persona.name)).fg(Color::Cyan),
            Cell::new(persona.id.as_str()).fg(Color::DarkGrey),
            Cell::new(persona.tags.join(", ")),
            kind,
            endpoint,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    let customs = state.registry.customs().count();
    println!(
        "  {} persona{} ({} built-in, {} custom)",
        style(personas.len()).bold(),
        if personas.len() == 1 { "" } else { "s" },
        personas.len() - customs,
        customs
    );
    println!();

    Ok(())
}

/// Show the full profile of one persona.
pub fn show_persona(state: &AppState, id_or_name: &str, json: bool) -> Result<()> {
    let persona = state.persona(id_or_name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&persona)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        icon_glyph(&persona.icon),
        style(&persona.name).cyan().bold()
    );
    println!("  {}", style(&persona.description).dim());
    println!();

    println!("  {}", style("── Details ──").dim());
    println!("  {}        {}", style("Id:").bold(), style(&persona.id).dim());
    println!(
        "  {}      {}",
        style("Kind:").bold(),
        if persona.is_custom { "custom" } else { "built-in" }
    );
    println!(
        "  {}      {} ({})",
        style("Icon:").bold(),
        persona.icon,
        icon_label(&persona.icon)
    );
    if !persona.tags.is_empty() {
        println!("  {}      {}", style("Tags:").bold(), persona.tags.join(", "));
    }
    println!(
        "  {}  {}",
        style("Endpoint:").bold(),
        persona.endpoint.as_deref().unwrap_or("(none)")
    );
    println!("  {}  {}", style("Greeting:").bold(), greeting_for(&persona));
    println!();

    if let Some(prompt) = persona.system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        println!("  {}", style("── System Prompt ──").dim());
        for line in prompt.lines() {
            println!("  {line}");
        }
        println!();
    }

    Ok(())
}

/// Create a custom persona via prompts or one-shot flags.
///
/// ```bash
/// mentor personas add --name "Coach" --description "Fitness mentor" --icon Heart --tags health,gym
/// ```
pub async fn add_persona(state: &mut AppState, fields: PersonaFields, json: bool) -> Result<()> {
    let name = match fields.name {
        Some(n) => n,
        None if json => String::new(),
        None => Input::<String>::new()
            .with_prompt("Persona name")
            .allow_empty(true)
            .interact_text()?,
    };

    let description = match fields.description {
        Some(d) => d,
        None if json => String::new(),
        None => Input::<String>::new()
            .with_prompt("Short description")
            .allow_empty(true)
            .interact_text()?,
    };

    let request = CreatePersonaRequest {
        name,
        description,
        icon: fields.icon,
        tags: fields.tags.as_deref().map(parse_tags).unwrap_or_default(),
        system_prompt: fields.system_prompt,
        endpoint: fields.endpoint,
        greeting: fields.greeting,
    };

    let spinner = super::spinner("Saving persona...");
    let created = state.registry.add(request).await;
    spinner.finish_and_clear();

    let Some(persona) = created? else {
        if json {
            println!("{}", serde_json::json!({ "created": false }));
        } else {
            println!(
                "  {} Name and description are required. Nothing was created.",
                style("!").yellow().bold()
            );
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&persona)?);
        return Ok(());
    }

    println!();
    println!("  {} Persona created!", style("✓").green().bold());
    println!();
    println!(
        "  {}  {} {}",
        style("Name:").bold(),
        icon_glyph(&persona.icon),
        style(&persona.name).cyan()
    );
    println!("  {}    {}", style("Id:").bold(), style(&persona.id).dim());
    if !persona.has_endpoint() {
        println!();
        println!(
            "  {} No endpoint set; chat needs one: {}",
            style("i").blue().bold(),
            style(format!("mentor personas update {} --endpoint <slug>", persona.id)).yellow()
        );
    }
    println!();

    Ok(())
}

/// Apply the given fields to a custom persona.
pub async fn update_persona(
    state: &mut AppState,
    id_or_name: &str,
    fields: PersonaFields,
    json: bool,
) -> Result<()> {
    let persona = state.persona(id_or_name)?;
    if !persona.is_custom {
        bail!("'{}' is a built-in persona and cannot be edited", persona.name);
    }

    let patch = fields.into_update();
    if patch.is_empty() {
        bail!("Nothing to update. Pass at least one field, e.g. --description");
    }

    let updated = state.registry.update(&persona.id, patch).await?;
    let Some(updated) = updated else {
        bail!("Name and description cannot be blank. '{}' was not changed", persona.name);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!(
            "  {} Persona '{}' updated.",
            style("✓").green().bold(),
            style(&updated.name).cyan()
        );
    }

    Ok(())
}

/// Delete a custom persona with confirmation.
pub async fn delete_persona(
    state: &mut AppState,
    id_or_name: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let persona = state.persona(id_or_name)?;
    if !persona.is_custom {
        bail!("'{}' is a built-in persona and cannot be deleted", persona.name);
    }

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete persona '{}'?",
                style(&persona.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.registry.delete(&persona.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": removed, "id": persona.id })
        );
    } else if removed {
        println!(
            "  {} Persona '{}' deleted.",
            style("✓").red().bold(),
            persona.name
        );
    } else {
        println!("  {} Nothing was deleted.", style("!").yellow().bold());
    }

    Ok(())
}

/// Print the icon tag table.
pub fn list_icons(json: bool) -> Result<()> {
    if json {
        let icons: Vec<_> = ICONS
            .iter()
            .map(|(tag, glyph, label)| serde_json::json!({ "tag": tag, "glyph": glyph, "label": label }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&icons)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Tag").fg(Color::White),
        Cell::new("Glyph").fg(Color::White),
        Cell::new("Label").fg(Color::White),
    ]);
    for (tag, glyph, label) in ICONS {
        table.add_row(vec![
            Cell::new(tag).fg(Color::Cyan),
            Cell::new(glyph),
            Cell::new(label),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Glyph for an icon tag; unknown tags get a generic robot.
pub fn icon_glyph(tag: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(t, _, _)| *t == tag)
        .map_or(UNKNOWN_ICON_GLYPH, |&(_, glyph, _)| glyph)
}

fn icon_label(tag: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(t, _, _)| *t == tag)
        .map_or("custom", |&(_, _, label)| label)
}

/// Short display form of a persona for banners and prompts.
pub fn display_name(persona: &Persona) -> String {
    format!("{} {}", icon_glyph(&persona.icon), persona.name)
}
