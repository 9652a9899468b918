use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Icon tag given to new personas when none is chosen.
pub const DEFAULT_ICON: &str = "GraduationCap";

/// Unique identifier for a persona.
///
/// Built-in personas use stable slugs ("hitesh-sir"); custom personas get a
/// UUID v7 string at creation time. Ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(pub String);

impl PersonaId {
    /// Generate a fresh id for a custom persona.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A mentor persona the user can chat with.
///
/// Serialized with camelCase keys because the custom subset is persisted as a
/// JSON array under the `custom-personas` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    /// Display name. Unique by convention only; lookups that matter go by `id`.
    pub name: String,
    pub description: String,
    /// Symbolic glyph tag (e.g. "GraduationCap"). Opaque to the core.
    pub icon: String,
    /// Short labels, insertion order preserved.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Behavior instructions passed through to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// True only for user-created personas.
    #[serde(default)]
    pub is_custom: bool,
    /// Endpoint slug: requests go to `POST <base>/api/<endpoint>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Opening line the chat engine seeds a conversation with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

impl Persona {
    /// Whether this persona can be chatted with.
    pub fn has_endpoint(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Request to create a custom persona. `name` and `description` are required
/// to be non-blank; everything else is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePersonaRequest {
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub tags: Vec<String>,
    pub system_prompt: Option<String>,
    pub endpoint: Option<String>,
    pub greeting: Option<String>,
}

impl CreatePersonaRequest {
    /// Caller-side validation contract: both required fields present.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.description.trim().is_empty()
    }
}

/// Partial update for a persona. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePersonaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub tags: Option<Vec<String>>,
    pub system_prompt: Option<String>,
    pub endpoint: Option<String>,
    pub greeting: Option<String>,
}

impl UpdatePersonaRequest {
    /// Merge the set fields into `persona`.
    ///
    /// Returns `false` (and leaves `persona` untouched) if the patch would
    /// blank the name or the description.
    pub fn apply_to(&self, persona: &mut Persona) -> bool {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty())
            || self.description.as_deref().is_some_and(|d| d.trim().is_empty())
        {
            return false;
        }

        if let Some(name) = &self.name {
            persona.name = name.clone();
        }
        if let Some(description) = &self.description {
            persona.description = description.clone();
        }
        if let Some(icon) = &self.icon {
            persona.icon = icon.clone();
        }
        if let Some(tags) = &self.tags {
            persona.tags = tags.clone();
        }
        if let Some(prompt) = &self.system_prompt {
            persona.system_prompt = Some(prompt.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            persona.endpoint = Some(endpoint.clone());
        }
        if let Some(greeting) = &self.greeting {
            persona.greeting = Some(greeting.clone());
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.tags.is_none()
            && self.system_prompt.is_none()
            && self.endpoint.is_none()
            && self.greeting.is_none()
    }
}

/// Split a comma-separated tag string into trimmed, non-empty labels.
///
/// # Examples
///
/// ```
/// use mentor_types::persona::parse_tags;
///
/// assert_eq!(parse_tags("Educator, Web Development,,  "), vec!["Educator", "Web Development"]);
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
