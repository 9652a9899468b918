//! PersonaRegistry -- single source of truth for available personas.
//!
//! The visible list is always the built-ins followed by the custom personas
//! in creation order. Only the custom subset is ever serialized.

use std::collections::HashSet;

use mentor_types::error::{PersonaError, RepositoryError};
use mentor_types::persona::{
    CreatePersonaRequest, DEFAULT_ICON, Persona, PersonaId, UpdatePersonaRequest,
};
use tracing::{debug, info, warn};

use super::catalog::{builtin_personas, is_builtin_id};
use crate::storage::{CUSTOM_PERSONAS_KEY, KvStore};

/// Registry merging built-in personas with user-created ones.
///
/// Generic over `KvStore` so storage can be faked in tests.
pub struct PersonaRegistry<S: KvStore> {
    store: S,
    personas: Vec<Persona>,
}

impl<S: KvStore> PersonaRegistry<S> {
    /// Build the registry: built-ins plus whatever custom personas the store
    /// holds. A missing, unreadable, or malformed stored value falls back to
    /// built-ins only.
    pub async fn load(store: S) -> Self {
        let mut personas = builtin_personas();
        personas.extend(Self::load_customs(&store).await);
        Self { store, personas }
    }

    async fn load_customs(store: &S) -> Vec<Persona> {
        let raw = match store.get(CUSTOM_PERSONAS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No custom personas stored");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read custom personas, using built-ins only");
                return Vec::new();
            }
        };

        let stored: Vec<Persona> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Stored custom personas are malformed, ignoring them");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        stored
            .into_iter()
            .filter(|p| {
                if is_builtin_id(&p.id) {
                    warn!(id = %p.id, "Skipping stored persona that shadows a built-in id");
                    return false;
                }
                if !seen.insert(p.id.clone()) {
                    warn!(id = %p.id, "Skipping stored persona with a duplicate id");
                    return false;
                }
                true
            })
            .map(|mut p| {
                p.is_custom = true;
                p
            })
            .collect()
    }

    /// All personas: built-ins first, then customs in creation order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    /// Only the user-created personas.
    pub fn customs(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter().filter(|p| p.is_custom)
    }

    pub fn get(&self, id: &PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| &p.id == id)
    }

    /// First persona whose name matches exactly, in list order.
    pub fn resolve_by_name(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.name == name)
    }

    /// Look up by id first, then by exact name.
    pub fn resolve(&self, id_or_name: &str) -> Option<&Persona> {
        self.get(&PersonaId::from(id_or_name))
            .or_else(|| self.resolve_by_name(id_or_name))
    }

    /// Create a custom persona.
    ///
    /// Returns `Ok(None)` without touching anything if the name or
    /// description is blank.
    pub async fn add(
        &mut self,
        request: CreatePersonaRequest,
    ) -> Result<Option<Persona>, PersonaError> {
        if !request.is_valid() {
            debug!("Ignoring persona with blank name or description");
            return Ok(None);
        }

        let persona = Persona {
            id: PersonaId::generate(),
            name: request.name,
            description: request.description,
            icon: request.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            tags: request.tags,
            system_prompt: request.system_prompt,
            is_custom: true,
            endpoint: request.endpoint,
            greeting: request.greeting,
        };

        let mut next = self.personas.clone();
        next.push(persona.clone());
        self.commit(next).await?;

        info!(id = %persona.id, name = %persona.name, "Persona created");
        Ok(Some(persona))
    }

    /// Merge `patch` into the custom persona `id`.
    ///
    /// Unknown ids, built-ins, and patches that would blank a required field
    /// are no-ops returning `Ok(None)`.
    pub async fn update(
        &mut self,
        id: &PersonaId,
        patch: UpdatePersonaRequest,
    ) -> Result<Option<Persona>, PersonaError> {
        let Some(index) = self.personas.iter().position(|p| &p.id == id) else {
            debug!(id = %id, "Update for unknown persona ignored");
            return Ok(None);
        };
        if !self.personas[index].is_custom {
            warn!(id = %id, "Built-in personas are immutable, update ignored");
            return Ok(None);
        }

        let mut next = self.personas.clone();
        if !patch.apply_to(&mut next[index]) {
            debug!(id = %id, "Update would blank a required field, ignored");
            return Ok(None);
        }
        let updated = next[index].clone();
        self.commit(next).await?;

        info!(id = %id, "Persona updated");
        Ok(Some(updated))
    }

    /// Remove the custom persona `id`. Returns whether anything was removed;
    /// built-ins and unknown ids are left alone.
    pub async fn delete(&mut self, id: &PersonaId) -> Result<bool, PersonaError> {
        match self.get(id) {
            None => return Ok(false),
            Some(p) if !p.is_custom => {
                warn!(id = %id, "Built-in personas cannot be deleted");
                return Ok(false);
            }
            Some(_) => {}
        }

        let next: Vec<Persona> = self
            .personas
            .iter()
            .filter(|p| &p.id != id)
            .cloned()
            .collect();
        self.commit(next).await?;

        info!(id = %id, "Persona deleted");
        Ok(true)
    }

    /// Persist the custom subset of `next`, then adopt it. A failed write
    /// leaves the registry as it was.
    async fn commit(&mut self, next: Vec<Persona>) -> Result<(), PersonaError> {
        let customs: Vec<&Persona> = next.iter().filter(|p| p.is_custom).collect();
        let json = serde_json::to_string(&customs)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.store.set(CUSTOM_PERSONAS_KEY, &json).await?;
        self.personas = next;
        Ok(())
    }
}
