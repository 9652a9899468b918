//! Persona registry: the built-in catalog merged with user-created personas.
//!
//! Built-ins are fixed and never persisted; the custom subset is written to
//! the `custom-personas` storage key on every mutation.

pub mod catalog;
pub mod registry;

pub use registry::PersonaRegistry;
