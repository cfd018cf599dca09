//! # Relaybot Core
//!
//! Domain types, traits, and error definitions for the Relaybot assistant
//! runtime. This crate has **no I/O**: it defines the domain model that the
//! other crates implement against.
//!
//! - [`action`]: deterministic actions and the sealed [`ActionRegistry`]
//! - [`message`]: append-only [`ConversationSession`] history
//! - [`provider`]: the generative backend contract
//! - [`error`]: one error enum per bounded context

pub mod action;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use action::{
    Action, ActionDefinition, ActionRegistry, ActionResult, ExtractedSlots, ParamSpec, ParamType,
    SlotValue,
};
pub use error::{ProviderError, RegistryError, SlotError};
pub use message::{ConversationSession, Role, SessionId, Turn};
pub use provider::{CompletionOptions, Provider, ProviderRequest, ProviderResponse, Usage};
