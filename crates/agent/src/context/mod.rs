//! Prompt composition under a token budget.
//!
//! | Section | Source | Trim Strategy |
//! |---------|--------|---------------|
//! | Preamble | Profile persona and instructions | Never trimmed |
//! | Chat History | Conversation session | Oldest turns dropped |
//! | User | Current utterance | Never trimmed |
//! | Action result | Routed action outcome | Never trimmed |

pub mod composer;
pub mod token;

pub use composer::{ComposedPrompt, CompositionMetadata, ContextComposer, RoutedResult};
