//! The Relaybot routing engine.
//!
//! Every exchange runs the same pipeline:
//!
//! 1. **Append** the user's line to the [`ConversationSession`](relaybot_core::ConversationSession)
//! 2. **Route** it through the profile's ordered [`MatchRule`] table; the first
//!    rule whose trigger fires and whose parameters can all be extracted wins
//! 3. **Invoke** the matched action, if any
//! 4. **Compose** preamble, history, utterance and action result under a
//!    token budget
//! 5. **Generate** the reply and append it to the session
//!
//! Routing and composition are synchronous and pure. Only the action call
//! and the generative call suspend.

pub mod assistant;
pub mod context;
pub mod extractor;
pub mod profiles;
pub mod router;
pub mod rule;

#[cfg(test)]
mod test_helpers;

pub use assistant::{Assistant, Exchange};
pub use context::{ComposedPrompt, CompositionMetadata, ContextComposer, RoutedResult};
pub use extractor::SlotExtractor;
pub use profiles::{Profile, ProfileKind, UnknownProfile};
pub use router::{IntentRouter, RouteDecision, RouteState, RuleOutcome, RuleTrace};
pub use rule::{MatchRule, RuleError, SlotRule, Trigger};
