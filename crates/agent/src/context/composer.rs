//! Prompt composition.
//!
//! Builds the single outbound prompt for the generative backend, in order:
//!
//! 1. **Preamble** (profile persona and instructions), never dropped
//! 2. **Chat History** as `role: content` lines, oldest turns dropped first
//! 3. **User utterance**, never dropped
//! 4. **Action result** (success value or failure reason), when routed
//!
//! Composition reads the session and never mutates it. Identical inputs
//! produce identical prompts.

use relaybot_core::action::ActionResult;
use relaybot_core::message::ConversationSession;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::token;

const HISTORY_HEADER: &str = "Chat History:";

/// The routed action's outcome, as handed to the composer.
#[derive(Debug, Clone, Copy)]
pub struct RoutedResult<'a> {
    pub action: &'a str,
    pub result: &'a ActionResult,
}

/// Token accounting for one composed prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionMetadata {
    /// Estimated tokens in the final prompt
    pub total_tokens: usize,
    pub budget: usize,
    pub turns_included: usize,
    pub turns_total: usize,
    pub turns_dropped: usize,
    pub tokens_dropped: usize,
    /// Preamble + utterance + result alone exceed the budget
    pub over_budget: bool,
}

/// The outbound prompt plus its metadata.
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    pub text: String,
    pub metadata: CompositionMetadata,
}

/// Stateless prompt composer for one profile.
#[derive(Debug, Clone)]
pub struct ContextComposer {
    preamble: String,
    budget: usize,
}

impl ContextComposer {
    pub const DEFAULT_BUDGET: usize = 3072;

    pub fn new(preamble: impl Into<String>, budget: usize) -> Self {
        Self {
            preamble: preamble.into(),
            budget,
        }
    }

    pub fn with_default_budget(preamble: impl Into<String>) -> Self {
        Self::new(preamble, Self::DEFAULT_BUDGET)
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Compose the prompt for `utterance`.
    ///
    /// If the fixed sections alone exceed the budget, history is left out
    /// entirely and the prompt is still produced with `over_budget` set.
    pub fn compose(
        &self,
        session: &ConversationSession,
        utterance: &str,
        routed: Option<RoutedResult<'_>>,
    ) -> ComposedPrompt {
        let preamble = self.preamble.trim();
        let user_section = format!("User: {utterance}");
        let result_section = routed.map(render_result);

        let reserved = token::estimate_tokens(preamble)
            + token::estimate_tokens(&user_section)
            + result_section
                .as_deref()
                .map(token::estimate_tokens)
                .unwrap_or(0);

        let turns = session.history();
        let over_budget = reserved > self.budget;
        let available = self.budget.saturating_sub(reserved);

        // Newest turns first until one does not fit; everything older goes.
        let header_tokens = token::estimate_tokens(HISTORY_HEADER);
        let mut used = header_tokens;
        let mut kept = 0;
        if !turns.is_empty() && header_tokens < available {
            for turn in turns.iter().rev() {
                let cost = token::estimate_turn_tokens(turn);
                if used + cost > available {
                    break;
                }
                used += cost;
                kept += 1;
            }
        }
        let included = &turns[turns.len() - kept..];
        let dropped = &turns[..turns.len() - kept];
        let tokens_dropped = token::estimate_turns_tokens(dropped);

        let mut sections: Vec<String> = Vec::with_capacity(4);
        if !preamble.is_empty() {
            sections.push(preamble.to_string());
        }
        if !included.is_empty() {
            let lines: Vec<String> = included.iter().map(|t| t.render()).collect();
            sections.push(format!("{HISTORY_HEADER}\n{}", lines.join("\n")));
        }
        sections.push(user_section);
        if let Some(result) = result_section {
            sections.push(result);
        }

        if over_budget {
            warn!(
                reserved_tokens = reserved,
                budget = self.budget,
                "Preamble and utterance exceed the prompt budget, history omitted"
            );
        } else if !dropped.is_empty() {
            debug!(
                turns_dropped = dropped.len(),
                tokens_dropped,
                "History truncated to fit the prompt budget"
            );
        }

        let history_tokens = if included.is_empty() { 0 } else { used };
        ComposedPrompt {
            text: sections.join("\n\n"),
            metadata: CompositionMetadata {
                total_tokens: reserved + history_tokens,
                budget: self.budget,
                turns_included: included.len(),
                turns_total: turns.len(),
                turns_dropped: dropped.len(),
                tokens_dropped,
                over_budget,
            },
        }
    }
}

fn render_result(routed: RoutedResult<'_>) -> String {
    match routed.result {
        ActionResult::Success { value } => {
            format!("Action result ({}):\n{value}", routed.action)
        }
        ActionResult::Failure { reason } => format!(
            "Action failed ({}): {reason}\nExplain the problem to the user briefly and suggest what they can do instead.",
            routed.action
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(turns: &[(&str, &str)]) -> ConversationSession {
        let mut session = ConversationSession::new();
        for (role, content) in turns {
            match *role {
                "user" => session.append_user(*content),
                _ => session.append_assistant(*content),
            };
        }
        session
    }

    #[test]
    fn sections_in_order() {
        let composer = ContextComposer::with_default_budget("You are a temperature assistant.");
        let session = session_with(&[
            ("user", "hi"),
            ("assistant", "hello!"),
            ("user", "25 celsius to fahrenheit"),
        ]);
        let result = ActionResult::success("25.0°C = 77.0°F");
        let prompt = composer.compose(
            &session,
            "25 celsius to fahrenheit",
            Some(RoutedResult {
                action: "celsius_to_fahrenheit",
                result: &result,
            }),
        );

        assert_eq!(
            prompt.text,
            "You are a temperature assistant.\n\n\
             Chat History:\nuser: hi\nassistant: hello!\nuser: 25 celsius to fahrenheit\n\n\
             User: 25 celsius to fahrenheit\n\n\
             Action result (celsius_to_fahrenheit):\n25.0°C = 77.0°F"
        );
        assert_eq!(prompt.metadata.turns_included, 3);
        assert_eq!(prompt.metadata.turns_dropped, 0);
        assert!(!prompt.metadata.over_budget);
    }

    #[test]
    fn unmatched_prompt_has_no_action_section() {
        let composer = ContextComposer::with_default_budget("Preamble");
        let prompt = composer.compose(&ConversationSession::new(), "hello there", None);
        assert_eq!(prompt.text, "Preamble\n\nUser: hello there");
        assert!(!prompt.text.contains("Action"));
    }

    #[test]
    fn failure_reason_is_included() {
        let composer = ContextComposer::with_default_budget("Preamble");
        let result = ActionResult::failure("NEWS_API_KEY is not configured.");
        let prompt = composer.compose(
            &ConversationSession::new(),
            "latest news",
            Some(RoutedResult {
                action: "top_headlines",
                result: &result,
            }),
        );
        assert!(prompt.text.contains("Action failed (top_headlines): NEWS_API_KEY is not configured."));
    }

    #[test]
    fn oldest_turns_dropped_first() {
        let mut session = ConversationSession::new();
        for i in 0..20 {
            session.append_user(format!("question number {i} {}", "x".repeat(40)));
            session.append_assistant(format!("answer number {i} {}", "y".repeat(40)));
        }
        let composer = ContextComposer::new("Preamble", 120);
        let prompt = composer.compose(&session, "next", None);
        let meta = &prompt.metadata;

        assert!(meta.turns_dropped > 0);
        assert!(meta.turns_included > 0);
        assert_eq!(meta.turns_included + meta.turns_dropped, 40);
        assert!(meta.total_tokens <= 120);
        assert!(prompt.text.contains("answer number 19"));
        assert!(!prompt.text.contains("question number 0 "));

        // Included turns are a contiguous, in-order suffix of the history.
        let expected: Vec<String> = session.history()[40 - meta.turns_included..]
            .iter()
            .map(|t| t.render())
            .collect();
        assert!(prompt.text.contains(&expected.join("\n")));
    }

    #[test]
    fn over_budget_keeps_preamble_and_utterance() {
        let session = session_with(&[("user", "earlier"), ("assistant", "reply")]);
        let composer = ContextComposer::new("A long preamble that does not fit", 4);
        let prompt = composer.compose(&session, "now", None);
        assert!(prompt.metadata.over_budget);
        assert_eq!(prompt.metadata.turns_included, 0);
        assert_eq!(prompt.metadata.turns_dropped, 2);
        assert!(prompt.text.starts_with("A long preamble that does not fit"));
        assert!(prompt.text.ends_with("User: now"));
    }

    #[test]
    fn compose_does_not_mutate_session() {
        let session = session_with(&[("user", "a"), ("assistant", "b")]);
        let before = session.history().to_vec();
        let composer = ContextComposer::with_default_budget("P");
        let first = composer.compose(&session, "c", None);
        let second = composer.compose(&session, "c", None);
        assert_eq!(session.history(), before.as_slice());
        assert_eq!(first.text, second.text);
        assert_eq!(first.metadata, second.metadata);
    }
}
