//! Intent routing: pick at most one action for an utterance.
//!
//! Rules are evaluated in table order. A rule whose trigger is satisfied
//! attempts extraction; success ends routing (first match wins), a missing
//! parameter moves on to the next rule. If no rule matches the input is
//! `Unmatched` and the exchange goes to the generative backend alone.

use std::sync::Arc;

use relaybot_core::action::{ActionRegistry, ExtractedSlots};
use serde::Serialize;
use tracing::debug;

use crate::extractor::SlotExtractor;
use crate::rule::{MatchRule, RuleError};

/// Routing state for one input. Starts `Idle`, ends `Matched` or `Unmatched`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RouteState {
    Idle,
    Matched {
        rule: String,
        action: String,
        slots: ExtractedSlots,
    },
    Unmatched,
}

impl RouteState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// What happened to one rule during routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RuleOutcome {
    NotTriggered,
    MissingParameter { parameter: String },
    Matched,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTrace {
    pub rule: String,
    pub action: String,
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

/// The routing result plus the per-rule evaluation trace.
///
/// Rules after the winning one are not evaluated and do not appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub state: RouteState,
    pub trace: Vec<RuleTrace>,
}

impl RouteDecision {
    /// `(action, slots)` when matched.
    pub fn matched(&self) -> Option<(&str, &ExtractedSlots)> {
        match &self.state {
            RouteState::Matched { action, slots, .. } => Some((action.as_str(), slots)),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched().is_some()
    }
}

/// Ordered rule table over a sealed action registry.
pub struct IntentRouter {
    registry: Arc<ActionRegistry>,
    rules: Vec<MatchRule>,
    extractor: SlotExtractor,
}

impl IntentRouter {
    /// Build a router, checking every rule against the registry: the target
    /// action must exist and every slot rule must name a declared parameter.
    pub fn new(registry: Arc<ActionRegistry>, rules: Vec<MatchRule>) -> Result<Self, RuleError> {
        for rule in &rules {
            let action = registry.lookup(rule.action())?;
            if let Some(slot) = rule
                .slots()
                .iter()
                .find(|slot| action.parameter(slot.parameter()).is_none())
            {
                return Err(RuleError::UnknownParameter {
                    rule: rule.label().to_string(),
                    action: rule.action().to_string(),
                    parameter: slot.parameter().to_string(),
                });
            }
        }
        debug!(rules = rules.len(), actions = registry.len(), "Intent router built");
        Ok(Self {
            registry,
            rules,
            extractor: SlotExtractor,
        })
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// Route one utterance. Pure and deterministic.
    pub fn route(&self, raw_text: &str) -> RouteDecision {
        let lowered = raw_text.to_lowercase();
        let mut state = RouteState::Idle;
        let mut trace = Vec::new();

        for rule in &self.rules {
            if !rule.trigger().is_satisfied(&lowered) {
                trace.push(RuleTrace {
                    rule: rule.label().to_string(),
                    action: rule.action().to_string(),
                    outcome: RuleOutcome::NotTriggered,
                });
                continue;
            }

            // Validated in `new`; the registry is immutable behind the Arc.
            let Ok(action) = self.registry.lookup(rule.action()) else {
                continue;
            };

            match self.extractor.extract(raw_text, action, rule.slots()) {
                Ok(slots) => {
                    debug!(rule = rule.label(), action = rule.action(), "Rule matched");
                    trace.push(RuleTrace {
                        rule: rule.label().to_string(),
                        action: rule.action().to_string(),
                        outcome: RuleOutcome::Matched,
                    });
                    state = RouteState::Matched {
                        rule: rule.label().to_string(),
                        action: rule.action().to_string(),
                        slots,
                    };
                    break;
                }
                Err(relaybot_core::SlotError::MissingParameter { parameter, .. }) => {
                    debug!(rule = rule.label(), parameter = %parameter, "Rule skipped, parameter missing");
                    trace.push(RuleTrace {
                        rule: rule.label().to_string(),
                        action: rule.action().to_string(),
                        outcome: RuleOutcome::MissingParameter { parameter },
                    });
                }
            }
        }

        if state == RouteState::Idle {
            debug!("No rule matched");
            state = RouteState::Unmatched;
        }

        RouteDecision { state, trace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{SlotRule, Trigger};
    use crate::test_helpers::StubAction;
    use relaybot_core::action::{ParamSpec, ParamType};
    use relaybot_core::error::RegistryError;

    fn registry() -> Arc<ActionRegistry> {
        let mut registry = ActionRegistry::new();
        registry
            .register(Box::new(StubAction::new(
                "poem",
                vec![ParamSpec::required("theme", ParamType::String, "Theme")],
            )))
            .unwrap();
        registry
            .register(Box::new(StubAction::new(
                "custom_writing",
                vec![ParamSpec::required("request", ParamType::String, "Request")],
            )))
            .unwrap();
        registry.seal();
        Arc::new(registry)
    }

    fn rules() -> Vec<MatchRule> {
        vec![
            MatchRule::new("poem")
                .when(Trigger::keyword("poem"))
                .slot(SlotRule::new("theme").capture(r"poem about (.+?)(?:\.|\?|$)").unwrap()),
            MatchRule::new("custom_writing")
                .when(Trigger::any_keyword(&["write", "poem"]))
                .slot(SlotRule::new("request").capture(r"^(.+)$").unwrap()),
        ]
    }

    fn router() -> IntentRouter {
        IntentRouter::new(registry(), rules()).unwrap()
    }

    #[test]
    fn first_satisfied_rule_wins() {
        let decision = router().route("a poem about rain");
        let (action, slots) = decision.matched().unwrap();
        assert_eq!(action, "poem");
        assert_eq!(slots.text("theme"), Some("rain"));
        assert_eq!(decision.trace.len(), 1);
    }

    #[test]
    fn missing_slot_falls_through_to_later_rule() {
        let decision = router().route("poem");
        let (action, slots) = decision.matched().unwrap();
        assert_eq!(action, "custom_writing");
        assert_eq!(slots.text("request"), Some("poem"));
        assert_eq!(
            decision.trace[0].outcome,
            RuleOutcome::MissingParameter {
                parameter: "theme".into()
            }
        );
    }

    #[test]
    fn nothing_triggered_is_unmatched() {
        let decision = router().route("hello there");
        assert_eq!(decision.state, RouteState::Unmatched);
        assert!(decision.trace.iter().all(|t| t.outcome == RuleOutcome::NotTriggered));
    }

    #[test]
    fn routing_always_terminates_in_a_terminal_state() {
        let router = router();
        for input in ["", "poem", "write", "poem about x", "?", "hello there"] {
            assert!(router.route(input).state.is_terminal(), "{input:?}");
        }
    }

    #[test]
    fn routing_is_reproducible() {
        let router = router();
        let first = router.route("Write a poem about the sea.");
        for _ in 0..10 {
            assert_eq!(router.route("Write a poem about the sea."), first);
        }
    }

    #[test]
    fn unknown_action_fails_fast() {
        let mut rules = rules();
        rules.push(MatchRule::new("limerick").when(Trigger::keyword("limerick")));
        let err = IntentRouter::new(registry(), rules).err().unwrap();
        assert!(matches!(err, RuleError::Registry(RegistryError::Unknown(name)) if name == "limerick"));
    }

    #[test]
    fn undeclared_parameter_fails_fast() {
        let rules = vec![MatchRule::new("poem").slot(SlotRule::new("meter"))];
        let err = IntentRouter::new(registry(), rules).err().unwrap();
        assert!(matches!(err, RuleError::UnknownParameter { parameter, .. } if parameter == "meter"));
    }

    #[test]
    fn decision_serializes_with_state_tag() {
        let json = serde_json::to_value(router().route("poem about snow")).unwrap();
        assert_eq!(json["state"]["state"], "matched");
        assert_eq!(json["state"]["action"], "poem");
        assert_eq!(json["trace"][0]["outcome"], "matched");
    }
}
