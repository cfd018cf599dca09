//! The exchange runner.
//!
//! One exchange: append the user turn, route, invoke the matched action,
//! compose the prompt, call the generative backend, append the reply.
//! Exchanges run strictly one after another against a `&mut` session.

use std::sync::Arc;

use relaybot_core::action::ActionResult;
use relaybot_core::error::ProviderError;
use relaybot_core::message::ConversationSession;
use relaybot_core::provider::{CompletionOptions, Provider, ProviderRequest, Usage};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::{CompositionMetadata, ContextComposer, RoutedResult};
use crate::profiles::{Profile, ProfileKind};
use crate::router::{IntentRouter, RouteDecision};

/// What happened during one exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub decision: RouteDecision,

    /// Present only when a rule matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_result: Option<ActionResult>,

    pub prompt: CompositionMetadata,

    /// The backend's reply, or the apology shown in its place
    pub reply: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    #[serde(skip)]
    pub error: Option<ProviderError>,
}

impl Exchange {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A profile wired to a generative backend.
pub struct Assistant {
    kind: ProfileKind,
    router: IntentRouter,
    composer: ContextComposer,
    provider: Arc<dyn Provider>,
    model: String,
    options: CompletionOptions,
}

impl Assistant {
    pub fn new(profile: Profile, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            kind: profile.kind,
            router: profile.router,
            composer: ContextComposer::with_default_budget(profile.preamble),
            provider,
            model: model.into(),
            options: profile.options,
        }
    }

    /// Set the prompt token budget.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.composer = ContextComposer::new(self.composer.preamble().to_string(), budget);
        self
    }

    /// Override the profile's sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = temperature;
        self
    }

    /// Override the profile's response length.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = max_tokens;
        self
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    pub fn options(&self) -> CompletionOptions {
        self.options
    }

    /// Routing only, without invoking anything.
    pub fn route(&self, text: &str) -> RouteDecision {
        self.router.route(text)
    }

    /// Run one exchange.
    ///
    /// Never fails: a backend error becomes an apology in `reply`, and the
    /// session keeps only the user turn for this exchange.
    pub async fn respond(&self, session: &mut ConversationSession, text: &str) -> Exchange {
        info!(
            profile = %self.kind,
            session_id = %session.id,
            turns = session.len(),
            "Processing exchange"
        );

        session.append_user(text);
        let decision = self.router.route(text);

        let action_result = match decision.matched() {
            Some((action, slots)) => {
                let result = self
                    .router
                    .registry()
                    .invoke(action, slots)
                    .await
                    .unwrap_or_else(|e| ActionResult::failure(e.to_string()));
                if let ActionResult::Failure { reason } = &result {
                    warn!(action, reason = %reason, "Action failed");
                } else {
                    debug!(action, "Action succeeded");
                }
                Some(result)
            }
            None => None,
        };

        let routed = decision
            .matched()
            .zip(action_result.as_ref())
            .map(|((action, _), result)| RoutedResult { action, result });
        let prompt = self.composer.compose(session, text, routed);

        let request = ProviderRequest {
            model: self.model.clone(),
            prompt: prompt.text,
            options: self.options,
        };
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            prompt_tokens = prompt.metadata.total_tokens,
            "Sending prompt"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                session.append_assistant(response.text.clone());
                Exchange {
                    decision,
                    action_result,
                    prompt: prompt.metadata,
                    reply: response.text,
                    usage: response.usage,
                    error: None,
                }
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Generative call failed");
                Exchange {
                    decision,
                    action_result,
                    prompt: prompt.metadata,
                    reply: format!("Sorry, I encountered an error: {e}"),
                    usage: None,
                    error: Some(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{MatchRule, SlotRule, Trigger};
    use crate::test_helpers::{ScriptedProvider, StubAction};
    use relaybot_core::action::{ActionRegistry, ParamSpec, ParamType};
    use relaybot_core::message::Role;

    fn profile() -> Profile {
        let mut registry = ActionRegistry::new();
        registry
            .register(Box::new(StubAction::new(
                "lookup",
                vec![ParamSpec::required("city", ParamType::String, "City")],
            )))
            .unwrap();
        registry
            .register(Box::new(
                StubAction::new("broken", vec![])
                    .returning(ActionResult::failure("SERVICE_KEY is not configured.")),
            ))
            .unwrap();
        registry.seal();

        let rules = vec![
            MatchRule::new("lookup")
                .when(Trigger::keyword("weather"))
                .slot(SlotRule::new("city").capture(r"weather in (\w+)").unwrap()),
            MatchRule::new("broken").when(Trigger::keyword("broken")),
        ];
        Profile {
            kind: ProfileKind::Concierge,
            preamble: "You are a test assistant.".into(),
            options: CompletionOptions {
                max_tokens: 321,
                temperature: 0.3,
            },
            router: IntentRouter::new(Arc::new(registry), rules).unwrap(),
        }
    }

    fn assistant(provider: Arc<ScriptedProvider>) -> Assistant {
        Assistant::new(profile(), provider, "mock-model")
    }

    #[tokio::test]
    async fn matched_exchange_merges_action_result() {
        let provider = Arc::new(ScriptedProvider::replies(&["It is sunny in Oslo."]));
        let assistant = assistant(provider.clone());
        let mut session = ConversationSession::new();

        let exchange = assistant.respond(&mut session, "weather in Oslo").await;

        assert!(exchange.is_success());
        assert_eq!(exchange.reply, "It is sunny in Oslo.");
        assert_eq!(exchange.decision.matched().unwrap().0, "lookup");
        assert!(exchange.action_result.as_ref().unwrap().is_success());

        let request = &provider.requests()[0];
        assert_eq!(request.model, "mock-model");
        assert_eq!(request.options.max_tokens, 321);
        assert!(request.prompt.starts_with("You are a test assistant."));
        assert!(request.prompt.contains("User: weather in Oslo"));
        assert!(request.prompt.contains("Action result (lookup):\n{\"city\":\"Oslo\"}"));

        let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn unmatched_exchange_has_no_action_section() {
        let provider = Arc::new(ScriptedProvider::replies(&["Hi!"]));
        let assistant = assistant(provider.clone());
        let mut session = ConversationSession::new();

        let exchange = assistant.respond(&mut session, "hello there").await;

        assert!(!exchange.decision.is_matched());
        assert!(exchange.action_result.is_none());
        assert!(!provider.requests()[0].prompt.contains("Action"));
    }

    #[tokio::test]
    async fn action_failure_reason_reaches_prompt() {
        let provider = Arc::new(ScriptedProvider::replies(&["The service is not set up."]));
        let assistant = assistant(provider.clone());
        let mut session = ConversationSession::new();

        let exchange = assistant.respond(&mut session, "is it broken?").await;

        assert!(exchange.is_success());
        assert!(!exchange.action_result.unwrap().is_success());
        assert!(
            provider.requests()[0]
                .prompt
                .contains("Action failed (broken): SERVICE_KEY is not configured.")
        );
    }

    #[tokio::test]
    async fn provider_error_is_an_apology_and_session_stays_usable() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::RateLimited {
                retry_after_secs: 20,
            }),
            Ok("Back online.".into()),
        ]));
        let assistant = assistant(provider.clone());
        let mut session = ConversationSession::new();

        let failed = assistant.respond(&mut session, "hello").await;
        assert!(!failed.is_success());
        assert!(failed.reply.starts_with("Sorry, I encountered an error: "));
        assert_eq!(session.len(), 1);
        assert_eq!(session.last().unwrap().role, Role::User);

        let recovered = assistant.respond(&mut session, "hello again").await;
        assert_eq!(recovered.reply, "Back online.");
        assert_eq!(session.len(), 3);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn history_accumulates_across_exchanges() {
        let provider = Arc::new(ScriptedProvider::replies(&["first reply", "second reply"]));
        let assistant = assistant(provider.clone());
        let mut session = ConversationSession::new();

        assistant.respond(&mut session, "first question").await;
        assistant.respond(&mut session, "second question").await;

        let prompt = &provider.requests()[1].prompt;
        assert!(prompt.contains(
            "Chat History:\nuser: first question\nassistant: first reply\nuser: second question"
        ));
        assert_eq!(session.len(), 4);
    }

    #[tokio::test]
    async fn overrides_replace_profile_settings() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let assistant = assistant(provider.clone())
            .with_temperature(1.2)
            .with_max_tokens(64)
            .with_budget(2);
        let mut session = ConversationSession::new();

        let exchange = assistant.respond(&mut session, "hello").await;

        let options = provider.requests()[0].options;
        assert_eq!(options.max_tokens, 64);
        assert!((options.temperature - 1.2).abs() < f32::EPSILON);
        assert!(exchange.prompt.over_budget);
        assert_eq!(exchange.prompt.budget, 2);
    }
}
