//! Shared test helpers: a stub action and a scripted provider.

use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec};
use relaybot_core::error::ProviderError;
use relaybot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// An action with a declared schema that reports the slots it received.
pub struct StubAction {
    name: String,
    params: Vec<ParamSpec>,
    result: Option<ActionResult>,
}

impl StubAction {
    pub fn new(name: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.to_string(),
            params,
            result: None,
        }
    }

    /// Always return `result` instead of echoing the slots.
    pub fn returning(mut self, result: ActionResult) -> Self {
        self.result = Some(result);
        self
    }
}

#[async_trait::async_trait]
impl Action for StubAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Stub action for tests"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        match &self.result {
            Some(result) => result.clone(),
            None => ActionResult::success(serde_json::to_string(slots).unwrap()),
        }
    }
}

/// A provider that replays scripted outcomes and records every prompt.
///
/// Panics if called more often than scripted.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            panic!("ScriptedProvider exhausted after {} calls", prompts.len());
        }
        let model = request.model.clone();
        prompts.push(request);
        outcomes.remove(0).map(|text| ProviderResponse {
            text,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}
