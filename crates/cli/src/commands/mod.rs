//! CLI subcommands.

pub mod actions;
pub mod chat;
pub mod onboard;
pub mod profiles;
pub mod route;

use std::sync::Arc;

use relaybot_actions::ActionKit;
use relaybot_agent::{Assistant, Profile, ProfileKind};
use relaybot_config::AppConfig;
use relaybot_core::provider::Provider;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the profile named on the command line, or the configured default.
pub fn load_profile(
    config: &AppConfig,
    name: Option<&str>,
) -> Result<Profile, Box<dyn std::error::Error>> {
    let kind: ProfileKind = name.unwrap_or(config.default_profile.as_str()).parse()?;
    let kit = ActionKit::new(&config.actions);
    Ok(Profile::build(kind, &kit)?)
}

/// Wire a profile to a provider, applying the config's budget and overrides.
pub fn build_assistant(
    config: &AppConfig,
    profile: Profile,
    provider: Arc<dyn Provider>,
) -> Assistant {
    let mut assistant = Assistant::new(profile, provider, config.model_for_default_provider())
        .with_budget(config.prompt_budget_tokens);
    if let Some(temperature) = config.temperature {
        assistant = assistant.with_temperature(temperature);
    }
    if let Some(max_tokens) = config.max_tokens {
        assistant = assistant.with_max_tokens(max_tokens);
    }
    assistant
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaybot_config::ProviderConfig;
    use relaybot_providers::OpenAiCompatProvider;

    fn assistant_for(config: &AppConfig) -> Assistant {
        let profile = load_profile(config, Some("temperature")).unwrap();
        let provider = Arc::new(OpenAiCompatProvider::new("openai", "http://127.0.0.1:9", "k"));
        build_assistant(config, profile, provider)
    }

    #[test]
    fn assistant_uses_provider_model_when_set() {
        let mut config = AppConfig::default();
        assert_eq!(assistant_for(&config).model(), "gpt-4");

        config.providers.insert(
            "openai".into(),
            ProviderConfig {
                default_model: Some("gpt-4o-mini".into()),
                ..ProviderConfig::default()
            },
        );
        assert_eq!(assistant_for(&config).model(), "gpt-4o-mini");
    }

    #[test]
    fn config_overrides_replace_profile_options() {
        let config = AppConfig {
            temperature: Some(0.1),
            max_tokens: Some(200),
            ..AppConfig::default()
        };
        let options = assistant_for(&config).options();
        assert_eq!(options.max_tokens, 200);
        assert!((options.temperature - 0.1).abs() < f32::EPSILON);
    }
}
