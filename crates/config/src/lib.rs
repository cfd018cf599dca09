//! Configuration loading, validation, and management for Relaybot.
//!
//! Loads configuration from `~/.relaybot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.relaybot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative backend (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default generative provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Assistant profile used when none is given on the command line
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Overrides the profile's temperature when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Overrides the profile's max tokens per response when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Token budget for one composed prompt
    #[serde(default = "default_prompt_budget")]
    pub prompt_budget_tokens: usize,

    /// Data action settings (API keys, endpoints, timeouts)
    #[serde(default)]
    pub actions: ActionsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Local OpenAI-compatible servers that accept requests without a key.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_profile() -> String {
    "concierge".into()
}
fn default_prompt_budget() -> usize {
    3072
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_profile", &self.default_profile)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt_budget_tokens", &self.prompt_budget_tokens)
            .field("actions", &self.actions)
            .field("providers", &self.providers)
            .finish()
    }
}

/// Per-provider settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Settings for the deterministic data actions.
#[derive(Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// NewsAPI.org key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_api_key: Option<String>,

    /// OpenWeatherMap key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_weather_map_api_key: Option<String>,

    /// The Movie Database key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_api_key: Option<String>,

    /// USDA FoodData Central key (the public demo key works for light use)
    #[serde(default = "default_usda_key")]
    pub usda_api_key: String,

    /// Timeout for one upstream request
    #[serde(default = "default_action_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_news_url")]
    pub news_api_url: String,

    #[serde(default = "default_weather_url")]
    pub weather_api_url: String,

    #[serde(default = "default_tmdb_url")]
    pub tmdb_api_url: String,

    #[serde(default = "default_usda_url")]
    pub usda_api_url: String,
}

fn default_usda_key() -> String {
    "DEMO_KEY".into()
}
fn default_action_timeout() -> u64 {
    15
}
fn default_news_url() -> String {
    "https://newsapi.org/v2".into()
}
fn default_weather_url() -> String {
    "https://api.openweathermap.org/data/2.5".into()
}
fn default_tmdb_url() -> String {
    "https://api.themoviedb.org/3".into()
}
fn default_usda_url() -> String {
    "https://api.nal.usda.gov/fdc/v1".into()
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            open_weather_map_api_key: None,
            tmdb_api_key: None,
            usda_api_key: default_usda_key(),
            timeout_secs: default_action_timeout(),
            news_api_url: default_news_url(),
            weather_api_url: default_weather_url(),
            tmdb_api_url: default_tmdb_url(),
            usda_api_url: default_usda_url(),
        }
    }
}

impl std::fmt::Debug for ActionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsConfig")
            .field("news_api_key", &redact(&self.news_api_key))
            .field("open_weather_map_api_key", &redact(&self.open_weather_map_api_key))
            .field("tmdb_api_key", &redact(&self.tmdb_api_key))
            .field("usda_api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("news_api_url", &self.news_api_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("tmdb_api_url", &self.tmdb_api_url)
            .field("usda_api_url", &self.usda_api_url)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.relaybot/config.toml),
    /// then apply environment overrides:
    /// - `RELAYBOT_API_KEY`, then `OPENAI_API_KEY` (only if no key in the file)
    /// - `RELAYBOT_PROVIDER`, `RELAYBOT_MODEL`, `RELAYBOT_PROFILE`
    /// - `NEWS_API_KEY`, `OPEN_WEATHER_MAP_API_KEY`, `TMDB_API_KEY`, `USDA_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from a lookup function.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("RELAYBOT_API_KEY").or_else(|| var("OPENAI_API_KEY"));
        }
        if let Some(provider) = var("RELAYBOT_PROVIDER") {
            self.default_provider = provider;
        }
        if let Some(model) = var("RELAYBOT_MODEL") {
            self.default_model = model;
        }
        if let Some(profile) = var("RELAYBOT_PROFILE") {
            self.default_profile = profile;
        }

        let actions = &mut self.actions;
        if let Some(key) = var("NEWS_API_KEY") {
            actions.news_api_key = Some(key);
        }
        if let Some(key) = var("OPEN_WEATHER_MAP_API_KEY") {
            actions.open_weather_map_api_key = Some(key);
        }
        if let Some(key) = var("TMDB_API_KEY") {
            actions.tmdb_api_key = Some(key);
        }
        if let Some(key) = var("USDA_API_KEY") {
            actions.usda_api_key = key;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".relaybot")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.prompt_budget_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "prompt_budget_tokens must be > 0".into(),
            ));
        }

        if self.actions.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "actions.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// The entry under `[providers.<default_provider>]`, if any.
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.default_provider)
    }

    /// The backend API key: the provider entry's key first, then the
    /// top-level one.
    pub fn api_key_for_default_provider(&self) -> Option<&str> {
        self.active_provider()
            .and_then(|p| p.api_key.as_deref())
            .or(self.api_key.as_deref())
    }

    /// Check if the default provider can be called: a key is available, or
    /// the provider is a local server that takes none.
    pub fn has_api_key(&self) -> bool {
        self.api_key_for_default_provider().is_some()
            || KEYLESS_PROVIDERS.contains(&self.default_provider.as_str())
    }

    /// The model to request: the provider entry's `default_model` first,
    /// then the top-level one.
    pub fn model_for_default_provider(&self) -> &str {
        self.active_provider()
            .and_then(|p| p.default_model.as_deref())
            .unwrap_or(&self.default_model)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_profile: default_profile(),
            temperature: None,
            max_tokens: None,
            prompt_budget_tokens: default_prompt_budget(),
            actions: ActionsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
