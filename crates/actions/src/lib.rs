//! Built-in deterministic actions for Relaybot.
//!
//! Actions give an assistant facts it cannot make up: unit conversions,
//! current weather, news, nutrition data and movie details. Creative briefs
//! are actions too; they render a writing prompt instead of calling out.
//!
//! [`ActionKit`] builds the action set for each assistant profile from the
//! `[actions]` section of the configuration.

pub mod creative;
pub mod http;
pub mod movie;
pub mod news;
pub mod nutrition;
pub mod temperature;
pub mod weather;

use relaybot_config::ActionsConfig;
use relaybot_core::action::{Action, ActionRegistry};
use relaybot_core::error::RegistryError;

pub use creative::BriefAction;
pub use http::{Upstream, UpstreamError};
pub use news::NewsApi;
pub use nutrition::NutritionService;

/// Factory for the per-profile action sets.
///
/// Network-backed actions share one HTTP client.
#[derive(Clone)]
pub struct ActionKit {
    config: ActionsConfig,
    upstream: Upstream,
}

impl ActionKit {
    pub fn new(config: &ActionsConfig) -> Self {
        Self {
            config: config.clone(),
            upstream: Upstream::new(config.timeout_secs),
        }
    }

    fn news_api(&self) -> NewsApi {
        NewsApi::new(
            self.upstream.clone(),
            &self.config.news_api_url,
            self.config.news_api_key.clone(),
        )
    }

    fn nutrition_service(&self) -> NutritionService {
        NutritionService::new(
            self.upstream.clone(),
            &self.config.usda_api_url,
            &self.config.usda_api_key,
        )
    }

    pub fn temperature(&self) -> Vec<Box<dyn Action>> {
        use temperature::{ConvertTemperature, Direction, TemperatureInfo};
        vec![
            Box::new(ConvertTemperature::new(Direction::CelsiusToFahrenheit)),
            Box::new(ConvertTemperature::new(Direction::FahrenheitToCelsius)),
            Box::new(TemperatureInfo),
        ]
    }

    pub fn news(&self) -> Vec<Box<dyn Action>> {
        let api = self.news_api();
        vec![
            Box::new(news::TopHeadlines::new(api.clone())),
            Box::new(news::SearchNews::new(api.clone())),
            Box::new(news::NewsSources::new(api.clone())),
            Box::new(news::NewsBySource::new(api)),
            Box::new(news::NewsHelp),
        ]
    }

    pub fn nutrition(&self) -> Vec<Box<dyn Action>> {
        let service = self.nutrition_service();
        vec![
            Box::new(nutrition::MealPlan::new(service.clone())),
            Box::new(nutrition::TotalCalories::new(service.clone())),
            Box::new(nutrition::NutritionInfo::new(service)),
        ]
    }

    pub fn creative(&self) -> Vec<Box<dyn Action>> {
        vec![
            Box::new(BriefAction::poem()),
            Box::new(BriefAction::story()),
            Box::new(BriefAction::custom_writing()),
        ]
    }

    pub fn concierge(&self) -> Vec<Box<dyn Action>> {
        vec![
            Box::new(weather::GetWeather::new(
                self.upstream.clone(),
                &self.config.weather_api_url,
                self.config.open_weather_map_api_key.clone(),
            )),
            Box::new(movie::GetMovieInfo::new(
                self.upstream.clone(),
                &self.config.tmdb_api_url,
                self.config.tmdb_api_key.clone(),
            )),
            Box::new(news::GetNews::new(self.news_api())),
        ]
    }
}

/// Register `actions` in order and seal the registry.
pub fn sealed_registry(actions: Vec<Box<dyn Action>>) -> Result<ActionRegistry, RegistryError> {
    let mut registry = ActionRegistry::new();
    for action in actions {
        registry.register(action)?;
    }
    registry.seal();
    Ok(registry)
}
