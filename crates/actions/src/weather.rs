//! Current weather via OpenWeatherMap.

use async_trait::async_trait;
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};
use serde::Deserialize;
use tracing::warn;

use crate::http::{Upstream, missing_key};

pub struct GetWeather {
    upstream: Upstream,
    base_url: String,
    api_key: Option<String>,
    params: Vec<ParamSpec>,
}

impl GetWeather {
    pub fn new(upstream: Upstream, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            params: vec![ParamSpec::required(
                "city",
                ParamType::String,
                "The city name to look up weather for",
            )],
        }
    }
}

#[async_trait]
impl Action for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a specified city"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(api_key) = self.api_key.as_deref() else {
            return ActionResult::failure(missing_key("OPEN_WEATHER_MAP_API_KEY"));
        };
        let Some(city) = slots.text("city") else {
            return ActionResult::failure("No city given");
        };

        let url = format!("{}/weather", self.base_url);
        let query = [("q", city), ("appid", api_key), ("units", "metric")];
        let body = match self.upstream.get_json("OpenWeatherMap", &url, &query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(city, error = %e, "Weather lookup failed");
                return ActionResult::failure(format!("Error fetching weather data: {e}"));
            }
        };

        match serde_json::from_value::<WeatherResponse>(body) {
            Ok(report) => ActionResult::success(report.render()),
            Err(e) => ActionResult::failure(format!("Error reading weather data: {e}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    name: String,
    sys: WeatherSys,
    main: WeatherMain,
    #[serde(default)]
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct WeatherSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

impl WeatherResponse {
    fn render(&self) -> String {
        let conditions = self
            .weather
            .first()
            .map(|w| title_case(&w.description))
            .unwrap_or_else(|| "Unknown".into());
        format!(
            "Weather in {}, {}:\nTemperature: {}°C (feels like {}°C)\nConditions: {}\nHumidity: {}%",
            self.name, self.sys.country, self.main.temp, self.main.feels_like, conditions, self.main.humidity
        )
    }
}

/// Uppercase the first letter of each word.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
