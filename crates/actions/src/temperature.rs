//! Temperature conversion actions (Celsius ⇄ Fahrenheit) and scale info.

use async_trait::async_trait;
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Which way a [`ConvertTemperature`] action converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    CelsiusToFahrenheit,
    FahrenheitToCelsius,
}

/// Converts the numeric `value` slot in one direction.
pub struct ConvertTemperature {
    direction: Direction,
    params: Vec<ParamSpec>,
}

impl ConvertTemperature {
    pub fn new(direction: Direction) -> Self {
        let description = match direction {
            Direction::CelsiusToFahrenheit => "Temperature in degrees Celsius",
            Direction::FahrenheitToCelsius => "Temperature in degrees Fahrenheit",
        };
        Self {
            direction,
            params: vec![ParamSpec::required("value", ParamType::Number, description)],
        }
    }
}

#[async_trait]
impl Action for ConvertTemperature {
    fn name(&self) -> &str {
        match self.direction {
            Direction::CelsiusToFahrenheit => "celsius_to_fahrenheit",
            Direction::FahrenheitToCelsius => "fahrenheit_to_celsius",
        }
    }

    fn description(&self) -> &str {
        match self.direction {
            Direction::CelsiusToFahrenheit => "Converts temperature from Celsius to Fahrenheit",
            Direction::FahrenheitToCelsius => "Converts temperature from Fahrenheit to Celsius",
        }
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(value) = slots.number("value") else {
            return ActionResult::failure("Invalid temperature value provided");
        };
        match self.direction {
            Direction::CelsiusToFahrenheit => ActionResult::success(format!(
                "{value:.1}°C = {:.1}°F",
                celsius_to_fahrenheit(value)
            )),
            Direction::FahrenheitToCelsius => ActionResult::success(format!(
                "{value:.1}°F = {:.1}°C",
                fahrenheit_to_celsius(value)
            )),
        }
    }
}

const TEMPERATURE_INFO: &str = "Temperature Scale Information:
- Celsius (°C): Water freezes at 0°C and boils at 100°C
- Fahrenheit (°F): Water freezes at 32°F and boils at 212°F
- Conversion formulas:
  * C to F: (C × 9/5) + 32
  * F to C: (F - 32) × 5/9";

/// Static reference text about the two scales.
pub struct TemperatureInfo;

#[async_trait]
impl Action for TemperatureInfo {
    fn name(&self) -> &str {
        "temperature_info"
    }

    fn description(&self) -> &str {
        "Gets information about temperature scales"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &[]
    }

    async fn invoke(&self, _slots: &ExtractedSlots) -> ActionResult {
        ActionResult::success(TEMPERATURE_INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaybot_core::action::SlotValue;

    fn value(v: f64) -> ExtractedSlots {
        let mut slots = ExtractedSlots::new();
        slots.insert("value", SlotValue::Number(v));
        slots
    }

    #[test]
    fn formulas() {
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 1e-9);
        assert!((fahrenheit_to_celsius(32.0)).abs() < 1e-9);
        assert!((celsius_to_fahrenheit(-40.0) - fahrenheit_to_celsius(-40.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn celsius_to_fahrenheit_formats_one_decimal() {
        let action = ConvertTemperature::new(Direction::CelsiusToFahrenheit);
        let result = action.invoke(&value(25.0)).await;
        assert_eq!(result, ActionResult::success("25.0°C = 77.0°F"));
    }

    #[tokio::test]
    async fn fahrenheit_to_celsius_formats_one_decimal() {
        let action = ConvertTemperature::new(Direction::FahrenheitToCelsius);
        let result = action.invoke(&value(77.0)).await;
        assert_eq!(result, ActionResult::success("77.0°F = 25.0°C"));
    }

    #[tokio::test]
    async fn missing_value_is_a_failure_not_a_panic() {
        let action = ConvertTemperature::new(Direction::CelsiusToFahrenheit);
        let result = action.invoke(&ExtractedSlots::new()).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn info_mentions_both_scales() {
        let result = TemperatureInfo.invoke(&ExtractedSlots::new()).await;
        assert!(result.text().contains("Celsius"));
        assert!(result.text().contains("212°F"));
    }

    #[test]
    fn names_follow_direction() {
        assert_eq!(
            ConvertTemperature::new(Direction::FahrenheitToCelsius).name(),
            "fahrenheit_to_celsius"
        );
        assert_eq!(
            ConvertTemperature::new(Direction::CelsiusToFahrenheit).parameters()[0].kind,
            ParamType::Number
        );
    }
}
