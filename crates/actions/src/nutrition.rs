//! Nutrition lookups against USDA FoodData Central.
//!
//! When the upstream call fails (network, quota, bad key) the lookup falls
//! back to a small built-in table of per-100g estimates so the assistant can
//! still answer for common foods.

use async_trait::async_trait;
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::creative::BriefAction;
use crate::http::Upstream;

/// Nutrient names kept from a USDA record (matched as substrings).
const KEY_NUTRIENTS: [&str; 10] = [
    "energy",
    "protein",
    "fat",
    "carbohydrate",
    "fiber",
    "sugar",
    "sodium",
    "vitamin",
    "calcium",
    "iron",
];

/// Per-100g estimates: (food, calories, protein, fat, carbs).
const ESTIMATES: [(&str, &str, &str, &str, &str); 10] = [
    ("chicken breast", "165", "31g", "3.6g", "0g"),
    ("salmon", "208", "22g", "12g", "0g"),
    ("rice", "130", "2.7g", "0.3g", "28g"),
    ("broccoli", "34", "2.8g", "0.4g", "7g"),
    ("apple", "52", "0.3g", "0.2g", "14g"),
    ("banana", "89", "1.1g", "0.3g", "23g"),
    ("oats", "389", "17g", "7g", "66g"),
    ("egg", "155", "13g", "11g", "1.1g"),
    ("milk", "42", "3.4g", "1g", "5g"),
    ("bread", "265", "9g", "3.2g", "49g"),
];

/// Nutrition facts for one food.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionReport {
    pub food_name: String,
    pub brand: String,
    /// (nutrient, "value unit") in source order
    pub nutrients: Vec<(String, String)>,
    pub note: Option<String>,
}

impl NutritionReport {
    /// Built-in estimate for `food`, or a "not available" report.
    pub fn estimated(food: &str) -> Self {
        let food_lower = food.to_lowercase();
        let hit = ESTIMATES
            .iter()
            .find(|(key, ..)| food_lower.contains(key) || key.contains(food_lower.as_str()));

        match hit {
            Some((_, calories, protein, fat, carbs)) => Self {
                food_name: food.to_string(),
                brand: "Estimated".into(),
                nutrients: vec![
                    ("calories".into(), calories.to_string()),
                    ("protein".into(), protein.to_string()),
                    ("fat".into(), fat.to_string()),
                    ("carbs".into(), carbs.to_string()),
                ],
                note: Some("Estimated values per 100g".into()),
            },
            None => Self {
                food_name: food.to_string(),
                brand: "Unknown".into(),
                nutrients: vec![("calories".into(), "Data not available".into())],
                note: Some("Nutritional information not found".into()),
            },
        }
    }

    /// Calories, read from the first energy/calorie entry's leading digits.
    pub fn calories(&self) -> Option<u64> {
        self.nutrients
            .iter()
            .filter(|(name, _)| {
                let name = name.to_lowercase();
                name.contains("energy") || name.contains("calorie")
            })
            .find_map(|(_, value)| leading_integer(value))
    }

    pub fn render(&self) -> String {
        let mut out = format!("Nutritional Information for {}:\n\n", self.food_name);
        for (name, value) in &self.nutrients {
            out.push_str(&format!("• {name}: {value}\n"));
        }
        if let Some(note) = &self.note {
            out.push_str(&format!("\nNote: {note}"));
        }
        out.trim_end().to_string()
    }
}

/// First run of ASCII digits in `text`.
fn leading_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Outcome of a lookup that reached the upstream or fell back.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(NutritionReport),
    /// The upstream answered but had no record for the food
    NotFound,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodRecord>,
}

#[derive(Debug, Deserialize)]
struct FoodRecord {
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "brandOwner")]
    brand_owner: Option<String>,
    #[serde(default, rename = "foodNutrients")]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(default, rename = "nutrientName")]
    nutrient_name: String,
    #[serde(default)]
    value: f64,
    #[serde(default, rename = "unitName")]
    unit_name: String,
}

impl FoodRecord {
    fn into_report(self, food: &str) -> NutritionReport {
        let nutrients = self
            .food_nutrients
            .into_iter()
            .filter(|n| {
                let name = n.nutrient_name.to_lowercase();
                KEY_NUTRIENTS.iter().any(|key| name.contains(key))
            })
            .map(|n| (n.nutrient_name, format!("{} {}", n.value, n.unit_name)))
            .collect();
        NutritionReport {
            food_name: self.description.unwrap_or_else(|| food.to_string()),
            brand: self.brand_owner.unwrap_or_else(|| "Generic".into()),
            nutrients,
            note: None,
        }
    }
}

/// Shared USDA FoodData Central handle.
#[derive(Clone)]
pub struct NutritionService {
    upstream: Upstream,
    base_url: String,
    api_key: String,
}

impl NutritionService {
    pub fn new(upstream: Upstream, base_url: &str, api_key: &str) -> Self {
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Look up one food; upstream errors fall back to the estimate table.
    pub async fn lookup(&self, food: &str) -> Lookup {
        let url = format!("{}/foods/search", self.base_url);
        let query = [("query", food), ("api_key", self.api_key.as_str()), ("pageSize", "1")];

        let body = match self.upstream.get_json("USDA FoodData Central", &url, &query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(food, error = %e, "Nutrition lookup failed, using estimates");
                return Lookup::Found(NutritionReport::estimated(food));
            }
        };

        match serde_json::from_value::<SearchResponse>(body) {
            Ok(response) => match response.foods.into_iter().next() {
                Some(record) => Lookup::Found(record.into_report(food)),
                None => Lookup::NotFound,
            },
            Err(e) => {
                debug!(food, error = %e, "Unexpected USDA payload, using estimates");
                Lookup::Found(NutritionReport::estimated(food))
            }
        }
    }
}

pub struct NutritionInfo {
    service: NutritionService,
    params: Vec<ParamSpec>,
}

impl NutritionInfo {
    pub fn new(service: NutritionService) -> Self {
        Self {
            service,
            params: vec![ParamSpec::required("food", ParamType::String, "Food item to look up")],
        }
    }
}

#[async_trait]
impl Action for NutritionInfo {
    fn name(&self) -> &str {
        "nutrition_info"
    }

    fn description(&self) -> &str {
        "Gets nutritional information for a specific food item"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let Some(food) = slots.text("food") else {
            return ActionResult::failure("No food item given");
        };
        match self.service.lookup(food).await {
            Lookup::Found(report) => ActionResult::success(report.render()),
            Lookup::NotFound => {
                ActionResult::failure(format!("No nutritional information found for '{food}'"))
            }
        }
    }
}

/// Split a free-text food list on commas and "and".
pub fn split_food_list(list: &str) -> Vec<String> {
    list.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|food| food.trim().trim_start_matches("and ").trim().to_string())
        .filter(|food| !food.is_empty())
        .collect()
}

pub struct TotalCalories {
    service: NutritionService,
    params: Vec<ParamSpec>,
}

impl TotalCalories {
    pub fn new(service: NutritionService) -> Self {
        Self {
            service,
            params: vec![ParamSpec::required(
                "food_list",
                ParamType::String,
                "Comma-separated food items",
            )],
        }
    }
}

#[async_trait]
impl Action for TotalCalories {
    fn name(&self) -> &str {
        "total_calories"
    }

    fn description(&self) -> &str {
        "Calculates total calories for a list of food items"
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let foods = split_food_list(slots.text("food_list").unwrap_or_default());
        if foods.is_empty() {
            return ActionResult::failure("No food items given");
        }

        let mut total = 0;
        let mut breakdown = Vec::with_capacity(foods.len());
        for food in &foods {
            let calories = match self.service.lookup(food).await {
                Lookup::Found(report) => report.calories(),
                Lookup::NotFound => None,
            };
            match calories {
                Some(kcal) => {
                    total += kcal;
                    breakdown.push(format!("• {food}: {kcal} calories"));
                }
                None => breakdown.push(format!("• {food}: calories unknown")),
            }
        }

        ActionResult::success(format!(
            "Total Calorie Calculation:\n\n{}\n\nTotal Calories: {total}",
            breakdown.join("\n")
        ))
    }
}

/// Foods whose facts accompany a meal-plan brief, by dietary preference.
fn staple_foods(preferences: &str) -> [&'static str; 4] {
    let preferences = preferences.to_lowercase();
    if preferences.contains("vegan") {
        ["oats", "rice", "broccoli", "banana"]
    } else if preferences.contains("vegetarian") {
        ["egg", "oats", "broccoli", "milk"]
    } else if preferences.contains("keto") || preferences.contains("low carb") {
        ["salmon", "egg", "broccoli", "chicken breast"]
    } else {
        ["chicken breast", "rice", "broccoli", "oats"]
    }
}

/// Meal-plan brief followed by nutrition facts for up to three staple foods
/// of the chosen diet. Staples named in `restrictions` are left out.
pub struct MealPlan {
    brief: BriefAction,
    service: NutritionService,
}

impl MealPlan {
    pub fn new(service: NutritionService) -> Self {
        Self {
            brief: BriefAction::meal_plan(),
            service,
        }
    }
}

#[async_trait]
impl Action for MealPlan {
    fn name(&self) -> &str {
        self.brief.name()
    }

    fn description(&self) -> &str {
        self.brief.description()
    }

    fn parameters(&self) -> &[ParamSpec] {
        self.brief.parameters()
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        let ActionResult::Success { value: brief } = self.brief.invoke(slots).await else {
            return ActionResult::failure("Could not prepare the meal plan");
        };

        let preferences = slots.text("preferences").unwrap_or("balanced diet");
        let restrictions = slots.text("restrictions").unwrap_or_default().to_lowercase();
        let staples = staple_foods(preferences)
            .into_iter()
            .filter(|food| !restrictions.contains(food))
            .take(3);

        let mut facts = Vec::new();
        for food in staples {
            match self.service.lookup(food).await {
                Lookup::Found(report) => facts.push(report.render()),
                Lookup::NotFound => debug!(food, "No nutrition record for staple"),
            }
        }

        if facts.is_empty() {
            return ActionResult::success(brief);
        }
        ActionResult::success(format!(
            "{brief}\n\nUse these nutrition facts for the staple foods where they fit:\n\n{}",
            facts.join("\n\n")
        ))
    }
}
