//! Assistant profiles.
//!
//! A profile bundles everything one assistant needs: a persona preamble,
//! generation settings, a sealed action registry and the priority-ordered
//! rule table that routes into it. Rule order is the routing priority:
//! domain rules first, generic fallbacks last.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use relaybot_actions::{ActionKit, sealed_registry};
use relaybot_core::action::Action;
use relaybot_core::provider::CompletionOptions;
use serde::Serialize;

use crate::router::IntentRouter;
use crate::rule::{MatchRule, RuleError, SlotRule, Trigger};

/// The built-in assistants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Temperature,
    News,
    Nutrition,
    Creative,
    Concierge,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown profile '{0}'. Available: temperature, news, nutrition, creative, concierge")]
pub struct UnknownProfile(pub String);

impl ProfileKind {
    pub const ALL: [ProfileKind; 5] = [
        Self::Temperature,
        Self::News,
        Self::Nutrition,
        Self::Creative,
        Self::Concierge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::News => "news",
            Self::Nutrition => "nutrition",
            Self::Creative => "creative",
            Self::Concierge => "concierge",
        }
    }

    /// Speaker label shown in the console.
    pub fn bot_name(&self) -> &'static str {
        match self {
            Self::Temperature => "TempBot",
            Self::News => "NewsBot",
            Self::Nutrition => "NutritionBot",
            Self::Creative => "CreativeBot",
            Self::Concierge => "Concierge",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Temperature => "Temperature Conversion Chat Bot",
            Self::News => "News Information Chat Bot",
            Self::Nutrition => "Nutrition & Meal Planning Assistant",
            Self::Creative => "Creative Writing Assistant",
            Self::Concierge => "Concierge Assistant",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Temperature => "Convert temperatures between Celsius and Fahrenheit",
            Self::News => "Headlines, topic searches and news sources from NewsAPI",
            Self::Nutrition => "Meal plans, nutrition facts and calorie totals",
            Self::Creative => "Poems, children's stories and other creative writing",
            Self::Concierge => "Weather, movie details and the latest news",
        }
    }

    /// Sample utterances for the console banner.
    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Self::Temperature => &[
                "25 celsius to fahrenheit",
                "77 fahrenheit to celsius",
                "temperature info",
            ],
            Self::News => &[
                "What's the latest news?",
                "News about artificial intelligence",
                "Technology news sources",
                "News from BBC",
            ],
            Self::Nutrition => &[
                "Create a meal plan for weight loss",
                "What's the nutrition in salmon?",
                "Calculate calories for chicken, rice, broccoli",
                "Make a vegetarian meal plan",
            ],
            Self::Creative => &[
                "Write a poem about the ocean",
                "Create a story about a brave mouse",
                "Write a haiku about spring",
                "Tell a story about friendship",
            ],
            Self::Concierge => &[
                "What's the weather like in Paris?",
                "Tell me about the movie Inception",
                "Any news about electric cars?",
            ],
        }
    }

    pub fn farewell(&self) -> &'static str {
        match self {
            Self::Temperature => "Goodbye! Stay warm!",
            Self::News => "Goodbye! Stay informed!",
            Self::Nutrition => "Goodbye! Stay healthy!",
            Self::Creative => "Goodbye! Keep creating!",
            Self::Concierge => "Goodbye! Have a great day!",
        }
    }

    pub fn preamble(&self) -> &'static str {
        match self {
            Self::Temperature => TEMPERATURE_PREAMBLE,
            Self::News => NEWS_PREAMBLE,
            Self::Nutrition => NUTRITION_PREAMBLE,
            Self::Creative => CREATIVE_PREAMBLE,
            Self::Concierge => CONCIERGE_PREAMBLE,
        }
    }

    /// The profile's own generation settings.
    pub fn options(&self) -> CompletionOptions {
        let (max_tokens, temperature) = match self {
            Self::Temperature => (1000, 0.7),
            Self::News | Self::Nutrition | Self::Concierge => (1500, 0.7),
            Self::Creative => (1500, 0.8),
        };
        CompletionOptions {
            max_tokens,
            temperature,
        }
    }

    fn actions(&self, kit: &ActionKit) -> Vec<Box<dyn Action>> {
        match self {
            Self::Temperature => kit.temperature(),
            Self::News => kit.news(),
            Self::Nutrition => kit.nutrition(),
            Self::Creative => kit.creative(),
            Self::Concierge => kit.concierge(),
        }
    }

    /// The rule table, in routing priority order.
    pub fn rules(&self) -> Result<Vec<MatchRule>, RuleError> {
        match self {
            Self::Temperature => temperature_rules(),
            Self::News => news_rules(),
            Self::Nutrition => nutrition_rules(),
            Self::Creative => creative_rules(),
            Self::Concierge => concierge_rules(),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}

/// A fully built assistant profile.
pub struct Profile {
    pub kind: ProfileKind,
    pub preamble: String,
    pub options: CompletionOptions,
    pub router: IntentRouter,
}

impl Profile {
    /// Build the profile's registry and router. Fails on a rule that names
    /// an unknown action or parameter.
    pub fn build(kind: ProfileKind, kit: &ActionKit) -> Result<Self, RuleError> {
        let registry = sealed_registry(kind.actions(kit))?;
        let router = IntentRouter::new(Arc::new(registry), kind.rules()?)?;
        Ok(Self {
            kind,
            preamble: kind.preamble().to_string(),
            options: kind.options(),
            router,
        })
    }
}

const TEMPERATURE_PREAMBLE: &str = "You are a helpful temperature conversion assistant. You can help users convert between Celsius and Fahrenheit.
When a conversion result is provided below, use it rather than calculating the numbers yourself.

Help the user with temperature conversions. If they provide a temperature value, explain the converted value.
Respond in a helpful and friendly manner.";

const NEWS_PREAMBLE: &str = "You are a helpful news assistant that provides current news information from reliable sources.
You can get headlines, search for specific topics, and provide news from various sources around the world.

Present news information in a clear, organized format with headlines, sources, and brief descriptions.
Only report articles that appear in the action result below; never invent headlines.";

const NUTRITION_PREAMBLE: &str = "You are a comprehensive nutrition and meal planning assistant. You combine AI-generated meal plans with real nutritional data to help users achieve their health goals.

If the user has not made a specific request, encourage them to ask for:
- Meal plans (e.g., \"Create a meal plan for weight loss\")
- Nutrition information (e.g., \"What's the nutrition in chicken breast?\")
- Calorie calculations (e.g., \"Calculate calories for apple, banana, oats\")

Be encouraging and provide practical advice.";

const CREATIVE_PREAMBLE: &str = "You are a creative writing assistant specializing in poems and children's stories.
You help users create beautiful, engaging content based on their ideas and themes.

When a writing brief is provided below, write the piece it describes.
Otherwise respond helpfully about creative writing and encourage the user to ask for a poem, story, or other creative content.";

const CONCIERGE_PREAMBLE: &str = "You are a friendly concierge assistant with access to live weather, movie and news data.
Use the action result below, when present, as the source of truth and summarize it conversationally.";

/// A reading on `scale`, not starting mid-number. Thousands groups must be
/// complete, so "1,00 c" captures nothing.
fn reading(scale: &str) -> String {
    format!(r"(?:^|[^\d.,])(-?(?:\d{{1,3}}(?:,\d{{3}})+|\d+)(?:\.\d+)?)\s*(?:°\s*)?(?:{scale})\b")
}

fn strip_thousands(value: &str) -> String {
    value.replace(',', "")
}

fn temperature_rules() -> Result<Vec<MatchRule>, RuleError> {
    Ok(vec![
        MatchRule::new("celsius_to_fahrenheit")
            .when(Trigger::all(vec![
                Trigger::pattern(r"\d(?:\.\d+)?\s*(?:°\s*)?(?:c|celsius)\b")?,
                Trigger::any(vec![Trigger::keyword("fahrenheit"), Trigger::pattern(r"\bf\b")?]),
            ]))
            .slot(
                SlotRule::new("value")
                    .capture(&reading("c|celsius"))?
                    .map(strip_thousands),
            ),
        MatchRule::new("fahrenheit_to_celsius")
            .when(Trigger::all(vec![
                Trigger::pattern(r"\d(?:\.\d+)?\s*(?:°\s*)?(?:f|fahrenheit)\b")?,
                Trigger::any(vec![Trigger::keyword("celsius"), Trigger::pattern(r"\bc\b")?]),
            ]))
            .slot(
                SlotRule::new("value")
                    .capture(&reading("f|fahrenheit"))?
                    .map(strip_thousands),
            ),
        MatchRule::new("temperature_info").when(Trigger::any_keyword(&["temperature info", "scale"])),
    ])
}

/// NewsAPI source id for a spoken source name.
fn source_id(name: &str) -> String {
    let name = name.to_lowercase();
    match name.as_str() {
        "bbc" => "bbc-news".to_string(),
        "wsj" => "the-wall-street-journal".to_string(),
        _ => name.split_whitespace().collect::<Vec<_>>().join("-"),
    }
}

fn news_rules() -> Result<Vec<MatchRule>, RuleError> {
    Ok(vec![
        MatchRule::new("top_headlines")
            .when(Trigger::any_keyword(&["latest news", "top headlines", "current news"]))
            .slot(
                SlotRule::new("country")
                    .capture(r"\b(?:from|in) ([a-z]{2})\b")?
                    .map(str::to_lowercase),
            ),
        MatchRule::new("search_news")
            .when(Trigger::any_keyword(&["news about", "search"]))
            .slot(SlotRule::new("topic").capture(r"(?:news about|search (?:for )?)(.*?)(?:\?|$)")?),
        MatchRule::new("news_sources")
            .when(Trigger::keyword("sources"))
            .slot(SlotRule::new("category").keywords(&[
                ("business", "business"),
                ("technology", "technology"),
                ("science", "science"),
                ("health", "health"),
                ("sports", "sports"),
                ("entertainment", "entertainment"),
            ])),
        MatchRule::new("news_by_source")
            .when(Trigger::keyword("news from"))
            .slot(
                SlotRule::new("source")
                    .capture(r"news from (.+?)(?:\?|$)")?
                    .map(source_id),
            ),
        MatchRule::new("news_help").when(Trigger::any_keyword(&["help", "commands"])),
    ])
}

fn nutrition_rules() -> Result<Vec<MatchRule>, RuleError> {
    Ok(vec![
        MatchRule::new("meal_plan")
            .when(Trigger::any_keyword(&["meal plan", "diet plan", "menu"]))
            .slot(SlotRule::new("goal").keywords(&[
                ("lose weight", "lose weight"),
                ("weight loss", "lose weight"),
                ("gain weight", "gain muscle mass"),
                ("muscle", "gain muscle mass"),
                ("maintain", "maintain current weight"),
            ]))
            .slot(SlotRule::new("preferences").keywords(&[
                ("vegetarian", "vegetarian"),
                ("vegan", "vegan"),
                ("keto", "ketogenic"),
                ("low carb", "low carb"),
            ]))
            .slot(SlotRule::new("meals").capture(r"(\d+)\s*meals?\b")?)
            .slot(SlotRule::new("restrictions").capture(r"(?:allergic to|allergy to|without) (.+?)(?:[,.?!]|$)")?),
        MatchRule::new("total_calories")
            .when(Trigger::any_keyword(&["total calories", "calculate calories"]))
            .slot(
                SlotRule::new("food_list")
                    .capture(r"(?:calories (?:for|in) |calculate calories (?:for )?)(.*?)(?:\?|$)")?,
            ),
        MatchRule::new("nutrition_info")
            .when(Trigger::any_keyword(&["nutrition", "calories"]))
            .slot(
                SlotRule::new("food")
                    .capture(r"nutrition (?:for |of |in )?(.+?)(?:\?|$)")?
                    .capture(r"calories in (.+?)(?:\?|$)")?,
            ),
    ])
}

fn creative_rules() -> Result<Vec<MatchRule>, RuleError> {
    Ok(vec![
        MatchRule::new("poem")
            .when(Trigger::any_keyword(&["poem", "haiku", "sonnet"]))
            .slot(SlotRule::new("theme").capture(r"(?:poem|haiku|sonnet) about (.+?)(?:\.|\?|!|$)")?)
            .slot(SlotRule::new("style").keywords(&[
                ("haiku", "haiku"),
                ("rhyming", "rhyming verse"),
                ("rhyme", "rhyming verse"),
                ("sonnet", "sonnet"),
            ])),
        MatchRule::new("story")
            .when(Trigger::any_keyword(&["story", "tale"]))
            .slot(SlotRule::new("topic").capture(r"(?:story|tale) about (.+?)(?:\.|\?|!|$)")?)
            .slot(SlotRule::new("character").keywords(&[
                ("dragon", "a kind dragon"),
                ("princess", "a brave princess"),
                ("cat", "a clever cat"),
                ("dog", "a loyal dog"),
            ]))
            .slot(SlotRule::new("setting").keywords(&[
                ("castle", "a grand castle"),
                ("ocean", "under the sea"),
                ("sea", "under the sea"),
                ("space", "in outer space"),
            ])),
        MatchRule::new("custom_writing")
            .labelled("custom_writing_fallback")
            .when(Trigger::any_keyword(&["write", "create", "poem", "story", "tale", "haiku"]))
            .slot(SlotRule::new("request").capture(r"^(.+)$")?),
    ])
}

fn concierge_rules() -> Result<Vec<MatchRule>, RuleError> {
    Ok(vec![
        MatchRule::new("get_weather")
            .when(Trigger::any_keyword(&["weather", "forecast"]))
            .slot(SlotRule::new("city").capture(
                r"(?:weather|forecast|temperature) (?:like )?(?:in|for|at) (.+?)(?:\?|\.|!|$)",
            )?),
        MatchRule::new("get_movie_info")
            .when(Trigger::any_keyword(&["movie", "film"]))
            .slot(
                SlotRule::new("movie_title")
                    .capture(r"(?:movie|film)\s+(?:called|named|titled)\s+(.+?)(?:\?|!|$)")?
                    .capture(r#"(?:movie|film)\s+["“](.+?)["”]"#)?
                    .capture(r"(?:the movie|the film)\s+(.+?)(?:\?|!|$)")?,
            ),
        MatchRule::new("get_news")
            .when(Trigger::any_keyword(&["news", "headlines"]))
            .slot(SlotRule::new("query").capture(r"news (?:about|on) (.+?)(?:\?|!|$)")?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{RouteState, RuleOutcome};
    use relaybot_config::ActionsConfig;
    use relaybot_core::action::SlotValue;

    fn profile(kind: ProfileKind) -> Profile {
        Profile::build(kind, &ActionKit::new(&ActionsConfig::default())).unwrap()
    }

    fn routed(kind: ProfileKind, text: &str) -> (String, relaybot_core::action::ExtractedSlots) {
        let decision = profile(kind).router.route(text);
        let (action, slots) = decision
            .matched()
            .unwrap_or_else(|| panic!("{text:?} did not match in {kind}"));
        (action.to_string(), slots.clone())
    }

    #[test]
    fn every_profile_builds() {
        for kind in ProfileKind::ALL {
            let profile = profile(kind);
            assert!(!profile.router.rules().is_empty());
            assert!(profile.router.registry().is_sealed());
            assert!(!profile.preamble.is_empty());
        }
    }

    #[test]
    fn profile_names_parse() {
        for kind in ProfileKind::ALL {
            assert_eq!(kind.as_str().parse::<ProfileKind>().unwrap(), kind);
        }
        assert_eq!("  News ".parse::<ProfileKind>().unwrap(), ProfileKind::News);
        assert!("weather".parse::<ProfileKind>().is_err());
    }

    #[test]
    fn generation_settings_per_profile() {
        assert_eq!(ProfileKind::Temperature.options().max_tokens, 1000);
        assert_eq!(ProfileKind::News.options().max_tokens, 1500);
        assert!((ProfileKind::Creative.options().temperature - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn celsius_to_fahrenheit() {
        let (action, slots) = routed(ProfileKind::Temperature, "25 celsius to fahrenheit");
        assert_eq!(action, "celsius_to_fahrenheit");
        assert_eq!(slots.number("value"), Some(25.0));
    }

    #[test]
    fn fahrenheit_to_celsius() {
        let (action, slots) = routed(ProfileKind::Temperature, "77 fahrenheit to celsius");
        assert_eq!(action, "fahrenheit_to_celsius");
        assert_eq!(slots.number("value"), Some(77.0));

        let (action, slots) = routed(ProfileKind::Temperature, "What is 98.6°F in C?");
        assert_eq!(action, "fahrenheit_to_celsius");
        assert_eq!(slots.number("value"), Some(98.6));
    }

    #[test]
    fn both_scales_with_numbers_prefers_celsius_first() {
        let (action, slots) = routed(ProfileKind::Temperature, "is 30 c hotter than 80 f?");
        assert_eq!(action, "celsius_to_fahrenheit");
        assert_eq!(slots.number("value"), Some(30.0));
    }

    #[test]
    fn thousands_separators_are_read_whole() {
        let (action, slots) = routed(ProfileKind::Temperature, "1,000 celsius in fahrenheit");
        assert_eq!(action, "celsius_to_fahrenheit");
        assert_eq!(slots.number("value"), Some(1000.0));

        let (_, slots) = routed(ProfileKind::Temperature, "-1,500.5 F to C");
        assert_eq!(slots.number("value"), Some(-1500.5));

        let (_, slots) = routed(ProfileKind::Temperature, "-40 F to C");
        assert_eq!(slots.number("value"), Some(-40.0));
    }

    #[test]
    fn malformed_number_is_missing_not_truncated() {
        let decision = profile(ProfileKind::Temperature)
            .router
            .route("1,00 celsius in fahrenheit");
        assert_eq!(decision.state, RouteState::Unmatched);
        assert!(matches!(
            &decision.trace[0].outcome,
            RuleOutcome::MissingParameter { parameter } if parameter == "value"
        ));
    }

    #[test]
    fn temperature_info_and_unmatched() {
        let (action, _) = routed(ProfileKind::Temperature, "temperature info");
        assert_eq!(action, "temperature_info");
        let decision = profile(ProfileKind::Temperature).router.route("hello there");
        assert_eq!(decision.state, RouteState::Unmatched);
    }

    #[test]
    fn news_routes() {
        let (action, slots) = routed(ProfileKind::News, "What's the latest news?");
        assert_eq!(action, "top_headlines");
        assert_eq!(slots.text("country"), Some("us"));

        let (_, slots) = routed(ProfileKind::News, "latest news from UK");
        assert_eq!(slots.text("country"), Some("uk"));

        let (action, slots) = routed(ProfileKind::News, "News about climate change");
        assert_eq!(action, "search_news");
        assert_eq!(slots.text("topic"), Some("climate change"));

        let (action, slots) = routed(ProfileKind::News, "Technology news sources");
        assert_eq!(action, "news_sources");
        assert_eq!(slots.text("category"), Some("technology"));

        let (action, slots) = routed(ProfileKind::News, "news sources");
        assert_eq!(action, "news_sources");
        assert!(slots.get("category").is_none());

        let (action, slots) = routed(ProfileKind::News, "News from BBC");
        assert_eq!(action, "news_by_source");
        assert_eq!(slots.text("source"), Some("bbc-news"));

        let (_, slots) = routed(ProfileKind::News, "news from Al Jazeera English?");
        assert_eq!(slots.text("source"), Some("al-jazeera-english"));

        let (action, _) = routed(ProfileKind::News, "help");
        assert_eq!(action, "news_help");
    }

    #[test]
    fn nutrition_routes() {
        let (action, slots) = routed(ProfileKind::Nutrition, "what's the nutrition in salmon?");
        assert_eq!(action, "nutrition_info");
        assert_eq!(slots.text("food"), Some("salmon"));

        let (action, slots) = routed(ProfileKind::Nutrition, "How many calories in an apple?");
        assert_eq!(action, "nutrition_info");
        assert_eq!(slots.text("food"), Some("an apple"));

        let (action, slots) = routed(
            ProfileKind::Nutrition,
            "Calculate calories for chicken, rice, broccoli",
        );
        assert_eq!(action, "total_calories");
        assert_eq!(slots.text("food_list"), Some("chicken, rice, broccoli"));

        let (action, slots) = routed(ProfileKind::Nutrition, "Create a meal plan for weight loss");
        assert_eq!(action, "meal_plan");
        assert_eq!(slots.text("goal"), Some("lose weight"));
        assert_eq!(slots.text("preferences"), Some("balanced diet"));
        assert_eq!(slots.number("meals"), Some(3.0));

        let (_, slots) = routed(
            ProfileKind::Nutrition,
            "Make a vegan meal plan with 5 meals, I'm allergic to peanuts",
        );
        assert_eq!(slots.text("preferences"), Some("vegan"));
        assert_eq!(slots.number("meals"), Some(5.0));
        assert_eq!(slots.text("restrictions"), Some("peanuts"));
    }

    #[test]
    fn creative_routes() {
        let (action, slots) = routed(ProfileKind::Creative, "poem about the ocean");
        assert_eq!(action, "poem");
        assert_eq!(slots.text("theme"), Some("the ocean"));
        assert_eq!(slots.text("style"), Some("free verse"));

        let (action, slots) = routed(ProfileKind::Creative, "Write a haiku about spring");
        assert_eq!(action, "poem");
        assert_eq!(slots.text("theme"), Some("spring"));
        assert_eq!(slots.text("style"), Some("haiku"));

        let (action, slots) = routed(ProfileKind::Creative, "Tell a story about a dragon in a castle");
        assert_eq!(action, "story");
        assert_eq!(slots.text("character"), Some("a kind dragon"));
        assert_eq!(slots.text("setting"), Some("a grand castle"));
    }

    #[test]
    fn bare_poem_falls_back_to_custom_writing() {
        let decision = profile(ProfileKind::Creative).router.route("poem");
        let (action, slots) = decision.matched().unwrap();
        assert_eq!(action, "custom_writing");
        assert_eq!(slots.get("request"), Some(&SlotValue::Text("poem".into())));
        assert_eq!(decision.trace[0].rule, "poem");
        assert_eq!(decision.trace.last().unwrap().rule, "custom_writing_fallback");
    }

    #[test]
    fn concierge_routes() {
        let (action, slots) = routed(ProfileKind::Concierge, "What's the weather like in Paris?");
        assert_eq!(action, "get_weather");
        assert_eq!(slots.text("city"), Some("Paris"));

        let (action, slots) = routed(ProfileKind::Concierge, "Tell me about the movie Inception");
        assert_eq!(action, "get_movie_info");
        assert_eq!(slots.text("movie_title"), Some("Inception"));

        let (action, slots) = routed(ProfileKind::Concierge, "Any news about electric cars?");
        assert_eq!(action, "get_news");
        assert_eq!(slots.text("query"), Some("electric cars"));

        let (_, slots) = routed(ProfileKind::Concierge, "what are today's headlines");
        assert_eq!(slots.text("query"), Some("latest"));
    }

    #[test]
    fn weather_without_city_is_unmatched() {
        let decision = profile(ProfileKind::Concierge).router.route("nice weather today");
        assert_eq!(decision.state, RouteState::Unmatched);
    }
}
