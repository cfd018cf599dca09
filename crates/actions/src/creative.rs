//! Writing-brief actions.
//!
//! A brief action does not call out to any service: it fills a prompt
//! template with the extracted slots and returns the rendered brief, which
//! the composer then hands to the generative backend. Templates use
//! `{{$name}}` placeholders.

use async_trait::async_trait;
use relaybot_core::action::{Action, ActionResult, ExtractedSlots, ParamSpec, ParamType};

const POEM_TEMPLATE: &str = "You are a talented poet who writes beautiful, creative poems based on user themes.

Create a poem about: {{$theme}}

Guidelines:
- Make it emotionally engaging and vivid
- Use creative metaphors and imagery
- Write it in the requested style
- Length should be 12-20 lines
- Make it memorable and meaningful

Theme: {{$theme}}
Style: {{$style}}";

const STORY_TEMPLATE: &str = "You are a wonderful children's story writer who creates engaging, age-appropriate stories.

Write a children's story about: {{$topic}}

Guidelines:
- Make it suitable for ages 5-10
- Include a positive message or lesson
- Use simple, engaging language
- Create memorable characters
- Include some dialogue
- Make it fun and imaginative
- Length: 200-300 words

Topic: {{$topic}}
Main character: {{$character}}
Setting: {{$setting}}";

const CUSTOM_WRITING_TEMPLATE: &str = "You are a creative writing assistant who helps with various forms of creative expression.

Writing request: {{$request}}

Create engaging, original content that:
- Captures the reader's attention
- Uses vivid descriptions and engaging language
- Follows appropriate structure for the format
- Is creative and imaginative
- Meets the specific requirements mentioned

Additional details: {{$details}}";

const MEAL_PLAN_TEMPLATE: &str = "You are a professional nutritionist and meal planning expert.

Create a balanced meal plan based on the following requirements:
- Goal: {{$goal}}
- Dietary preferences: {{$preferences}}
- Number of meals: {{$meals}}
- Any restrictions: {{$restrictions}}

Create a detailed meal plan that includes:
1. Breakfast, lunch, dinner (and snacks if requested)
2. Specific food items and portions
3. Variety and balance
4. Consideration of the stated goal and preferences

Make it practical and achievable. List specific ingredients for each meal.";

/// An action that renders a prompt template from its slots.
pub struct BriefAction {
    name: &'static str,
    description: &'static str,
    template: &'static str,
    params: Vec<ParamSpec>,
}

impl BriefAction {
    pub fn new(
        name: &'static str,
        description: &'static str,
        template: &'static str,
        params: Vec<ParamSpec>,
    ) -> Self {
        Self {
            name,
            description,
            template,
            params,
        }
    }

    /// `poem(theme, style = "free verse")`
    pub fn poem() -> Self {
        Self::new(
            "poem",
            "Writes a poem about a theme in a chosen style",
            POEM_TEMPLATE,
            vec![
                ParamSpec::required("theme", ParamType::String, "What the poem is about"),
                ParamSpec::optional(
                    "style",
                    ParamType::Enum(vec![
                        "free verse".into(),
                        "haiku".into(),
                        "rhyming verse".into(),
                        "sonnet".into(),
                    ]),
                    "Poetic form",
                    Some("free verse"),
                ),
            ],
        )
    }

    /// `story(topic, character, setting)`
    pub fn story() -> Self {
        Self::new(
            "story",
            "Writes a children's story",
            STORY_TEMPLATE,
            vec![
                ParamSpec::required("topic", ParamType::String, "What the story is about"),
                ParamSpec::optional(
                    "character",
                    ParamType::String,
                    "Main character",
                    Some("a friendly animal"),
                ),
                ParamSpec::optional(
                    "setting",
                    ParamType::String,
                    "Where the story takes place",
                    Some("a magical forest"),
                ),
            ],
        )
    }

    /// `custom_writing(request, details)`: free-form creative request.
    pub fn custom_writing() -> Self {
        Self::new(
            "custom_writing",
            "Creates custom creative content from a free-form request",
            CUSTOM_WRITING_TEMPLATE,
            vec![
                ParamSpec::required("request", ParamType::String, "The writing request"),
                ParamSpec::optional(
                    "details",
                    ParamType::String,
                    "Extra guidance",
                    Some("User requested custom creative content"),
                ),
            ],
        )
    }

    /// `meal_plan(goal, preferences, meals = 3, restrictions = none)`
    pub fn meal_plan() -> Self {
        Self::new(
            "meal_plan",
            "Creates a personalised meal plan",
            MEAL_PLAN_TEMPLATE,
            vec![
                ParamSpec::optional(
                    "goal",
                    ParamType::String,
                    "Health goal",
                    Some("maintain healthy weight"),
                ),
                ParamSpec::optional(
                    "preferences",
                    ParamType::String,
                    "Dietary preferences",
                    Some("balanced diet"),
                ),
                ParamSpec::optional("meals", ParamType::Number, "Meals per day", Some("3")),
                ParamSpec::optional(
                    "restrictions",
                    ParamType::String,
                    "Allergies or restrictions",
                    Some("none"),
                ),
            ],
        )
    }

    /// Fill every `{{$param}}` from the slots, then the declared default.
    pub fn render(&self, slots: &ExtractedSlots) -> String {
        self.params.iter().fold(self.template.to_string(), |text, param| {
            let value = slots
                .get(&param.name)
                .map(|v| v.to_string())
                .or_else(|| param.default.clone())
                .unwrap_or_default();
            text.replace(&format!("{{{{${}}}}}", param.name), &value)
        })
    }
}

#[async_trait]
impl Action for BriefAction {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
        if let Some(missing) = self
            .params
            .iter()
            .find(|p| p.required && slots.get(&p.name).is_none())
        {
            return ActionResult::failure(format!("Missing {} for {}", missing.name, self.name));
        }
        ActionResult::success(self.render(slots))
    }
}
