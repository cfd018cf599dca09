//! Action trait and registry: the deterministic side of the assistant.
//!
//! An action is a named operation with a declared parameter schema
//! (temperature conversion, weather lookup, news search, …). The router
//! fills its parameters from free text and the registry invokes it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use crate::error::RegistryError;

/// Semantic type of a declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Number,
    /// One of a closed set of canonical strings
    Enum(Vec<String>),
}

/// A declared action parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub kind: ParamType,
    pub required: bool,
    /// Raw default value, coerced like extracted text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParamSpec {
    /// A required parameter with no default.
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: true,
            default: None,
        }
    }

    /// An optional parameter, with or without a default.
    pub fn optional(name: &str, kind: ParamType, description: &str, default: Option<&str>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            default: default.map(String::from),
        }
    }

    /// Coerce raw text into a value of this parameter's type.
    ///
    /// Returns `None` for blank text, unparsable or non-finite numbers, and
    /// enum values outside the allowed set.
    pub fn coerce(&self, raw: &str) -> Option<SlotValue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match &self.kind {
            ParamType::String => Some(SlotValue::Text(raw.to_string())),
            ParamType::Number => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(SlotValue::Number),
            ParamType::Enum(allowed) => allowed
                .iter()
                .find(|a| a.eq_ignore_ascii_case(raw))
                .map(|a| SlotValue::Text(a.clone())),
        }
    }

    fn json_schema(&self) -> serde_json::Value {
        let mut schema = match &self.kind {
            ParamType::String => serde_json::json!({ "type": "string" }),
            ParamType::Number => serde_json::json!({ "type": "number" }),
            ParamType::Enum(allowed) => serde_json::json!({ "type": "string", "enum": allowed }),
        };
        schema["description"] = serde_json::json!(self.description);
        if let Some(default) = &self.default {
            schema["default"] = serde_json::json!(default);
        }
        schema
    }
}

/// A typed slot value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Number(f64),
}

impl std::fmt::Display for SlotValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotValue::Text(s) => f.write_str(s),
            SlotValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Parameter values extracted for one routing decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedSlots(BTreeMap<String, SlotValue>);

impl ExtractedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: SlotValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&SlotValue> {
        self.0.get(name)
    }

    /// Text value of a slot. Numbers are not converted.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(SlotValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(SlotValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SlotValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SlotValue)> for ExtractedSlots {
    fn from_iter<I: IntoIterator<Item = (String, SlotValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of an action invocation.
///
/// Upstream problems (missing API key, HTTP errors) are reported as
/// `Failure` with a reason the assistant can explain to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    Success { value: String },
    Failure { reason: String },
}

impl ActionResult {
    pub fn success(value: impl Into<String>) -> Self {
        Self::Success { value: value.into() }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure { reason: reason.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The value or the failure reason.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { value } => value,
            Self::Failure { reason } => reason,
        }
    }
}

/// Serializable description of an action (for listings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters
    pub parameters: serde_json::Value,
}

/// The core Action trait.
///
/// Each deterministic capability (temperature conversion, weather, news,
/// nutrition, movies, creative briefs) implements this trait and is
/// registered once at startup.
#[async_trait]
pub trait Action: Send + Sync {
    /// The unique name of this action (e.g., "celsius_to_fahrenheit").
    fn name(&self) -> &str;

    /// A description of what this action does.
    fn description(&self) -> &str;

    /// Declared parameters, in order.
    fn parameters(&self) -> &[ParamSpec];

    /// Invoke the action with extracted slots.
    async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult;

    /// Look up a declared parameter by name.
    fn parameter(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters().iter().find(|p| p.name == name)
    }

    fn to_definition(&self) -> ActionDefinition {
        let params = self.parameters();
        let properties: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<&str> = params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        ActionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// The set of available actions, in registration order.
///
/// Built at startup and sealed; after `seal()` every `register` fails.
pub struct ActionRegistry {
    actions: Vec<Box<dyn Action>>,
    index: HashMap<String, usize>,
    sealed: bool,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            index: HashMap::new(),
            sealed: false,
        }
    }

    /// Register an action. Names must be unique.
    pub fn register(&mut self, action: Box<dyn Action>) -> Result<(), RegistryError> {
        let name = action.name().to_string();
        if self.sealed {
            return Err(RegistryError::Sealed(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.index.insert(name, self.actions.len());
        self.actions.push(action);
        Ok(())
    }

    /// Close the registry to further registration.
    pub fn seal(&mut self) {
        self.sealed = true;
        tracing::debug!(actions = self.actions.len(), "Action registry sealed");
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Get an action by name.
    pub fn lookup(&self, name: &str) -> Result<&dyn Action, RegistryError> {
        self.index
            .get(name)
            .map(|&i| self.actions[i].as_ref())
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    /// All actions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|a| a.as_ref())
    }

    /// Invoke an action by name.
    pub async fn invoke(&self, name: &str, slots: &ExtractedSlots) -> Result<ActionResult, RegistryError> {
        let action = self.lookup(name)?;
        Ok(action.invoke(slots).await)
    }

    /// Action names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ActionDefinition> {
        self.actions.iter().map(|a| a.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test action for unit tests.
    struct EchoAction {
        name: &'static str,
        params: Vec<ParamSpec>,
    }

    impl EchoAction {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                params: vec![ParamSpec::required("text", ParamType::String, "Text to echo")],
            }
        }
    }

    #[async_trait]
    impl Action for EchoAction {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> &[ParamSpec] {
            &self.params
        }
        async fn invoke(&self, slots: &ExtractedSlots) -> ActionResult {
            match slots.text("text") {
                Some(text) => ActionResult::success(text),
                None => ActionResult::failure("nothing to echo"),
            }
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(EchoAction::named("echo"))).unwrap();
        assert!(registry.lookup("echo").is_ok());
        assert_eq!(
            registry.lookup("nonexistent").err(),
            Some(RegistryError::Unknown("nonexistent".into()))
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(EchoAction::named("echo"))).unwrap();
        let err = registry.register(Box::new(EchoAction::named("echo"))).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn sealed_registry_rejects_registration() {
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(EchoAction::named("a"))).unwrap();
        registry.seal();
        let err = registry.register(Box::new(EchoAction::named("b"))).unwrap_err();
        assert_eq!(err, RegistryError::Sealed("b".into()));
        assert!(registry.is_sealed());
    }

    #[test]
    fn all_preserves_registration_order() {
        let mut registry = ActionRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Box::new(EchoAction::named(name))).unwrap();
        }
        let names: Vec<&str> = registry.all().map(|a| a.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.names(), names);
    }

    #[test]
    fn definition_lists_required_params() {
        let action = EchoAction::named("echo");
        let def = action.to_definition();
        assert_eq!(def.name, "echo");
        assert_eq!(def.parameters["required"][0], "text");
        assert_eq!(def.parameters["properties"]["text"]["type"], "string");
    }

    #[tokio::test]
    async fn registry_invokes_by_name() {
        let mut registry = ActionRegistry::new();
        registry.register(Box::new(EchoAction::named("echo"))).unwrap();

        let mut slots = ExtractedSlots::new();
        slots.insert("text", SlotValue::Text("hello world".into()));
        let result = registry.invoke("echo", &slots).await.unwrap();
        assert_eq!(result, ActionResult::success("hello world"));

        let err = registry.invoke("missing", &slots).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unknown(_)));
    }

    #[test]
    fn coerce_number() {
        let spec = ParamSpec::required("value", ParamType::Number, "Temperature");
        assert_eq!(spec.coerce(" 25 "), Some(SlotValue::Number(25.0)));
        assert_eq!(spec.coerce("-3.5"), Some(SlotValue::Number(-3.5)));
        assert_eq!(spec.coerce("twenty"), None);
        assert_eq!(spec.coerce("NaN"), None);
        assert_eq!(spec.coerce(""), None);
    }

    #[test]
    fn coerce_enum_is_case_insensitive_and_canonical() {
        let spec = ParamSpec::optional(
            "units",
            ParamType::Enum(vec!["metric".into(), "imperial".into()]),
            "Units",
            Some("metric"),
        );
        assert_eq!(spec.coerce("IMPERIAL"), Some(SlotValue::Text("imperial".into())));
        assert_eq!(spec.coerce("kelvin"), None);
    }

    #[test]
    fn action_result_serializes_tagged() {
        let json = serde_json::to_string(&ActionResult::failure("no key")).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("no key"));
    }
}
