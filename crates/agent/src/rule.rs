//! Match rules: when an action applies and where its parameters come from.
//!
//! A [`MatchRule`] pairs a [`Trigger`] (evaluated against the lower-cased
//! input) with one [`SlotRule`] per parameter it knows how to fill. Rules
//! are plain data; the [`IntentRouter`](crate::router::IntentRouter)
//! evaluates them in order.

use regex::{Regex, RegexBuilder};
use relaybot_core::action::{ParamSpec, SlotValue};
use relaybot_core::error::RegistryError;

/// Errors raised while building or validating a rule table.
///
/// All of these are startup errors.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Rule '{rule}' fills '{parameter}', which {action} does not declare")]
    UnknownParameter {
        rule: String,
        action: String,
        parameter: String,
    },
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A predicate over the lower-cased input.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Always satisfied
    Always,
    /// Substring match
    Keyword(String),
    /// Regular expression match
    Pattern(Regex),
    /// Satisfied if any child is
    Any(Vec<Trigger>),
    /// Satisfied if every child is
    All(Vec<Trigger>),
}

impl Trigger {
    pub fn keyword(keyword: &str) -> Self {
        Self::Keyword(keyword.to_lowercase())
    }

    /// Satisfied when any of `keywords` occurs.
    pub fn any_keyword(keywords: &[&str]) -> Self {
        Self::Any(keywords.iter().map(|k| Self::keyword(k)).collect())
    }

    pub fn pattern(pattern: &str) -> Result<Self, RuleError> {
        compile(pattern, false).map(Self::Pattern)
    }

    pub fn all(triggers: Vec<Trigger>) -> Self {
        Self::All(triggers)
    }

    pub fn any(triggers: Vec<Trigger>) -> Self {
        Self::Any(triggers)
    }

    /// Evaluate against already lower-cased text.
    pub fn is_satisfied(&self, lowered: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Keyword(keyword) => lowered.contains(keyword.as_str()),
            Self::Pattern(re) => re.is_match(lowered),
            Self::Any(children) => children.iter().any(|t| t.is_satisfied(lowered)),
            Self::All(children) => children.iter().all(|t| t.is_satisfied(lowered)),
        }
    }
}

/// How one parameter is filled from raw text.
///
/// Strategies run in order: capture patterns (first group of the first
/// pattern that matches and coerces), then the keyword table (first keyword
/// present). The declared default is applied by the extractor.
#[derive(Debug, Clone)]
pub struct SlotRule {
    parameter: String,
    captures: Vec<Regex>,
    keywords: Vec<(String, String)>,
    transform: Option<fn(&str) -> String>,
}

impl SlotRule {
    pub fn new(parameter: &str) -> Self {
        Self {
            parameter: parameter.to_string(),
            captures: Vec::new(),
            keywords: Vec::new(),
            transform: None,
        }
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Add a case-insensitive capture pattern. Its first participating
    /// group (or the whole match, if it has none) is the raw value.
    pub fn capture(mut self, pattern: &str) -> Result<Self, RuleError> {
        self.captures.push(compile(pattern, true)?);
        Ok(self)
    }

    /// Map `keyword` (if present in the input) to a canonical `value`.
    pub fn keyword(mut self, keyword: &str, value: &str) -> Self {
        self.keywords.push((keyword.to_lowercase(), value.to_string()));
        self
    }

    pub fn keywords(self, table: &[(&str, &str)]) -> Self {
        table
            .iter()
            .fold(self, |rule, (keyword, value)| rule.keyword(keyword, value))
    }

    /// Post-process captured text (not keyword values) before coercion.
    pub fn map(mut self, transform: fn(&str) -> String) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Strategies (a) and (b). `None` when neither produced a valid value.
    pub fn find(&self, raw: &str, lowered: &str, spec: &ParamSpec) -> Option<SlotValue> {
        let captured = self.captures.iter().find_map(|re| {
            let caps = re.captures(raw)?;
            let text = caps
                .iter()
                .skip(1)
                .flatten()
                .next()
                .or_else(|| caps.get(0))?
                .as_str()
                .trim();
            let text = match self.transform {
                Some(transform) => transform(text),
                None => text.to_string(),
            };
            spec.coerce(&text)
        });
        if captured.is_some() {
            return captured;
        }

        self.keywords
            .iter()
            .filter(|(keyword, _)| lowered.contains(keyword.as_str()))
            .find_map(|(_, value)| spec.coerce(value))
    }
}

/// A trigger plus slot rules, targeting one action.
#[derive(Debug, Clone)]
pub struct MatchRule {
    label: String,
    action: String,
    trigger: Trigger,
    slots: Vec<SlotRule>,
}

impl MatchRule {
    /// A rule for `action`, labelled with the action name until renamed.
    pub fn new(action: &str) -> Self {
        Self {
            label: action.to_string(),
            action: action.to_string(),
            trigger: Trigger::Always,
            slots: Vec::new(),
        }
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn when(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn slot(mut self, rule: SlotRule) -> Self {
        self.slots.push(rule);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn slots(&self) -> &[SlotRule] {
        &self.slots
    }
}
