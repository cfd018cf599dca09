//! Slot extraction: fill an action's declared parameters from raw text.

use relaybot_core::action::{Action, ExtractedSlots};
use relaybot_core::error::SlotError;

use crate::rule::SlotRule;

/// Stateless parameter extractor.
///
/// For each declared parameter, in declaration order: the rule's capture
/// patterns, then its keyword table, then the declared default. A required
/// parameter left without a value is a [`SlotError::MissingParameter`]; an
/// optional one is simply absent. No I/O, and the same input always yields
/// the same slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotExtractor;

impl SlotExtractor {
    pub fn extract(
        &self,
        raw_text: &str,
        action: &dyn Action,
        rules: &[SlotRule],
    ) -> Result<ExtractedSlots, SlotError> {
        let lowered = raw_text.to_lowercase();
        let mut slots = ExtractedSlots::new();

        for spec in action.parameters() {
            let found = rules
                .iter()
                .filter(|rule| rule.parameter() == spec.name)
                .find_map(|rule| rule.find(raw_text, &lowered, spec))
                .or_else(|| spec.default.as_deref().and_then(|d| spec.coerce(d)));

            match found {
                Some(value) => slots.insert(spec.name.clone(), value),
                None if spec.required => {
                    return Err(SlotError::MissingParameter {
                        action: action.name().to_string(),
                        parameter: spec.name.clone(),
                    });
                }
                None => {}
            }
        }

        Ok(slots)
    }
}
