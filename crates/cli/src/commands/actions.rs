//! `relaybot actions`: List a profile's actions and their parameters.
//!
//! `--json` prints each action with a JSON Schema of its parameters.

use relaybot_core::action::{ParamSpec, ParamType};

pub fn run(profile: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let profile = super::load_profile(&config, profile.as_deref())?;

    if json {
        let definitions = profile.router.registry().definitions();
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!("Actions for profile '{}' (in registration order):", profile.kind);
    println!();
    for action in profile.router.registry().all() {
        println!("  {}", action.name());
        println!("    {}", action.description());
        for param in action.parameters() {
            println!("    - {}", describe(param));
        }
        println!();
    }
    Ok(())
}

/// One parameter as `name: type, required|optional [= default]`.
pub fn describe(param: &ParamSpec) -> String {
    let kind = match &param.kind {
        ParamType::String => "string".to_string(),
        ParamType::Number => "number".to_string(),
        ParamType::Enum(values) => format!("one of [{}]", values.join(", ")),
    };
    let presence = match (param.required, &param.default) {
        (true, _) => "required".to_string(),
        (false, Some(default)) => format!("optional = {default:?}"),
        (false, None) => "optional".to_string(),
    };
    format!("{}: {kind}, {presence} ({})", param.name, param.description)
}
