//! `relaybot route`: Dry-run routing with the per-rule trace.

use relaybot_agent::{RouteDecision, RouteState, RuleOutcome};

pub fn run(
    profile: Option<String>,
    text: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let profile = super::load_profile(&config, profile.as_deref())?;
    let decision = profile.router.route(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        println!("Profile: {}", profile.kind);
        println!("Input:   {text:?}");
        println!();
        print!("{}", render(&decision));
    }
    Ok(())
}

/// Human-readable trace, one line per evaluated rule.
pub fn render(decision: &RouteDecision) -> String {
    let mut out = String::new();
    for step in &decision.trace {
        let outcome = match &step.outcome {
            RuleOutcome::NotTriggered => "not triggered".to_string(),
            RuleOutcome::MissingParameter { parameter } => {
                format!("triggered, missing '{parameter}'")
            }
            RuleOutcome::Matched => "matched".to_string(),
        };
        out.push_str(&format!("  {:<28} -> {:<22} {outcome}\n", step.rule, step.action));
    }
    out.push('\n');
    match &decision.state {
        RouteState::Matched { action, slots, .. } => {
            out.push_str(&format!("Matched: {action}\n"));
            for (name, value) in slots.iter() {
                out.push_str(&format!("  {name} = {value}\n"));
            }
        }
        _ => out.push_str("Unmatched: the message goes to the model without an action result\n"),
    }
    out
}
