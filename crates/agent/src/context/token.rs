//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token, which is close
//! enough for BPE tokenizers on English text to keep prompts under budget.

use relaybot_core::message::Turn;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.len().div_ceil(4)
}

/// Estimate tokens for a single turn including per-line overhead.
///
/// Each rendered turn costs ~4 tokens for the role label and delimiters.
pub fn estimate_turn_tokens(turn: &Turn) -> usize {
    let overhead = 4;
    overhead + estimate_tokens(&turn.content)
}

/// Estimate tokens for a slice of turns.
pub fn estimate_turns_tokens(turns: &[Turn]) -> usize {
    turns.iter().map(estimate_turn_tokens).sum()
}
