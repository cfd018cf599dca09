//! Error types for the Relaybot domain.
//!
//! Each bounded context has its own `thiserror` enum; callers hold the
//! specific type rather than a catch-all.

use thiserror::Error;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Misuse of the action registry. These are programmer errors and are
/// surfaced at startup, never mid-conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Action already registered: {0}")]
    Duplicate(String),

    #[error("Unknown action: {0}")]
    Unknown(String),

    #[error("Registry is sealed, cannot register: {0}")]
    Sealed(String),
}

/// Slot extraction failure. Recoverable: the router skips the rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Missing parameter '{parameter}' for action {action}")]
    MissingParameter { action: String, parameter: String },
}
