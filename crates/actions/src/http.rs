//! Shared upstream HTTP client for data actions.
//!
//! Every network-backed action goes through [`Upstream::get_json`] so that
//! timeouts, status handling and error wording are the same everywhere.

use std::time::Duration;
use tracing::{debug, warn};

/// Why an upstream call failed.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} returned HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("could not reach {service}: {reason}")]
    Transport { service: String, reason: String },

    #[error("unexpected response from {service}: {reason}")]
    Decode { service: String, reason: String },
}

/// A cloneable JSON-over-HTTP client.
#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
}

impl Upstream {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// GET `url` with query parameters and decode the body as JSON.
    pub async fn get_json(
        &self,
        service: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, UpstreamError> {
        debug!(service, url, "Calling upstream");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(service, status = status.as_u16(), "Upstream returned error");
            return Err(UpstreamError::Status {
                service: service.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| UpstreamError::Decode {
                service: service.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Failure text for an action whose API key is not configured.
pub fn missing_key(env_var: &str) -> String {
    format!("{env_var} is not configured. Add it to your environment or the [actions] section of config.toml.")
}

/// Truncate to `max` characters, appending "..." when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
