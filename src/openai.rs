//! OpenAI client configuration with sensible defaults.

use crate::error::{AssistantError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Environment variable holding the OpenAI credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
///
/// Falls back to a client without a timeout if the HTTP client cannot be built.
pub fn create_client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let client = Client::with_config(OpenAIConfig::default());
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(http_client) => client.with_http_client(http_client),
        Err(e) => {
            tracing::warn!("Failed to build HTTP client with timeout: {}", e);
            client
        }
    }
}

/// Check that the OpenAI credential is present in the environment.
pub fn require_api_key() -> Result<()> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(AssistantError::Config(format!(
            "{} is empty. Set it with: export {}='sk-...'",
            API_KEY_VAR, API_KEY_VAR
        ))),
        Err(_) => Err(AssistantError::Config(format!(
            "{} not set. Set it with: export {}='sk-...'",
            API_KEY_VAR, API_KEY_VAR
        ))),
    }
}
