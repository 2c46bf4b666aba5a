//! Configuration types for TOML-based configuration.
//!
//! These types map directly to the TOML configuration file structure.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings for the manager.
    #[serde(default)]
    pub settings: Settings,

    /// Provider model configurations.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// Global settings for the manager.
#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    /// Initial active provider. Defaults to the first `[[providers]]` entry.
    pub provider: Option<String>,

    /// Default system prompt used when none is given per call.
    pub system_prompt: Option<String>,
}

/// Model configuration for a single provider.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "anthropic", "openai", "mistral", "google", or "ollama".
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model identifier (e.g. "gpt-4o", "claude-3-5-sonnet-20241022").
    pub model: String,

    /// API key (supports environment variable syntax: "${VAR_NAME}").
    #[serde(default)]
    pub api_key: String,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Custom endpoint URL (self-hosted or proxied deployments).
    pub endpoint: Option<String>,
}
