use std::collections::HashMap;
use std::env;

use crate::constants;
use crate::providers::ProviderType;

/// Model configuration record for a single provider.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model identifier (e.g. "gpt-4o", "claude-3-5-sonnet-20241022")
    pub model: String,
    /// API key for authentication (may be empty for local backends)
    pub api_key: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Endpoint override (self-hosted or proxied deployments)
    pub endpoint: Option<String>,
}

impl ModelConfig {
    /// Creates a configuration for the given model with no key, limits,
    /// or endpoint override.
    pub fn new(model: impl Into<String>) -> Self {
        ModelConfig {
            model: model.into(),
            api_key: String::new(),
            max_tokens: None,
            temperature: None,
            endpoint: None,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the `max_tokens` limit.
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Sets an endpoint override.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// The static mapping from provider to its model configuration.
///
/// Consulted read-only by the manager; lookups for providers without an
/// entry fail at the manager level with a missing-configuration error.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: HashMap<ProviderType, ModelConfig>,
}

impl ModelCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        ModelCatalog { entries: HashMap::new() }
    }

    /// Builds a catalog from conventional environment variables.
    ///
    /// A provider is included when its API key variable is set:
    /// `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, `MISTRAL_API_KEY`, and
    /// `GEMINI_API_KEY` (or `GOOGLE_API_KEY`). Ollama needs no key and is
    /// always included, pointing at the default local endpoint. Each entry
    /// uses the provider's default model.
    pub fn from_env() -> Self {
        let mut catalog = ModelCatalog::new();

        if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
            catalog.insert(
                ProviderType::Anthropic,
                ModelConfig::new(constants::ANTHROPIC_DEFAULT_MODEL).with_api_key(key),
            );
        }
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            catalog.insert(
                ProviderType::OpenAI,
                ModelConfig::new(constants::OPENAI_DEFAULT_MODEL).with_api_key(key),
            );
        }
        if let Ok(key) = env::var("MISTRAL_API_KEY") {
            catalog.insert(
                ProviderType::Mistral,
                ModelConfig::new(constants::MISTRAL_DEFAULT_MODEL).with_api_key(key),
            );
        }
        if let Ok(key) = env::var("GEMINI_API_KEY").or_else(|_| env::var("GOOGLE_API_KEY")) {
            catalog.insert(
                ProviderType::Google,
                ModelConfig::new(constants::GOOGLE_DEFAULT_MODEL).with_api_key(key),
            );
        }
        catalog.insert(
            ProviderType::Ollama,
            ModelConfig::new(constants::OLLAMA_DEFAULT_MODEL),
        );

        catalog
    }

    /// Adds or replaces the configuration for a provider.
    pub fn insert(&mut self, provider: ProviderType, config: ModelConfig) {
        self.entries.insert(provider, config);
    }

    /// Chaining variant of [`insert`](Self::insert).
    pub fn with_model(mut self, provider: ProviderType, config: ModelConfig) -> Self {
        self.insert(provider, config);
        self
    }

    /// Looks up the configuration for a provider.
    pub fn get(&self, provider: ProviderType) -> Option<&ModelConfig> {
        self.entries.get(&provider)
    }

    /// Whether the catalog has an entry for the provider.
    pub fn contains(&self, provider: ProviderType) -> bool {
        self.entries.contains_key(&provider)
    }

    /// Providers with a catalog entry.
    pub fn providers(&self) -> impl Iterator<Item = ProviderType> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
