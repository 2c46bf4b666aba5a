use std::path::Path;

use log::debug;

use crate::config::{self, Config};
use crate::constants;
use crate::errors::{LlmError, LlmResult};
use crate::relay::catalog::{ModelCatalog, ModelConfig};
use crate::providers::{create_provider, LlmProvider, LlmRequest, LlmStream, ProviderType};

/// Facade over the supported LLM backends.
///
/// The manager owns exactly one provider instance at a time, selected by
/// [`ProviderType`], and forwards prompts to it merged with the model
/// configuration from its catalog. Switching providers replaces the owned
/// instance wholesale.
pub struct LlmManager {
    current: ProviderType,
    instance: Box<dyn LlmProvider + Send + Sync>,
    catalog: ModelCatalog,
    system_prompt: String,
}

impl std::fmt::Debug for LlmManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmManager")
            .field("current", &self.current)
            .field("catalog", &self.catalog)
            .field("system_prompt", &self.system_prompt)
            .finish_non_exhaustive()
    }
}

impl LlmManager {
    /// Creates a manager with the given initial provider.
    ///
    /// Fails with [`LlmError::MissingConfig`] before any provider is
    /// instantiated when the catalog has no entry for `provider`.
    pub fn new(provider: ProviderType, catalog: ModelCatalog) -> LlmResult<Self> {
        let instance = Self::build_instance(&catalog, provider)?;
        Ok(LlmManager {
            current: provider,
            instance,
            catalog,
            system_prompt: constants::DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Creates a manager around a caller-supplied provider implementation.
    ///
    /// Useful for custom or self-hosted backends that implement
    /// [`LlmProvider`] outside the built-in set; `provider` determines the
    /// name the instance is registered and benchmarked under.
    pub fn with_instance(
        provider: ProviderType,
        instance: Box<dyn LlmProvider + Send + Sync>,
        catalog: ModelCatalog,
    ) -> Self {
        LlmManager {
            current: provider,
            instance,
            catalog,
            system_prompt: constants::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Creates a manager from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> LlmResult<Self> {
        Self::from_config(config::load_config(path)?)
    }

    /// Creates a manager from a TOML configuration string.
    pub fn from_config_str(content: &str) -> LlmResult<Self> {
        Self::from_config(config::parse_config(content)?)
    }

    /// Creates a manager from a parsed [`Config`].
    ///
    /// The initial provider is `settings.provider` when present, otherwise
    /// the first `[[providers]]` entry.
    pub fn from_config(config: Config) -> LlmResult<Self> {
        if config.providers.is_empty() {
            return Err(LlmError::ConfigError(
                "Configuration defines no providers".to_string(),
            ));
        }

        let mut catalog = ModelCatalog::new();
        for entry in &config.providers {
            let provider: ProviderType = entry.provider_type.parse()?;
            let mut model_config = ModelConfig::new(entry.model.clone())
                .with_api_key(entry.api_key.clone());
            model_config.max_tokens = entry.max_tokens;
            model_config.temperature = entry.temperature;
            model_config.endpoint = entry.endpoint.clone();
            catalog.insert(provider, model_config);
        }

        let initial: ProviderType = match &config.settings.provider {
            Some(name) => name.parse()?,
            None => config.providers[0].provider_type.parse()?,
        };

        let mut manager = Self::new(initial, catalog)?;
        if let Some(system_prompt) = config.settings.system_prompt {
            manager.system_prompt = system_prompt;
        }
        Ok(manager)
    }

    /// The currently active provider.
    pub fn current_provider(&self) -> ProviderType {
        self.current
    }

    /// The default system prompt used when none is given per call.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Replaces the default system prompt.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    /// Switches the active provider, replacing the owned instance.
    ///
    /// The swap is atomic: the replacement instance is fully constructed
    /// before either field is assigned, so on failure the previous
    /// provider remains installed and usable.
    pub fn switch_provider(&mut self, provider: ProviderType) -> LlmResult<()> {
        let instance = Self::build_instance(&self.catalog, provider)?;
        debug!("Switching active provider from {} to {}", self.current, provider);
        self.instance = instance;
        self.current = provider;
        Ok(())
    }

    /// The model configuration of the active provider.
    pub fn get_model_config(&self) -> LlmResult<&ModelConfig> {
        self.catalog.get(self.current).ok_or_else(|| {
            LlmError::MissingConfig(format!(
                "No model configuration for provider '{}'",
                self.current
            ))
        })
    }

    /// Generates a response for `prompt` using the default system prompt.
    ///
    /// Returns the provider's response string unmodified.
    pub async fn generate_response(&self, prompt: &str) -> LlmResult<String> {
        let system_prompt = self.system_prompt.clone();
        self.generate_with_system(&system_prompt, prompt).await
    }

    /// Generates a response for `prompt` with an explicit system prompt.
    pub async fn generate_with_system(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> LlmResult<String> {
        let request = self.build_request(system_prompt, prompt)?;
        let response = self.instance.generate(&request).await?;
        Ok(response.content)
    }

    /// Streams a response for `prompt` using the default system prompt.
    ///
    /// The provider's chunk sequence is re-exposed unchanged: no chunk is
    /// buffered, dropped, duplicated, or reordered by this layer.
    pub async fn stream_response(&self, prompt: &str) -> LlmResult<LlmStream> {
        let system_prompt = self.system_prompt.clone();
        self.stream_with_system(&system_prompt, prompt).await
    }

    /// Streams a response for `prompt` with an explicit system prompt.
    pub async fn stream_with_system(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> LlmResult<LlmStream> {
        let request = self.build_request(system_prompt, prompt)?;
        self.instance.generate_stream(&request).await
    }

    /// Merges the active provider's model configuration with a prompt pair.
    fn build_request(&self, system_prompt: &str, prompt: &str) -> LlmResult<LlmRequest> {
        let config = self.get_model_config()?;
        Ok(LlmRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: prompt.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn build_instance(
        catalog: &ModelCatalog,
        provider: ProviderType,
    ) -> LlmResult<Box<dyn LlmProvider + Send + Sync>> {
        let config = catalog.get(provider).ok_or_else(|| {
            LlmError::MissingConfig(format!(
                "No model configuration for provider '{}'",
                provider
            ))
        })?;
        Ok(create_provider(
            provider,
            config.api_key.clone(),
            config.endpoint.clone(),
        ))
    }
}
