use crate::providers::types::{LlmRequest, LlmResponse, LlmStream, ProviderType};
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::openai::OpenAIProvider;
use crate::providers::mistral::MistralProvider;
use crate::providers::google::GoogleProvider;
use crate::providers::ollama::OllamaProvider;
use crate::errors::LlmResult;

use async_trait::async_trait;
use std::time::Duration;
use reqwest::Client;

/// Common interface implemented by every LLM backend.
///
/// The manager owns exactly one object implementing this trait at a time
/// and forwards prompts to it without transformation.
#[async_trait]
pub trait LlmProvider {
    /// Generate a complete response for the given request
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;
    /// Generate a lazy stream of response chunks for the given request
    async fn generate_stream(&self, request: &LlmRequest) -> LlmResult<LlmStream>;
    /// Get the registry name of this provider
    fn get_name(&self) -> &str;
}

/// Base provider implementation with state shared across all backends:
/// HTTP client with timeout, API key, and the resolved endpoint URL.
pub struct BaseProvider {
    name: String,
    client: Client,
    api_key: String,
    endpoint: String,
}

impl BaseProvider {
    /// Create a new BaseProvider with the given identity and endpoint
    pub fn new(name: String, api_key: String, endpoint: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { name, client, api_key, endpoint }
    }

    /// Get the HTTP client instance
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the endpoint URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the provider name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Construct the provider implementation for a [`ProviderType`].
///
/// This is the compile-time-checked counterpart of a name-keyed registry:
/// unknown names are rejected earlier, at `ProviderType::from_str`.
///
/// # Parameters
/// * `provider` - Which backend to construct
/// * `api_key` - API key for authentication (may be empty for Ollama)
/// * `endpoint` - Optional endpoint override; defaults per provider
pub fn create_provider(
    provider: ProviderType,
    api_key: String,
    endpoint: Option<String>,
) -> Box<dyn LlmProvider + Send + Sync> {
    match provider {
        ProviderType::Anthropic => Box::new(AnthropicProvider::new(api_key, endpoint)),
        ProviderType::OpenAI => Box::new(OpenAIProvider::new(api_key, endpoint)),
        ProviderType::Mistral => Box::new(MistralProvider::new(api_key, endpoint)),
        ProviderType::Google => Box::new(GoogleProvider::new(api_key, endpoint)),
        ProviderType::Ollama => Box::new(OllamaProvider::new(api_key, endpoint)),
    }
}
