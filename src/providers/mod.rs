/// Module for the various LLM provider implementations
///
/// This module contains implementations for different LLM backends:
/// - Anthropic (Claude models)
/// - OpenAI (GPT models)
/// - Mistral AI
/// - Google (Gemini models)
/// - Ollama
///
/// Each provider implements a common interface for generating and
/// streaming text completions through its respective API.

pub mod types;
pub mod provider;
pub mod streaming;
pub mod anthropic;
pub mod openai;
pub mod mistral;
pub mod google;
pub mod ollama;

pub use types::{ProviderType, LlmRequest, LlmResponse, TokenUsage, StreamChunk, LlmStream};
pub use provider::{LlmProvider, BaseProvider, create_provider};
pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;
pub use mistral::MistralProvider;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
