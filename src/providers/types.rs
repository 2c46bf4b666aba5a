use std::pin::Pin;
use std::str::FromStr;

use futures::Stream;
use serde::{Serialize, Deserialize};

use crate::errors::{LlmError, LlmResult};

/// The closed set of supported LLM backends.
///
/// Provider names originating from external input (config files, CLI
/// arguments) enter through [`FromStr`], which rejects anything outside
/// this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    Anthropic,
    OpenAI,
    Mistral,
    Google,
    Ollama,
}

impl ProviderType {
    /// Every supported provider, in registry order.
    pub const ALL: [ProviderType; 5] = [
        ProviderType::Anthropic,
        ProviderType::OpenAI,
        ProviderType::Mistral,
        ProviderType::Google,
        ProviderType::Ollama,
    ];

    /// The lowercase registry key for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Anthropic => "anthropic",
            ProviderType::OpenAI => "openai",
            ProviderType::Mistral => "mistral",
            ProviderType::Google => "google",
            ProviderType::Ollama => "ollama",
        }
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    fn from_str(s: &str) -> LlmResult<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderType::Anthropic),
            "openai" => Ok(ProviderType::OpenAI),
            "mistral" => Ok(ProviderType::Mistral),
            "google" => Ok(ProviderType::Google),
            "ollama" => Ok(ProviderType::Ollama),
            _ => Err(LlmError::InvalidProvider(format!(
                "Unknown provider '{}'. Valid providers: {}",
                s,
                ProviderType::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prompt pair merged with the active provider's model configuration,
/// ready to be forwarded to a provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single fragment of a streamed response.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// Text fragment produced by the provider (may be empty on the final chunk)
    pub content: String,
    /// Model identifier, when the provider reports it mid-stream
    pub model: Option<String>,
    /// Whether the provider signalled the end of the response
    pub is_final: bool,
    /// Token usage, typically only present on the final chunk
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    /// A plain content chunk with no metadata.
    pub fn content(text: String) -> Self {
        StreamChunk {
            content: text,
            model: None,
            is_final: false,
            usage: None,
        }
    }
}

/// A finite, non-restartable sequence of response chunks.
///
/// One chunk is produced per poll; nothing is buffered or reordered
/// between the provider and the caller.
pub type LlmStream = Pin<Box<dyn Stream<Item = LlmResult<StreamChunk>> + Send>>;
