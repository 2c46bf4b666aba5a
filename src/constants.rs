// General
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// OpenAI
pub const OPENAI_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

// Anthropic
pub const ANTHROPIC_API_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

// Mistral
pub const MISTRAL_API_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
pub const MISTRAL_DEFAULT_MODEL: &str = "mistral-large-latest";

// Google
pub const GOOGLE_API_ENDPOINT_PREFIX: &str = "https://generativelanguage.googleapis.com";
pub const GOOGLE_DEFAULT_MODEL: &str = "gemini-1.5-pro";

// Ollama
pub const OLLAMA_API_ENDPOINT: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";
