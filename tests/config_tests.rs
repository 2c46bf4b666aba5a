//! Tests for TOML configuration loading and manager construction from config.

use std::io::Write;

use llmrelay::config::{load_config, parse_config};
use llmrelay::{LlmManager, ProviderType};
use tempfile::NamedTempFile;

// ============================================================================
// TOML Parsing Tests
// ============================================================================

#[test]
fn test_parse_full_config() {
    let toml = r#"
[settings]
provider = "anthropic"
system_prompt = "You are a terse assistant."

[[providers]]
type = "anthropic"
model = "claude-3-5-sonnet-20241022"
api_key = "key1"
max_tokens = 500
temperature = 0.3

[[providers]]
type = "ollama"
model = "llama3"
endpoint = "http://localhost:11434"
"#;

    let config = parse_config(toml).unwrap();

    assert_eq!(config.settings.provider.as_deref(), Some("anthropic"));
    assert_eq!(
        config.settings.system_prompt.as_deref(),
        Some("You are a terse assistant.")
    );

    assert_eq!(config.providers.len(), 2);
    assert_eq!(config.providers[0].provider_type, "anthropic");
    assert_eq!(config.providers[0].model, "claude-3-5-sonnet-20241022");
    assert_eq!(config.providers[0].max_tokens, Some(500));
    assert_eq!(config.providers[0].temperature, Some(0.3));
    assert_eq!(config.providers[1].api_key, "");
    assert_eq!(
        config.providers[1].endpoint.as_deref(),
        Some("http://localhost:11434")
    );
}

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[providers]]
type = "mistral"
model = "mistral-large-latest"
api_key = "file-key"
"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.providers.len(), 1);
    assert_eq!(config.providers[0].api_key, "file-key");
}

#[test]
fn test_load_config_missing_file_fails() {
    let result = load_config("/nonexistent/llmrelay.toml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
}

// ============================================================================
// Manager Construction Tests
// ============================================================================

#[test]
fn test_manager_from_config_str() {
    let toml = r#"
[settings]
provider = "openai"

[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "test-key"

[[providers]]
type = "ollama"
model = "llama3"
"#;

    let manager = LlmManager::from_config_str(toml).unwrap();
    assert_eq!(manager.current_provider(), ProviderType::OpenAI);
    assert_eq!(manager.get_model_config().unwrap().model, "gpt-4o");
}

#[test]
fn test_manager_defaults_to_first_provider_entry() {
    let toml = r#"
[[providers]]
type = "ollama"
model = "llama3"

[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "key"
"#;

    let manager = LlmManager::from_config_str(toml).unwrap();
    assert_eq!(manager.current_provider(), ProviderType::Ollama);
}

#[test]
fn test_manager_config_system_prompt_override() {
    let toml = r#"
[settings]
system_prompt = "Répondez en français."

[[providers]]
type = "ollama"
model = "llama3"
"#;

    let manager = LlmManager::from_config_str(toml).unwrap();
    assert_eq!(manager.system_prompt(), "Répondez en français.");
}

#[test]
fn test_manager_from_empty_config_fails() {
    let result = LlmManager::from_config_str("");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("no providers"));
}

#[test]
fn test_manager_switch_after_config_construction() {
    let toml = r#"
[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "k1"

[[providers]]
type = "mistral"
model = "mistral-large-latest"
api_key = "k2"
"#;

    let mut manager = LlmManager::from_config_str(toml).unwrap();
    assert_eq!(manager.current_provider(), ProviderType::OpenAI);

    manager.switch_provider(ProviderType::Mistral).unwrap();
    assert_eq!(manager.get_model_config().unwrap().model, "mistral-large-latest");

    // Google was never configured
    let result = manager.switch_provider(ProviderType::Google);
    assert!(result.is_err());
    assert_eq!(manager.current_provider(), ProviderType::Mistral);
}
