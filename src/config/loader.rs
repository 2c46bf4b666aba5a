//! Configuration file loading and environment variable resolution.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;

use crate::errors::{LlmError, LlmResult};
use crate::providers::ProviderType;
use super::types::Config;

/// Load and parse a TOML configuration file.
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// # Returns
/// * `LlmResult<Config>` - Parsed configuration with environment variables resolved
///
/// # Example
/// ```no_run
/// use llmrelay::config::load_config;
///
/// let config = load_config("llmrelay.toml").unwrap();
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> LlmResult<Config> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        LlmError::ConfigError(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&content)
}

/// Parse a TOML configuration string.
///
/// # Arguments
/// * `content` - TOML configuration string
///
/// # Returns
/// * `LlmResult<Config>` - Parsed configuration with environment variables resolved
pub fn parse_config(content: &str) -> LlmResult<Config> {
    let mut config: Config = toml::from_str(content).map_err(|e| {
        LlmError::ConfigError(format!("Failed to parse TOML: {}", e))
    })?;

    resolve_env_vars(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Resolve environment variable references in the configuration.
///
/// Environment variables are specified using the `${VAR_NAME}` syntax.
/// If a variable is not found, an error is returned with a helpful message.
fn resolve_env_vars(config: &mut Config) -> LlmResult<()> {
    let env_var_pattern = Regex::new(r"\$\{([^}]+)\}").unwrap();

    for (idx, provider) in config.providers.iter_mut().enumerate() {
        match resolve_env_var_string(&provider.api_key, &env_var_pattern) {
            Ok(Some(resolved)) => provider.api_key = resolved,
            Ok(None) => {}
            Err(LlmError::ConfigError(msg)) => {
                return Err(LlmError::ConfigError(format!(
                    "{}\n  → Referenced in providers[{}].api_key",
                    msg, idx
                )));
            }
            Err(e) => return Err(e),
        }

        // Also resolve endpoint if it uses env vars
        if let Some(ref endpoint) = provider.endpoint {
            if let Some(resolved) = resolve_env_var_string(endpoint, &env_var_pattern)? {
                provider.endpoint = Some(resolved);
            }
        }
    }

    Ok(())
}

/// Resolve environment variables in a single string.
/// Returns None if no env vars are present, Some(resolved) if all resolved successfully.
fn resolve_env_var_string(s: &str, pattern: &Regex) -> LlmResult<Option<String>> {
    if !pattern.is_match(s) {
        return Ok(None);
    }

    let mut result = s.to_string();

    for caps in pattern.captures_iter(s) {
        let full_match = caps.get(0).unwrap().as_str();
        let var_name = caps.get(1).unwrap().as_str();

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                return Err(LlmError::ConfigError(format!(
                    "Environment variable '{}' not found\n  \
                     → Set it with: export {}=\"your-value\"",
                    var_name, var_name
                )));
            }
        }
    }

    Ok(Some(result))
}

/// Validate the configuration for consistency.
fn validate_config(config: &Config) -> LlmResult<()> {
    let mut seen = Vec::new();

    for (idx, provider) in config.providers.iter().enumerate() {
        let provider_type = ProviderType::from_str(&provider.provider_type).map_err(|e| {
            LlmError::ConfigError(format!("{} (in providers[{}])", e, idx))
        })?;

        // Each provider may be configured at most once
        if seen.contains(&provider_type) {
            return Err(LlmError::ConfigError(format!(
                "Provider '{}' is configured more than once (providers[{}])",
                provider_type, idx
            )));
        }
        seen.push(provider_type);
    }

    // The initial provider must be one of the configured entries
    if let Some(ref name) = config.settings.provider {
        let initial = ProviderType::from_str(name).map_err(|e| {
            LlmError::ConfigError(format!("{} (in settings.provider)", e))
        })?;
        if !seen.contains(&initial) {
            return Err(LlmError::ConfigError(format!(
                "Initial provider '{}' has no [[providers]] entry",
                initial
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "test-key"
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].api_key, "test-key");
        assert!(config.settings.provider.is_none());
    }

    #[test]
    fn test_env_var_resolution() {
        env::set_var("LLMRELAY_TEST_API_KEY", "resolved-key");

        let toml = r#"
[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "${LLMRELAY_TEST_API_KEY}"
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.providers[0].api_key, "resolved-key");

        env::remove_var("LLMRELAY_TEST_API_KEY");
    }

    #[test]
    fn test_missing_env_var() {
        let toml = r#"
[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "${LLMRELAY_TEST_MISSING_VAR}"
"#;

        let result = parse_config(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("LLMRELAY_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_invalid_provider_type() {
        let toml = r#"
[[providers]]
type = "invalid_provider"
model = "test"
api_key = "key"
"#;

        let result = parse_config(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Unknown provider"));
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let toml = r#"
[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "key1"

[[providers]]
type = "openai"
model = "gpt-4-turbo"
api_key = "key2"
"#;

        let result = parse_config(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn test_unconfigured_initial_provider() {
        let toml = r#"
[settings]
provider = "anthropic"

[[providers]]
type = "openai"
model = "gpt-4o"
api_key = "key"
"#;

        let result = parse_config(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("no [[providers]] entry"));
    }
}
