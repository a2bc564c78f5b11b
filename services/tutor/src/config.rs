use pathfinder_core::llm_client::DEFAULT_MODEL;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported chat-completion providers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    /// Environment variable holding this provider's API key.
    pub fn key_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => DEFAULT_MODEL,
            Provider::Gemini => "gemini-2.0-flash",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub log_level: Level,
    pub prompts_path: Option<PathBuf>,
    pub round_pause: Duration,
    pub request_timeout: Option<Duration>,
    pub lenient_errors: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not a supported provider", other),
                ));
            }
        };

        let api_key = std::env::var(provider.key_var())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar(provider.key_var().to_string()))?;

        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| provider.default_api_base().to_string());

        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let round_pause = match std::env::var("ROUND_PAUSE_MS") {
            Ok(ms) => Duration::from_millis(parse_var("ROUND_PAUSE_MS", &ms)?),
            Err(_) => Duration::from_secs(1),
        };

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Some(Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &secs)?)),
            Err(_) => None,
        };

        let lenient_errors = match std::env::var("LENIENT_ERRORS") {
            Ok(flag) => parse_var("LENIENT_ERRORS", &flag.to_lowercase())?,
            Err(_) => false,
        };

        Ok(Self {
            provider,
            api_key,
            api_base,
            chat_model,
            log_level,
            prompts_path,
            round_pause,
            request_timeout,
            lenient_errors,
        })
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("'{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("LLM_PROVIDER");
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("GEMINI_API_KEY");
            env::remove_var("OPENAI_API_BASE");
            env::remove_var("CHAT_MODEL");
            env::remove_var("RUST_LOG");
            env::remove_var("PROMPTS_PATH");
            env::remove_var("ROUND_PAUSE_MS");
            env::remove_var("REQUEST_TIMEOUT_SECS");
            env::remove_var("LENIENT_ERRORS");
        }
    }

    #[test]
    fn test_config_error_display() {
        let missing_var = ConfigError::MissingVar("TEST_VAR".to_string());
        assert_eq!(
            format!("{}", missing_var),
            "Missing environment variable: TEST_VAR"
        );

        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_minimal_openai() {
        clear_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "test-openai-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key, "test-openai-key");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.prompts_path, None);
        assert_eq!(config.round_pause, Duration::from_secs(1));
        assert_eq!(config.request_timeout, None);
        assert!(!config.lenient_errors);
    }

    #[test]
    #[serial]
    fn test_config_from_env_gemini_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "Gemini");
            env::set_var("GEMINI_API_KEY", "test-gemini-key");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key, "test-gemini-key");
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert!(config.api_base.contains("generativelanguage.googleapis.com"));
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "custom-openai-key");
            env::set_var("OPENAI_API_BASE", "http://localhost:11434/v1");
            env::set_var("CHAT_MODEL", "gpt-4o-mini");
            env::set_var("RUST_LOG", "debug");
            env::set_var("PROMPTS_PATH", "/custom/prompts");
            env::set_var("ROUND_PAUSE_MS", "0");
            env::set_var("REQUEST_TIMEOUT_SECS", "30");
            env::set_var("LENIENT_ERRORS", "TRUE");
        }

        let config = Config::from_env().expect("Config should load successfully");

        assert_eq!(config.api_base, "http://localhost:11434/v1");
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.prompts_path, Some(PathBuf::from("/custom/prompts")));
        assert_eq!(config.round_pause, Duration::ZERO);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert!(config.lenient_errors);
    }

    #[test]
    #[serial]
    fn test_config_missing_openai_key() {
        clear_env_vars();

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::MissingVar(var) => assert_eq!(var, "OPENAI_API_KEY"),
            _ => panic!("Expected MissingVar for OPENAI_API_KEY"),
        }
    }

    #[test]
    #[serial]
    fn test_config_blank_key_counts_as_missing() {
        clear_env_vars();
        unsafe {
            env::set_var("OPENAI_API_KEY", "   ");
        }

        assert!(matches!(
            Config::from_env().unwrap_err(),
            ConfigError::MissingVar(_)
        ));
    }

    #[test]
    #[serial]
    fn test_config_unknown_provider() {
        clear_env_vars();
        unsafe {
            env::set_var("LLM_PROVIDER", "llama");
            env::set_var("OPENAI_API_KEY", "test-openai-key");
        }

        let err = Config::from_env().unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "LLM_PROVIDER"),
            _ => panic!("Expected InvalidValue for LLM_PROVIDER"),
        }
    }

    #[test]
    #[serial]
    fn test_config_invalid_numbers_and_levels() {
        for (var, value) in [
            ("ROUND_PAUSE_MS", "soon"),
            ("REQUEST_TIMEOUT_SECS", "-1"),
            ("LENIENT_ERRORS", "maybe"),
            ("RUST_LOG", "not-a-level"),
        ] {
            clear_env_vars();
            unsafe {
                env::set_var("OPENAI_API_KEY", "test-openai-key");
                env::set_var(var, value);
            }

            match Config::from_env().unwrap_err() {
                ConfigError::InvalidValue(name, _) => assert_eq!(name, var),
                other => panic!("Expected InvalidValue for {var}, got {other:?}"),
            }
        }
    }
}
