//! Configuration types.
//!
//! Everything is read from the environment; `main` loads a `.env` file first
//! when one exists.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default sampling temperature for analysis prompts.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Port the HTTP server binds on.
    pub port: u16,
    /// LLM settings, `None` when no API key is available.
    pub llm: Option<LlmConfig>,
    /// Sampling temperature for analysis prompts.
    pub temperature: f32,
    /// Sessions idle longer than this are dropped.
    pub session_idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/lifeops.db"),
            port: 8080,
            llm: None,
            temperature: DEFAULT_TEMPERATURE,
            session_idle_timeout: Duration::from_secs(12 * 3600),
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("LIFEOPS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let port = match lookup("LIFEOPS_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LIFEOPS_PORT".to_string(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            None => defaults.port,
        };

        let temperature = match lookup("LIFEOPS_TEMPERATURE") {
            Some(raw) => {
                let t: f32 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LIFEOPS_TEMPERATURE".to_string(),
                    message: format!("'{raw}' is not a number"),
                })?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::InvalidValue {
                        key: "LIFEOPS_TEMPERATURE".to_string(),
                        message: "must be between 0.0 and 2.0".to_string(),
                    });
                }
                t
            }
            None => defaults.temperature,
        };

        let session_idle_timeout = match lookup("LIFEOPS_SESSION_IDLE_MINUTES") {
            Some(raw) => {
                let minutes: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LIFEOPS_SESSION_IDLE_MINUTES".to_string(),
                    message: format!("'{raw}' is not a whole number of minutes"),
                })?;
                Duration::from_secs(minutes * 60)
            }
            None => defaults.session_idle_timeout,
        };

        let backend = match lookup("LIFEOPS_LLM_BACKEND") {
            Some(raw) => raw.parse::<LlmBackend>()?,
            None => LlmBackend::Anthropic,
        };
        let llm = lookup(backend.api_key_var())
            .filter(|key| !key.trim().is_empty())
            .map(|key| LlmConfig {
                backend,
                api_key: secrecy::SecretString::from(key),
                model: lookup("LIFEOPS_MODEL")
                    .unwrap_or_else(|| backend.default_model().to_string()),
            });

        Ok(Self {
            db_path,
            port,
            llm,
            temperature,
            session_idle_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("./data/lifeops.db"));
        assert!(config.llm.is_none());
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn llm_enabled_when_key_present() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("LIFEOPS_LLM_BACKEND", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.backend, LlmBackend::OpenAi);
        assert_eq!(llm.model, "gpt-4o-mini");
    }

    #[test]
    fn blank_key_disables_llm() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert!(config.llm.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("LIFEOPS_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("LIFEOPS_PORT"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("LIFEOPS_TEMPERATURE", "3.5")])).is_err());
    }
}
