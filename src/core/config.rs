//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::LangCase;

/// Default public endpoint of the translation service
pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

/// Configuration for a translation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub api_key: String,
    pub region: String,
    pub endpoint: String,
    pub batch_size: usize,
    pub max_chars_per_request: usize,
    pub sleep_between_batches_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_max_jitter_ms: u64,
    pub timeout_ms: u64,
    pub lang_case: LangCase,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            region: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: 8,
            max_chars_per_request: 9000,
            sleep_between_batches_ms: 1000,
            max_retries: 12,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 15000,
            retry_max_jitter_ms: 500,
            timeout_ms: 60000,
            lang_case: LangCase::Lower,
        }
    }
}

impl TranslatorConfig {
    /// Defaults (or the given JSON file) overlaid with the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// Numeric values that fail to parse leave the current value in place.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("AZURE_TRANSLATOR_KEY") {
            self.api_key = key;
        }
        if let Some(region) = lookup("AZURE_TRANSLATOR_REGION") {
            self.region = region;
        }
        if let Some(endpoint) = lookup("AZURE_TRANSLATOR_ENDPOINT") {
            self.endpoint = endpoint;
        }

        self.batch_size = env_number(&lookup, "TRANSLATE_BATCH_SIZE", self.batch_size);
        self.max_retries = env_number(&lookup, "TRANSLATE_MAX_RETRIES", self.max_retries);

        if let Some(raw) = lookup("TRANSLATE_SLEEP") {
            match raw.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                    self.sleep_between_batches_ms = (secs * 1000.0).round() as u64;
                }
                _ => warn!("Ignoring TRANSLATE_SLEEP={:?}: not a number of seconds", raw),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() || self.region.is_empty() {
            return Err(TranslationError::config(
                "AZURE_TRANSLATOR_KEY and AZURE_TRANSLATOR_REGION must be set",
            ));
        }

        if self.endpoint.is_empty() {
            return Err(TranslationError::config("endpoint is required"));
        }

        if self.batch_size == 0 {
            return Err(TranslationError::config("batch size must be greater than 0"));
        }

        if self.max_chars_per_request == 0 {
            return Err(TranslationError::config(
                "max_chars_per_request must be greater than 0",
            ));
        }

        if self.max_retries == 0 {
            return Err(TranslationError::config("max_retries must be greater than 0"));
        }

        Ok(())
    }

    /// Pause between consecutive batches
    pub fn sleep_between_batches(&self) -> Duration {
        Duration::from_millis(self.sleep_between_batches_ms)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn env_number<T, F>(lookup: &F, name: &str, current: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring {}={:?}: not a valid number", name, raw);
            current
        }),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            region: "westeurope".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_credentials() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("AZURE_TRANSLATOR_REGION"));
    }

    #[test]
    fn test_config_validation_zero_batch_size() {
        let config = TranslatorConfig {
            api_key: "k".to_string(),
            region: "r".to_string(),
            batch_size: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = TranslatorConfig::default();
        config.apply_env(lookup_from(&[
            ("AZURE_TRANSLATOR_KEY", "secret"),
            ("AZURE_TRANSLATOR_REGION", "eastus"),
            ("AZURE_TRANSLATOR_ENDPOINT", "http://localhost:9999"),
            ("TRANSLATE_BATCH_SIZE", "50"),
            ("TRANSLATE_SLEEP", "0.25"),
            ("TRANSLATE_MAX_RETRIES", "3"),
        ]));

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.region, "eastus");
        assert_eq!(config.endpoint, "http://localhost:9999");
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.sleep_between_batches_ms, 250);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_apply_env_falls_back_on_garbage() {
        let mut config = TranslatorConfig::default();
        config.apply_env(lookup_from(&[
            ("TRANSLATE_BATCH_SIZE", "lots"),
            ("TRANSLATE_SLEEP", "soon"),
            ("TRANSLATE_MAX_RETRIES", "-1"),
        ]));

        assert_eq!(config.batch_size, 8);
        assert_eq!(config.sleep_between_batches_ms, 1000);
        assert_eq!(config.max_retries, 12);
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch_size": 50, "lang_case": "upper"}"#).unwrap();

        let config = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.lang_case, LangCase::Upper);
        assert_eq!(config.max_chars_per_request, 9000);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
