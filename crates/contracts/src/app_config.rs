//! Application configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{GenerationConfig, SafetySettings};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider settings
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// Dispatcher (worker pool) settings
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Default generation parameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Default safety policy
    #[serde(default)]
    pub safety: SafetySettings,
}

/// Gemini provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    ///
    /// The key itself never appears in config files.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Fixed worker thread count
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Maximum admitted-but-not-yet-running calls
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Default per-call timeout in seconds
    #[serde(default = "default_timeout_s")]
    pub default_timeout_s: f64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_size: default_queue_size(),
            default_timeout_s: default_timeout_s(),
        }
    }
}

impl DispatcherConfig {
    /// Default timeout as a `Duration`
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.default_timeout_s)
    }
}

fn default_max_workers() -> usize {
    5
}

fn default_queue_size() -> usize {
    100
}

fn default_timeout_s() -> f64 {
    30.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_config_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.queue_size, 100);
        assert_eq!(config.default_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_app_config_from_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.dispatcher.max_workers, 5);
        assert_eq!(config.generation.temperature, 0.7);
    }

    #[test]
    fn test_partial_dispatcher_section() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "dispatcher": { "max_workers": 2 } }"#).unwrap();
        assert_eq!(config.dispatcher.max_workers, 2);
        assert_eq!(config.dispatcher.queue_size, 100);
    }
}
