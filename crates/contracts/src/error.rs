//! Layered error definitions
//!
//! Categorized by source: config / provider / generation

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Provider Errors =====
    /// API key not configured before client construction
    #[error("api key missing: set {env_var} before creating a client")]
    ApiKeyMissing { env_var: String },

    /// Provider rejected the model configuration
    #[error("model creation failed for '{model}': {message}")]
    ModelCreation { model: String, message: String },

    /// Transport-level HTTP failure
    #[error("http error: {message}")]
    Http { message: String },

    /// Provider returned a non-success status
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider response body could not be decoded
    #[error("response decode error: {message}")]
    ResponseDecode { message: String },

    // ===== Generation Errors =====
    /// Prompt was blocked by the content filter
    #[error("content blocked: {reason}")]
    Blocked { reason: String },

    /// Provider returned no usable text
    #[error("empty response from model")]
    EmptyResponse,

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create model creation error
    pub fn model_creation(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelCreation {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create HTTP transport error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Create API status error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create blocked-content error
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    /// Create response decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::ResponseDecode {
            message: message.into(),
        }
    }
}
