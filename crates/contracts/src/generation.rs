//! Generation request/response types
//!
//! Wire-shaped (camelCase) so the REST client can serialize/deserialize
//! them directly. snake_case aliases keep config files readable.

use serde::{Deserialize, Serialize};

use crate::{ModelHandle, SafetySettings};

/// Generation parameters
///
/// Defaults mirror the provider profile used for risk analysis:
/// temperature 0.7, max 2048 output tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling top-p
    #[serde(skip_serializing_if = "Option::is_none", alias = "top_p")]
    pub top_p: Option<f64>,

    /// Top-k sampling
    #[serde(skip_serializing_if = "Option::is_none", alias = "top_k")]
    pub top_k: Option<u32>,

    /// Maximum output tokens
    #[serde(alias = "max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: None,
            top_k: None,
            max_output_tokens: 2048,
        }
    }
}

/// A single generation call, fully resolved
///
/// Overrides have already been applied by the dispatcher: the config and
/// safety settings here are the effective values for this call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model to invoke
    pub model: ModelHandle,
    /// Prompt text
    pub prompt: String,
    /// Effective generation parameters
    pub generation: GenerationConfig,
    /// Effective safety settings
    pub safety: SafetySettings,
}

/// Raw model response
///
/// The dispatcher returns this unmodified; interpretation (verdict JSON
/// parsing etc.) is the caller's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationResponse {
    /// Generated candidates (usually one)
    pub candidates: Vec<Candidate>,
    /// Prompt-level feedback, present when the provider filtered the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerationResponse {
    /// Build a single-candidate text response (used by mocks and tests)
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Content {
                    parts: vec![Part { text: text.into() }],
                    role: Some("model".to_string()),
                },
                finish_reason: Some("STOP".to_string()),
                safety_ratings: Vec::new(),
            }],
            prompt_feedback: None,
        }
    }

    /// Concatenated text of the first candidate
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Non-empty prompt block reason, if the prompt was filtered
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
            .filter(|r| !r.is_empty())
    }
}

/// One generated candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    /// Generated content
    pub content: Content,
    /// Why generation stopped ("STOP", "MAX_TOKENS", "SAFETY", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Per-category safety ratings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

/// Candidate content (parts + role)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A single content part
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Part {
    pub text: String,
}

/// Prompt-level feedback from the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    /// Set when the prompt itself was blocked by the content filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_ratings: Vec<SafetyRating>,
}

/// Safety rating as reported by the provider
///
/// Kept as lenient strings: the provider enum set grows over time and a
/// rating must never fail decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_output_tokens, 2048);
        assert!(config.top_p.is_none());
        assert!(config.top_k.is_none());
    }

    #[test]
    fn test_generation_config_snake_case_aliases() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{"temperature": 0.2, "max_output_tokens": 512}"#).unwrap();
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_output_tokens, 512);
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let response: GenerationResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "Hello " }, { "text": "world" }], "role": "model" },
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(response.text(), "Hello world");
        assert!(response.block_reason().is_none());
    }

    #[test]
    fn test_response_block_reason() {
        let response: GenerationResponse = serde_json::from_str(
            r#"{ "candidates": [], "promptFeedback": { "blockReason": "SAFETY" } }"#,
        )
        .unwrap();
        assert_eq!(response.block_reason(), Some("SAFETY"));
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_empty_block_reason_is_none() {
        let response = GenerationResponse {
            candidates: Vec::new(),
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some(String::new()),
                safety_ratings: Vec::new(),
            }),
        };
        assert!(response.block_reason().is_none());
    }

    #[test]
    fn test_from_text_round_trip() {
        let response = GenerationResponse::from_text("OK");
        assert_eq!(response.text(), "OK");
        assert_eq!(
            response.candidates[0].finish_reason.as_deref(),
            Some("STOP")
        );
    }
}
