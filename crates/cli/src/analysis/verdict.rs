//! Verdict parsing for model answers.
//!
//! The model is asked for a bare JSON object, but answers routinely
//! arrive wrapped in a ```json fence. Parsing degrades gracefully: an
//! answer that is not valid JSON is surfaced as raw text rather than
//! discarded.

use serde::{Deserialize, Serialize};

/// Structured analysis verdict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    /// Risk classification (Low, Medium, High, Very High)
    pub risk_level: String,

    /// Concise summary of the analysis
    #[serde(default)]
    pub summary: String,

    /// Suspicious points found in the message
    #[serde(default)]
    pub alerts: Vec<String>,

    /// Main recommendation for the recipient
    #[serde(default)]
    pub recommendation: String,
}

/// Result of interpreting a model answer
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The answer parsed as a structured verdict
    Structured(Verdict),
    /// The answer was not valid JSON; raw text preserved
    Unstructured(String),
}

impl AnalysisOutcome {
    /// Interpret a raw model answer
    pub fn from_response_text(text: &str) -> Self {
        let cleaned = strip_json_fence(text);
        match serde_json::from_str::<Verdict>(cleaned) {
            Ok(verdict) => Self::Structured(verdict),
            Err(_) => Self::Unstructured(cleaned.to_string()),
        }
    }
}

/// Strip a surrounding ```json / ``` Markdown fence, if present
fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
