//! ModelHandle - immutable model configuration reference
//!
//! Created once by a `GenerationClient`, then shared freely across
//! concurrent dispatch calls without locking.

use crate::{GenerationConfig, SafetySettings};

/// Immutable reference to a configured model
///
/// Carries the effective safety policy and generation defaults resolved
/// at creation time, so later calls can reuse them without re-specifying.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    name: String,
    safety: SafetySettings,
    generation: GenerationConfig,
}

impl ModelHandle {
    /// Create a handle with already-resolved settings
    pub fn new(
        name: impl Into<String>,
        safety: SafetySettings,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            safety,
            generation,
        }
    }

    /// Model identifier (e.g. "gemini-1.5-flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective safety policy
    pub fn safety(&self) -> &SafetySettings {
        &self.safety
    }

    /// Effective generation defaults
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_carries_settings() {
        let handle = ModelHandle::new(
            "gemini-1.5-flash",
            SafetySettings::default(),
            GenerationConfig::default(),
        );
        assert_eq!(handle.name(), "gemini-1.5-flash");
        assert_eq!(handle.generation().max_output_tokens, 2048);
    }
}
