//! GenerationClient trait - LLM provider abstraction
//!
//! Defines a unified interface for generation backends, decoupling the
//! dispatcher from concrete provider implementations. Supports unified
//! handling of the real Gemini client and mock clients.

use crate::{
    ContractError, GenerationConfig, GenerationRequest, GenerationResponse, ModelHandle,
    SafetySettings,
};

/// LLM provider trait
///
/// All generation backends implement this trait for use by the
/// dispatcher. Implementations must be safe to share across threads;
/// the dispatcher drives `generate` from pooled worker threads.
#[trait_variant::make(GenerationClient: Send)]
pub trait LocalGenerationClient {
    /// Create an immutable model handle
    ///
    /// Applies the global defaults (block-nothing safety, default
    /// generation profile) when overrides are absent.
    ///
    /// # Errors
    /// Returns `ModelCreation` if the provider rejects the configuration
    /// (e.g. invalid model name). Never retried.
    fn create_model(
        &self,
        name: &str,
        safety: Option<SafetySettings>,
        generation: Option<GenerationConfig>,
    ) -> Result<ModelHandle, ContractError>;

    /// Execute one generation call to completion
    ///
    /// Returns the raw provider response; blocked-prompt detection is the
    /// caller's responsibility.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, ContractError>;
}
