//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Every failure is classified and returned to the caller; the dispatcher
/// never retries or recovers locally.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Provider rejected the model configuration
    #[error("failed to create model '{model}': {message}")]
    ModelCreation { model: String, message: String },

    /// Admission control rejected the call - capacity exhausted
    #[error("dispatch queue full: {queued} waiting, capacity {capacity}")]
    QueueFull { queued: usize, capacity: usize },

    /// Resolved timeout elapsed before the worker produced a result
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: f64 },

    /// Model call failed, or content was blocked by safety policy
    #[error("generation failed: {reason}")]
    Generation { reason: String },

    /// Call attempted after shutdown began
    #[error("dispatcher is closed")]
    Closed,
}

impl DispatcherError {
    /// Create a model creation error
    pub fn model_creation(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelCreation {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generation(reason: impl Into<String>) -> Self {
        Self::Generation {
            reason: reason.into(),
        }
    }
}
