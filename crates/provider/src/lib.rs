//! # Provider
//!
//! LLM provider clients implementing the `GenerationClient` contract.
//!
//! Responsibilities:
//! - Real Gemini REST client (API key handling, connection probe)
//! - Mock client for tests and offline runs
//!
//! ## Feature Flags
//!
//! - `gemini-api`: Enable the real Gemini REST client (requires reqwest)

pub mod mock;

#[cfg(feature = "gemini-api")]
pub mod gemini;

pub use contracts::{GenerationClient, GenerationRequest, GenerationResponse, ModelHandle};
pub use mock::MockClient;

#[cfg(feature = "gemini-api")]
pub use gemini::GeminiClient;
