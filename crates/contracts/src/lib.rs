//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Ownership Model
//! - `ModelHandle` is immutable after creation and safely shared across concurrent calls
//! - `GenerationRequest` / `GenerationResponse` are transient, one per dispatch

mod app_config;
mod client;
mod error;
mod generation;
mod model;
mod safety;

pub use app_config::*;
pub use client::{GenerationClient, LocalGenerationClient};
pub use error::*;
pub use generation::*;
pub use model::ModelHandle;
pub use safety::*;
