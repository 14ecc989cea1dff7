//! Scam analysis: prompt construction and verdict parsing.

mod prompt;
mod verdict;

pub use prompt::build_analysis_prompt;
pub use verdict::{AnalysisOutcome, Verdict};
