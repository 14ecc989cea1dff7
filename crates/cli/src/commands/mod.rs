//! Command implementations.

mod analyze;
mod info;
mod validate;

pub use analyze::run_analyze;
pub use info::run_info;
pub use validate::run_validate;
