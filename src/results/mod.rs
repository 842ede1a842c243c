//! Result types module
//!
//! Image descriptors, item metadata and the per-search aggregate.

mod aggregate;
mod types;

pub use aggregate::LlomaxResult;
pub use types::*;
