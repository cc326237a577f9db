//! Capture analysis.
//!
//! - [`prompt`]: instruction prompt for the generative model
//! - [`json_extract`]: JSON object recovery from free-form output
//! - [`coerce`]: normalization into [`crate::capture::MemoryResult`]
//! - [`analyzer`]: orchestration of the above around the model call

pub mod analyzer;
pub mod coerce;
pub mod json_extract;
pub mod prompt;

pub use analyzer::Analyzer;
pub use coerce::{MAX_COLLECTIONS, coerce};
pub use json_extract::extract_json;
pub use prompt::build_prompt;
