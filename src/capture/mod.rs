//! Capture domain types.
//!
//! - `record`: the normalized memory record returned to clients
//! - `context`: per-request analysis inputs and media references
//! - `media`: MIME detection and temp-file suffixes for uploads

pub mod context;
pub mod media;
pub mod record;

pub use context::{AnalysisContext, MediaRef};
pub use record::{MemoryResult, Reminder};
