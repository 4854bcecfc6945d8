//! Event extraction
//!
//! Each aggregated message becomes one oracle request asking for several
//! independent candidate sets. Malformed sets are dropped, the densest of the
//! rest is kept, and any failure degrades to an empty result.

pub mod density;
pub mod ports;
pub mod prompt;
pub mod schema;
mod service;

pub use service::{ExtractionOrchestrator, ExtractionSettings};
