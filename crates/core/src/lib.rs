//! # Calbot Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Ingest normalization (mentions, URLs, time range)
//! - The window aggregator merging consecutive messages per sender
//! - The extraction orchestrator (oracle sampling, retry, density selection)
//! - The calendar sync engine (same-day dedup, series resolution, overwrite)
//!
//! ## Architecture Principles
//! - Only depends on `calbot-common` and `calbot-domain`
//! - No HTTP, file or platform code
//! - All external collaborators via traits (`InferenceOracle`,
//!   `CalendarStore`, `UserDirectory`)

pub mod aggregation;
pub mod calendar;
pub mod extraction;
pub mod ingest;

// Re-export specific items to avoid ambiguity
pub use aggregation::{RejectedRecord, WindowAggregator};
pub use calendar::ports::CalendarStore;
pub use calendar::{CalendarSyncEngine, SyncOutcome, SyncSettings};
pub use extraction::ports::{
    InferenceOracle, OracleError, OracleErrorClass, OracleRequest, OracleResponse, TokenUsage,
};
pub use extraction::{ExtractionOrchestrator, ExtractionSettings};
pub use ingest::ports::UserDirectory;
pub use ingest::{MessageNormalizer, UserNameCache};
