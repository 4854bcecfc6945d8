//! # Calbot Domain
//!
//! Business domain types and models for Calbot.
//!
//! This crate contains:
//! - Chat message records and their aggregated form
//! - Extracted event candidates (talks and events, physical and virtual)
//! - Calendar entry records, drafts and sync summaries
//! - Domain error types, constants and configuration structures
//! - The `YYYY-MM-DDTHH:MM` placeholder date parser
//!
//! ## Architecture
//! - No dependencies on other Calbot crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::event_date::{parse_event_date, EventSchedule};
