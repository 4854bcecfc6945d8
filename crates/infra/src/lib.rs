//! # Calbot Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The OpenAI-backed inference oracle
//! - The Google Calendar store and its token handling
//! - Stage batch files and the JSON user directory
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `calbot-core`
//! - Contains all "impure" code (HTTP, file system, environment)

pub mod config;
pub mod directory;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod storage;

// Re-export commonly used items
pub use directory::JsonUserDirectory;
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::{GoogleCalendarStore, TokenSource};
pub use integrations::openai::OpenAiOracle;
