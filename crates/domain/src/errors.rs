//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Calbot
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalbotError {
    /// A record could not be interpreted (bad timestamp, bad JSON shape)
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// A candidate's date expression cannot be placed on a calendar
    #[error("Unschedulable event: {0}")]
    Unschedulable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Inference oracle error: {0}")]
    Oracle(String),

    #[error("Calendar store error: {0}")]
    Calendar(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Calbot operations
pub type Result<T> = std::result::Result<T, CalbotError>;
