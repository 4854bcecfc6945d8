//! Port interface for the structured-inference oracle

use async_trait::async_trait;
use calbot_common::error::{ErrorClassification, ErrorSeverity};
use serde_json::Value;
use thiserror::Error;

/// One sampling request: the prompt, the JSON schema every candidate must
/// conform to, and how many independent candidates to return.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    pub prompt: String,
    pub schema: Value,
    pub sample_count: u32,
}

/// Token accounting reported by the oracle, when available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Raw candidate payloads, each expected to be a `MessageExtract` JSON
/// document. Payloads are not validated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleResponse {
    pub candidates: Vec<String>,
    pub usage: Option<TokenUsage>,
}

/// Coarse failure class driving retry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleErrorClass {
    /// Rate or quota exhaustion
    RateLimited,
    /// Any other failure (network, server error, unreadable envelope)
    Transient,
}

/// Failure of a single oracle call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle rate limited: {0}")]
    RateLimited(String),

    #[error("oracle call failed: {0}")]
    Transient(String),
}

impl OracleError {
    pub fn class(&self) -> OracleErrorClass {
        match self {
            Self::RateLimited(_) => OracleErrorClass::RateLimited,
            Self::Transient(_) => OracleErrorClass::Transient,
        }
    }
}

impl ErrorClassification for OracleError {
    /// Both classes are retried; the orchestrator downgrades exhaustion to an
    /// empty extraction.
    fn is_retryable(&self) -> bool {
        true
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RateLimited(_) => ErrorSeverity::Warning,
            Self::Transient(_) => ErrorSeverity::Error,
        }
    }
}

/// Text in, candidate set out
///
/// Implementations are shared across extraction workers and must tolerate
/// concurrent calls.
#[async_trait]
pub trait InferenceOracle: Send + Sync {
    async fn infer(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError>;
}
