//! Extraction orchestrator - core business logic

use std::sync::Arc;
use std::time::Duration;

use calbot_common::resilience::{BackoffPolicy, RetryState, RetryStep};
use calbot_common::time::{Sleeper, TokioSleeper};
use calbot_domain::{AggregatedMessage, CalbotError, ExtractionConfig, MessageExtract, Result};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::density::select_densest;
use super::ports::{InferenceOracle, OracleErrorClass, OracleRequest, OracleResponse};
use super::prompt::build_prompt;
use super::schema::message_extract_schema;

/// Tunables for the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub sample_count: u32,
    pub workers: usize,
    pub backoff: BackoffPolicy,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self { sample_count: 3, workers: 5, backoff: BackoffPolicy::default() }
    }
}

impl ExtractionSettings {
    /// # Errors
    /// Returns [`CalbotError::Config`] for zero workers, zero samples or an
    /// inconsistent backoff policy.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        if config.workers == 0 || config.sample_count == 0 {
            return Err(CalbotError::Config(
                "extraction workers and sample_count must be at least 1".into(),
            ));
        }
        let backoff = BackoffPolicy::new(
            config.max_attempts,
            Duration::from_secs(config.initial_retry_delay_secs),
            Duration::from_secs(config.max_retry_delay_secs),
        )
        .map_err(|e| CalbotError::Config(format!("extraction backoff: {e}")))?;

        Ok(Self { sample_count: config.sample_count, workers: config.workers, backoff })
    }
}

/// Turns aggregated messages into one extraction result each
///
/// Oracle failures never escape: after the retry budget is spent the
/// message yields an empty result and a warning.
pub struct ExtractionOrchestrator {
    oracle: Arc<dyn InferenceOracle>,
    sleeper: Arc<dyn Sleeper>,
    settings: ExtractionSettings,
    schema: Value,
}

impl ExtractionOrchestrator {
    /// Create an orchestrator with default settings and real sleeping
    pub fn new(oracle: Arc<dyn InferenceOracle>) -> Self {
        Self {
            oracle,
            sleeper: Arc::new(TokioSleeper),
            settings: ExtractionSettings::default(),
            schema: message_extract_schema(),
        }
    }

    pub fn with_settings(mut self, settings: ExtractionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the sleeper used between retries (tests record delays instead)
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Extract candidates for every message, at most `workers` in flight.
    ///
    /// The output is index-aligned with the input.
    #[instrument(skip_all, fields(messages = messages.len(), workers = self.settings.workers))]
    pub async fn extract_all(&self, messages: &[AggregatedMessage]) -> Vec<MessageExtract> {
        let mut slots = vec![MessageExtract::empty(); messages.len()];

        let mut completed = stream::iter(messages.iter().enumerate())
            .map(|(index, message)| async move { (index, self.extract_one(message).await) })
            .buffer_unordered(self.settings.workers.max(1));

        while let Some((index, extract)) = completed.next().await {
            slots[index] = extract;
        }

        let total_events: usize = slots.iter().map(|extract| extract.events.len()).sum();
        info!(messages = messages.len(), events = total_events, "extraction complete");
        slots
    }

    /// Extract candidates for one message. Never fails.
    pub async fn extract_one(&self, message: &AggregatedMessage) -> MessageExtract {
        let sent_at = match message.sent_at() {
            Ok(at) => Some(at),
            Err(err) => {
                warn!(sender = %message.sender, error = %err, "unreadable send time; prompting without it");
                None
            }
        };

        let request = OracleRequest {
            prompt: build_prompt(message, sent_at),
            schema: self.schema.clone(),
            sample_count: self.settings.sample_count,
        };

        let Some(response) = self.call_with_retry(&request, message).await else {
            return MessageExtract::empty();
        };

        let parsed: Vec<MessageExtract> = response
            .candidates
            .iter()
            .enumerate()
            .filter_map(|(sample, payload)| match serde_json::from_str::<MessageExtract>(payload) {
                Ok(extract) => Some(extract),
                Err(err) => {
                    warn!(sender = %message.sender, sample, error = %err, "discarding malformed candidate");
                    None
                }
            })
            .collect();

        match select_densest(parsed) {
            Some((extract, density)) => {
                debug!(
                    sender = %message.sender,
                    samples = response.candidates.len(),
                    events = extract.events.len(),
                    density,
                    "selected densest candidate set"
                );
                extract
            }
            None => {
                warn!(sender = %message.sender, "no valid candidate set returned");
                MessageExtract::empty()
            }
        }
    }

    async fn call_with_retry(
        &self,
        request: &OracleRequest,
        message: &AggregatedMessage,
    ) -> Option<OracleResponse> {
        let mut state: RetryState<OracleErrorClass> = RetryState::new(self.settings.backoff);

        loop {
            match self.oracle.infer(request).await {
                Ok(response) => {
                    if let Some(usage) = response.usage {
                        debug!(
                            prompt_tokens = usage.prompt_tokens,
                            completion_tokens = usage.completion_tokens,
                            "oracle usage"
                        );
                    }
                    return Some(response);
                }
                Err(err) => match state.on_failure(err.class()) {
                    RetryStep::Retry { delay } => {
                        warn!(
                            sender = %message.sender,
                            attempt = state.attempt(),
                            ?delay,
                            class = ?err.class(),
                            error = %err,
                            "oracle call failed; retrying"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                    RetryStep::GiveUp => {
                        warn!(
                            sender = %message.sender,
                            attempts = state.attempt(),
                            class = ?state.last_class(),
                            error = %err,
                            "oracle retries exhausted; returning empty extraction"
                        );
                        return None;
                    }
                },
            }
        }
    }
}
