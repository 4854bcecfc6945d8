//! Exponential backoff retry state machine
//!
//! A [`RetryState`] tracks the attempt count, the delay to use before the
//! next attempt and the class of the last failure. Callers report each
//! failure through [`RetryState::on_failure`] and act on the returned
//! [`RetryStep`]:
//!
//! ```
//! use std::time::Duration;
//!
//! use calbot_common::resilience::{BackoffPolicy, RetryState, RetryStep};
//!
//! let policy = BackoffPolicy::default();
//! let mut state: RetryState<&str> = RetryState::new(policy);
//!
//! assert_eq!(state.on_failure("rate"), RetryStep::Retry { delay: Duration::from_secs(1) });
//! assert_eq!(state.on_failure("rate"), RetryStep::Retry { delay: Duration::from_secs(2) });
//! assert_eq!(state.last_class(), Some(&"rate"));
//! ```

use std::time::Duration;

use thiserror::Error;

/// Errors raised when a backoff policy is configured inconsistently
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("initial delay {initial:?} exceeds max delay {max:?}")]
    InvertedDelays { initial: Duration, max: Duration },
}

/// Exponential backoff configuration: delays start at `initial_delay` and
/// double after every retry, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    /// Build a policy, rejecting zero attempts and an initial delay larger
    /// than the cap.
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if initial_delay > max_delay {
            return Err(PolicyError::InvertedDelays { initial: initial_delay, max: max_delay });
        }
        Ok(Self { max_attempts, initial_delay, max_delay })
    }

    /// Total number of attempts (initial try + retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

impl Default for BackoffPolicy {
    /// Five attempts, one second initial delay, 32 second cap.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
        }
    }
}

/// What the caller should do after reporting a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Sleep for `delay`, then make another attempt
    Retry { delay: Duration },
    /// The attempt budget is spent
    GiveUp,
}

/// Retry loop state: attempts made so far, the delay before the next
/// attempt, and the class of the most recent failure.
///
/// `C` is whatever failure classification the caller uses. The state machine
/// does not branch on it; it is recorded so the final log line can say why
/// the loop gave up.
#[derive(Debug, Clone)]
pub struct RetryState<C> {
    policy: BackoffPolicy,
    attempt: u32,
    current_delay: Duration,
    last_class: Option<C>,
}

impl<C> RetryState<C> {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0, current_delay: policy.initial_delay, last_class: None }
    }

    /// Number of failed attempts recorded so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay that will be returned for the next retry.
    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn last_class(&self) -> Option<&C> {
        self.last_class.as_ref()
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Record a failed attempt and decide the next transition.
    ///
    /// No delay is returned after the final attempt: a caller that gives up
    /// never sleeps first.
    pub fn on_failure(&mut self, class: C) -> RetryStep {
        self.attempt = self.attempt.saturating_add(1);
        self.last_class = Some(class);

        if self.attempt >= self.policy.max_attempts {
            return RetryStep::GiveUp;
        }

        let delay = self.current_delay;
        self.current_delay = self.current_delay.saturating_mul(2).min(self.policy.max_delay);
        RetryStep::Retry { delay }
    }

    /// Whether the attempt budget has been spent.
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.policy.max_attempts
    }
}
