//! Sleep abstraction for testability
//!
//! ```
//! use std::time::Duration;
//!
//! use calbot_common::time::{RecordingSleeper, Sleeper};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let sleeper = RecordingSleeper::new();
//!     sleeper.sleep(Duration::from_secs(2)).await;
//!     assert_eq!(sleeper.recorded(), vec![Duration::from_secs(2)]);
//! });
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

/// Suspends the calling task for a duration
///
/// Implementations must only suspend the caller; other tasks keep running.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Sleeper that returns immediately and records every requested delay
///
/// Clones share the same record, so a test can keep one handle and give
/// another to the component under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in call order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().map(|delays| delays.clone()).unwrap_or_default()
    }

    /// Sum of every requested delay.
    pub fn total(&self) -> Duration {
        self.recorded().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        trace!(?duration, "recording sleep");
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_the_record() {
        let sleeper = RecordingSleeper::new();
        let handle = sleeper.clone();

        sleeper.sleep(Duration::from_secs(1)).await;
        sleeper.sleep(Duration::from_secs(2)).await;

        assert_eq!(handle.recorded(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert_eq!(handle.total(), Duration::from_secs(3));
    }

    #[test]
    fn recording_sleeper_returns_immediately() {
        let sleeper = RecordingSleeper::new();

        tokio_test::block_on(async {
            sleeper.sleep(Duration::from_secs(3600)).await;
        });

        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(3600)]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_the_duration() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(4)).await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }
}
