use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calbot_core::{InferenceOracle, OracleError, OracleRequest, OracleResponse};

type Responder = dyn Fn(&OracleRequest) -> Result<OracleResponse, OracleError> + Send + Sync;

/// Mock oracle replaying a script of results, then a fallback responder.
///
/// Tracks how many calls are in flight at once so worker-pool bounds can be
/// asserted.
#[derive(Clone)]
pub struct ScriptedOracle {
    script: Arc<Mutex<VecDeque<Result<OracleResponse, OracleError>>>>,
    fallback: Arc<Responder>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// A successful response carrying `candidates` verbatim.
pub fn response(candidates: &[&str]) -> OracleResponse {
    OracleResponse { candidates: candidates.iter().map(|c| c.to_string()).collect(), usage: None }
}

impl ScriptedOracle {
    /// Replays `script` in order; once exhausted, every call is a transient
    /// failure.
    pub fn scripted(script: Vec<Result<OracleResponse, OracleError>>) -> Self {
        Self::with_fallback(script, |_| Err(OracleError::Transient("script exhausted".into())))
    }

    /// Answers every call with `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&OracleRequest) -> Result<OracleResponse, OracleError> + Send + Sync + 'static,
    {
        Self::with_fallback(Vec::new(), responder)
    }

    fn with_fallback<F>(script: Vec<Result<OracleResponse, OracleError>>, fallback: F) -> Self
    where
        F: Fn(&OracleRequest) -> Result<OracleResponse, OracleError> + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback: Arc::new(fallback),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceOracle for ScriptedOracle {
    async fn infer(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Give other in-flight calls a chance to interleave
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        let result = match scripted {
            Some(result) => result,
            None => (self.fallback)(request),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
