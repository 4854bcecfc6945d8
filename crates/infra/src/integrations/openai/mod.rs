/// OpenAI integration for event extraction
///
/// [`OpenAiOracle`] implements the core `InferenceOracle` port on top of the
/// Chat Completions API: one request per aggregated message, `n` sampled
/// completions, each constrained by the strict `json_schema` response
/// format.
///
/// # Usage
///
/// ```no_run
/// use std::sync::Arc;
///
/// use calbot_core::ExtractionOrchestrator;
/// use calbot_infra::http::HttpClient;
/// use calbot_infra::integrations::openai::OpenAiOracle;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let http_client = HttpClient::builder().max_attempts(1).build()?;
/// let api_key = std::env::var("OPENAI_API_KEY")?;
/// let oracle = OpenAiOracle::new(api_key, http_client).with_model("gpt-4o-mini");
///
/// let orchestrator = ExtractionOrchestrator::new(Arc::new(oracle));
/// let extracts = orchestrator.extract_all(&[]).await;
/// assert!(extracts.is_empty());
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// Every failure is reported as an `OracleError`:
/// - **429**, or an error body mentioning rate limits, quota or resource
///   exhaustion: `RateLimited`
/// - anything else (network, 5xx, other 4xx, unreadable envelope):
///   `Transient`
///
/// Retrying is left to the orchestrator, so the HTTP client handed in should
/// normally be built with a single attempt.
pub mod client;
pub mod types;

pub use client::OpenAiOracle;
