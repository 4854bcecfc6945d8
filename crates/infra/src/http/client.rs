use std::sync::Arc;
use std::time::Duration;

use calbot_common::resilience::{BackoffPolicy, RetryState, RetryStep};
use calbot_common::time::{Sleeper, TokioSleeper};
use calbot_domain::CalbotError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// Why a transport-level attempt is being retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportFailure {
    ServerError(u16),
    Connection,
}

/// HTTP client with built-in retry and timeout support.
///
/// Only 5xx responses and connection-level failures are retried; every other
/// response is handed back to the caller to interpret.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    backoff: BackoffPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, CalbotError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Only idempotent methods are retried. A POST that timed out may
    /// already have been applied by the server, so it is sent once.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CalbotError> {
        let mut state: RetryState<TransportFailure> = RetryState::new(self.backoff);

        loop {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                CalbotError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                CalbotError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            let attempt = state.attempt() + 1;
            let retryable = is_idempotent(&method);
            debug!(attempt, %method, %url, "sending HTTP request");

            let failure = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if !status.is_server_error() || !retryable {
                        return Ok(response);
                    }
                    match state.on_failure(TransportFailure::ServerError(status.as_u16())) {
                        RetryStep::Retry { delay } => delay,
                        RetryStep::GiveUp => return Ok(response),
                    }
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    if !retryable || !should_retry_error(&err) {
                        let infra: InfraError = err.into();
                        return Err(CalbotError::from(infra));
                    }
                    match state.on_failure(TransportFailure::Connection) {
                        RetryStep::Retry { delay } => delay,
                        RetryStep::GiveUp => {
                            let infra: InfraError = err.into();
                            return Err(CalbotError::from(infra));
                        }
                    }
                }
            };

            if !failure.is_zero() {
                self.sleeper.sleep(failure).await;
            }
        }
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    user_agent: Option<String>,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
            user_agent: Some(concat!("calbot/", env!("CARGO_PKG_VERSION")).to_string()),
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Replace the sleeper used between attempts.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn build(self) -> Result<HttpClient, CalbotError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            CalbotError::from(infra)
        })?;

        let backoff = BackoffPolicy::new(
            self.max_attempts.max(1),
            self.base_backoff,
            self.max_backoff.max(self.base_backoff),
        )
        .map_err(|err| CalbotError::Config(format!("http backoff: {err}")))?;

        Ok(HttpClient { client, backoff, sleeper: self.sleeper })
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use calbot_common::time::RecordingSleeper;
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with(sleeper: &RecordingSleeper, attempts: u32) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(attempts)
            .sleeper(Arc::new(sleeper.clone()))
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sleeper.recorded(), vec![Duration::from_millis(10), Duration::from_millis(20)]);
    }

    #[tokio::test]
    async fn last_server_error_is_returned_to_the_caller() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 2);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn post_is_sent_once_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 3);
        let response = client
            .send(client.request(Method::POST, server.uri()).body("{}"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn post_is_sent_once_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let sleeper = RecordingSleeper::new();
        let client = HttpClient::builder()
            .timeout(Duration::from_millis(100))
            .max_attempts(3)
            .sleeper(Arc::new(sleeper.clone()))
            .build()
            .expect("http client");

        let result = client.send(client.request(Method::POST, server.uri()).body("{}")).await;

        assert!(result.is_err());
        assert_eq!(server.received_requests().await.expect("recorded").len(), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[tokio::test]
    async fn retries_on_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{}", addr);

        let sleeper = RecordingSleeper::new();
        let client = client_with(&sleeper, 2);

        let result = client.send(client.request(Method::GET, &url)).await;
        match result {
            Err(CalbotError::Network(msg)) => {
                assert!(msg.to_lowercase().contains("http"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
        assert_eq!(sleeper.recorded().len(), 1);
    }
}
