/// OpenAI Chat Completions client implementing the inference oracle port
use async_trait::async_trait;
use calbot_core::extraction::schema::SCHEMA_NAME;
use calbot_core::{InferenceOracle, OracleError, OracleRequest, OracleResponse, TokenUsage};
use calbot_domain::{CalbotError, ExtractionConfig};
use reqwest::Method;
use tracing::debug;

use crate::http::HttpClient;

use super::types::{
    mentions_rate_limit, ApiErrorEnvelope, ChatCompletionRequest, ChatCompletionResponse,
    ChatMessage, JsonSchema, ResponseFormat,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 4_096;
const DEFAULT_TEMPERATURE: f32 = 1.0;

const SYSTEM_PROMPT: &str = "You extract academic talks and events from chat announcements and \
answer only with JSON matching the provided schema.";

/// OpenAI-backed [`InferenceOracle`]
pub struct OpenAiOracle {
    http_client: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiOracle {
    /// Create a new oracle
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key (required)
    /// * `http_client` - HTTP client; retries are the orchestrator's job
    pub fn new(api_key: String, http_client: HttpClient) -> Self {
        Self {
            http_client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: OPENAI_API_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Create an oracle with model, endpoint and sampling taken from config
    pub fn from_config(api_key: String, http_client: HttpClient, config: &ExtractionConfig) -> Self {
        Self::new(api_key, http_client)
            .with_model(config.model.clone())
            .with_api_url(config.api_url.clone())
            .with_sampling(config.temperature, config.max_tokens)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the oracle at another Chat Completions endpoint
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn build_payload(&self, request: &OracleRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: request.prompt.clone() },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            n: request.sample_count.max(1),
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: Some(JsonSchema {
                    name: SCHEMA_NAME.to_string(),
                    schema: request.schema.clone(),
                    strict: Some(true),
                }),
            },
        }
    }

    /// Map a non-2xx response onto the oracle's two failure classes
    async fn handle_error_status(&self, status: u16, response: reqwest::Response) -> OracleError {
        let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        let envelope: ApiErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
        let detail = if envelope.error.message.is_empty() { body } else { envelope.error.message.clone() };

        if status == 429 || envelope.error.is_rate_limit() || mentions_rate_limit(&detail) {
            OracleError::RateLimited(format!("status {status}: {detail}"))
        } else {
            OracleError::Transient(format!("status {status}: {detail}"))
        }
    }
}

#[async_trait]
impl InferenceOracle for OpenAiOracle {
    async fn infer(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let payload = self.build_payload(request);

        let request_builder = self
            .http_client
            .request(Method::POST, &self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload);

        let response = self.http_client.send(request_builder).await.map_err(|err| match err {
            CalbotError::Network(msg) if mentions_rate_limit(&msg) => OracleError::RateLimited(msg),
            other => OracleError::Transient(other.to_string()),
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), model = %self.model, "received OpenAI response");

        if !status.is_success() {
            return Err(self.handle_error_status(status.as_u16(), response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Transient(format!("failed to parse response envelope: {e}")))?;

        let mut candidates = Vec::with_capacity(completion.choices.len());
        for (index, choice) in completion.choices.into_iter().enumerate() {
            match choice.message.content {
                Some(content) => candidates.push(content),
                None => debug!(
                    choice = index,
                    refusal = choice.message.refusal.as_deref().unwrap_or_default(),
                    "choice carried no content"
                ),
            }
        }

        Ok(OracleResponse {
            candidates,
            usage: completion.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            }),
        })
    }
}
