//! Access tokens for the Calendar API

use std::time::{Duration, Instant};

use calbot_domain::{CalbotError, Result};
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::GoogleTokenRefreshResponse;
use crate::http::HttpClient;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Tokens without a reported lifetime are treated as valid this long
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3_000);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Where bearer tokens for the Calendar API come from
pub struct TokenSource {
    kind: TokenKind,
}

enum TokenKind {
    /// A token obtained elsewhere, used as-is
    Static(String),
    /// An OAuth refresh token exchanged for short-lived access tokens
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        token_url: String,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl TokenSource {
    /// Use `token` as-is for every request
    pub fn fixed(token: impl Into<String>) -> Self {
        Self { kind: TokenKind::Static(token.into()) }
    }

    pub fn refreshing(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            kind: TokenKind::Refresh {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                refresh_token: refresh_token.into(),
                token_url: GOOGLE_TOKEN_URL.to_string(),
                cached: Mutex::new(None),
            },
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.kind, TokenKind::Refresh { .. })
    }

    /// Override the token endpoint of a refreshing source
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        if let TokenKind::Refresh { token_url, .. } = &mut self.kind {
            *token_url = url.into();
        }
        self
    }

    /// Build a source from the environment.
    ///
    /// `GOOGLE_CALENDAR_ACCESS_TOKEN` wins; otherwise all of
    /// `GOOGLE_CALENDAR_CLIENT_ID`, `GOOGLE_CALENDAR_CLIENT_SECRET` and
    /// `GOOGLE_CALENDAR_REFRESH_TOKEN` must be set.
    ///
    /// # Errors
    /// Returns [`CalbotError::Auth`] when neither form is available.
    pub fn from_env() -> Result<Self> {
        if let Some(token) = non_empty_env("GOOGLE_CALENDAR_ACCESS_TOKEN") {
            return Ok(Self::fixed(token));
        }

        let client_id = non_empty_env("GOOGLE_CALENDAR_CLIENT_ID");
        let client_secret = non_empty_env("GOOGLE_CALENDAR_CLIENT_SECRET");
        let refresh_token = non_empty_env("GOOGLE_CALENDAR_REFRESH_TOKEN");

        match (client_id, client_secret, refresh_token) {
            (Some(id), Some(secret), Some(refresh)) => Ok(Self::refreshing(id, secret, refresh)),
            _ => Err(CalbotError::Auth(
                "set GOOGLE_CALENDAR_ACCESS_TOKEN or GOOGLE_CALENDAR_CLIENT_ID, \
                 GOOGLE_CALENDAR_CLIENT_SECRET and GOOGLE_CALENDAR_REFRESH_TOKEN"
                    .into(),
            )),
        }
    }

    /// A bearer token valid for at least the next minute.
    ///
    /// # Errors
    /// Returns [`CalbotError::Auth`] when the refresh exchange fails.
    pub async fn access_token(&self, http: &HttpClient) -> Result<String> {
        match &self.kind {
            TokenKind::Static(token) => Ok(token.clone()),
            TokenKind::Refresh { client_id, client_secret, refresh_token, token_url, cached } => {
                let mut guard = cached.lock().await;
                if let Some(token) = guard.as_ref().filter(|t| Instant::now() < t.refresh_at) {
                    return Ok(token.access_token.clone());
                }

                let fresh =
                    refresh(http, token_url, client_id, client_secret, refresh_token).await?;
                let token = fresh.access_token.clone();
                *guard = Some(fresh);
                Ok(token)
            }
        }
    }

    /// Drop any cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        if let TokenKind::Refresh { cached, .. } = &self.kind {
            cached.lock().await.take();
        }
    }
}

async fn refresh(
    http: &HttpClient,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<CachedToken> {
    debug!(%token_url, "refreshing calendar access token");

    let builder = http.request(Method::POST, token_url).form(&[
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ]);

    let response = http
        .send(builder)
        .await
        .map_err(|e| CalbotError::Auth(format!("Token refresh request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CalbotError::Auth(format!("Token refresh failed ({status}): {error_text}")));
    }

    let refreshed: GoogleTokenRefreshResponse = response
        .json()
        .await
        .map_err(|e| CalbotError::Auth(format!("Failed to parse token response: {e}")))?;

    let lifetime = refreshed.expires_in.map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);
    info!(expires_in_secs = lifetime.as_secs(), "calendar access token refreshed");

    Ok(CachedToken {
        access_token: refreshed.access_token,
        refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn static_tokens_are_returned_verbatim() {
        let http = HttpClient::new().expect("http client");
        let source = TokenSource::fixed("ya29.static");

        assert_eq!(source.access_token(&http).await.unwrap(), "ya29.static");
    }

    #[tokio::test]
    async fn refreshed_token_is_cached_until_invalidated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "ya29.fresh", "expires_in": 3599 })),
            )
            .expect(2)
            .mount(&server)
            .await;

        let http = HttpClient::new().expect("http client");
        let source = TokenSource::refreshing("client", "secret", "rt-1")
            .with_token_url(format!("{}/token", server.uri()));

        assert_eq!(source.access_token(&http).await.unwrap(), "ya29.fresh");
        assert_eq!(source.access_token(&http).await.unwrap(), "ya29.fresh");
        source.invalidate().await;
        assert_eq!(source.access_token(&http).await.unwrap(), "ya29.fresh");
    }

    #[tokio::test]
    async fn rejected_refresh_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
            .mount(&server)
            .await;

        let http = HttpClient::new().expect("http client");
        let source = TokenSource::refreshing("client", "secret", "revoked")
            .with_token_url(format!("{}/token", server.uri()));

        let err = source.access_token(&http).await.unwrap_err();

        match err {
            CalbotError::Auth(msg) => assert!(msg.contains("invalid_grant")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
