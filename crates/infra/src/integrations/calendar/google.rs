//! Google Calendar store

use async_trait::async_trait;
use calbot_core::CalendarStore;
use calbot_domain::{CalbotError, CalendarEntry, CalendarEntryDraft, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::auth::TokenSource;
use super::types::{GoogleEvent, GoogleEventInsert, GoogleEventsPage};
use crate::http::HttpClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

/// [`CalendarStore`] backed by the Google Calendar v3 API
pub struct GoogleCalendarStore {
    http: HttpClient,
    tokens: TokenSource,
    api_base: String,
}

impl GoogleCalendarStore {
    pub fn new(http: HttpClient, tokens: TokenSource) -> Self {
        Self { http, tokens, api_base: GOOGLE_CALENDAR_API_BASE.to_string() }
    }

    /// Use another API root, e.g. a mock server.
    ///
    /// # Errors
    /// Returns [`CalbotError::Config`] if `api_base` is not an absolute URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        Url::parse(&api_base)
            .map_err(|e| CalbotError::Config(format!("invalid calendar api_base '{api_base}': {e}")))?;
        self.api_base = api_base.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.api_base, urlencoding::encode(calendar_id))
    }

    fn event_url(&self, calendar_id: &str, entry_id: &str) -> String {
        format!("{}/{}", self.events_url(calendar_id), urlencoding::encode(entry_id))
    }

    /// Send with a bearer token, refreshing once on 401 when the token
    /// source can refresh.
    async fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.tokens.access_token(&self.http).await?;
        let response = self.http.send(build().bearer_auth(token)).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.tokens.is_refreshing() {
            debug!("calendar token rejected; refreshing once");
            self.tokens.invalidate().await;
            let token = self.tokens.access_token(&self.http).await?;
            return self.http.send(build().bearer_auth(token)).await;
        }

        Ok(response)
    }
}

/// Turn a non-2xx response into a domain error.
async fn status_error(response: Response, action: &str) -> CalbotError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    let message = format!("Google API {action} failed ({status}): {error_text}");

    match status.as_u16() {
        401 | 403 => CalbotError::Auth(message),
        404 | 410 => CalbotError::NotFound(message),
        _ => CalbotError::Calendar(message),
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl CalendarStore for GoogleCalendarStore {
    async fn list(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>> {
        let url = self.events_url(calendar_id);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("timeMin", rfc3339(time_min)),
                ("timeMax", rfc3339(time_max)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response =
                self.send_authorized(|| self.http.request(Method::GET, &url).query(&query)).await?;
            if !response.status().is_success() {
                return Err(status_error(response, "list").await);
            }

            let page: GoogleEventsPage = response.json().await.map_err(|e| {
                CalbotError::Calendar(format!("Failed to parse Google response: {e}"))
            })?;
            entries.extend(page.items.into_iter().map(CalendarEntry::from));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(calendar_id, count = entries.len(), %time_min, %time_max, "listed calendar entries");
        Ok(entries)
    }

    async fn get(&self, calendar_id: &str, entry_id: &str) -> Result<CalendarEntry> {
        let url = self.event_url(calendar_id, entry_id);
        let response = self.send_authorized(|| self.http.request(Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(status_error(response, "get").await);
        }

        let event: GoogleEvent = response
            .json()
            .await
            .map_err(|e| CalbotError::Calendar(format!("Failed to parse Google event: {e}")))?;
        Ok(event.into())
    }

    async fn insert(&self, calendar_id: &str, draft: &CalendarEntryDraft) -> Result<CalendarEntry> {
        let url = self.events_url(calendar_id);
        let body = GoogleEventInsert::from(draft);
        let response =
            self.send_authorized(|| self.http.request(Method::POST, &url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(status_error(response, "insert").await);
        }

        let event: GoogleEvent = response
            .json()
            .await
            .map_err(|e| CalbotError::Calendar(format!("Failed to parse created event: {e}")))?;
        if let Some(link) = &event.html_link {
            debug!(id = %event.id, %link, "calendar entry created");
        }
        Ok(event.into())
    }

    async fn delete(&self, calendar_id: &str, entry_id: &str) -> Result<()> {
        let url = self.event_url(calendar_id, entry_id);
        let response = self.send_authorized(|| self.http.request(Method::DELETE, &url)).await?;
        if !response.status().is_success() {
            let err = status_error(response, "delete").await;
            warn!(calendar_id, entry_id, error = %err, "calendar delete rejected");
            return Err(err);
        }
        Ok(())
    }
}
