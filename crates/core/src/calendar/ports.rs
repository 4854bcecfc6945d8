//! Port interface for the external calendar store

use async_trait::async_trait;
use calbot_domain::{CalendarEntry, CalendarEntryDraft, Result};
use chrono::{DateTime, Utc};

/// List/get/insert/delete over one calendar
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Entries overlapping `[time_min, time_max)`, recurring series expanded
    /// into individual occurrences.
    async fn list(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>>;

    /// Fetch one entry by id (occurrence or series master).
    async fn get(&self, calendar_id: &str, entry_id: &str) -> Result<CalendarEntry>;

    /// Create an entry and return the stored record.
    async fn insert(&self, calendar_id: &str, draft: &CalendarEntryDraft) -> Result<CalendarEntry>;

    /// Delete an entry. Deleting a series master removes the whole series.
    async fn delete(&self, calendar_id: &str, entry_id: &str) -> Result<()>;
}
