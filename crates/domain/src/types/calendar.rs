//! Calendar store records and sync results

use std::ops::AddAssign;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// An entry as held by the external calendar store
///
/// When the store expands recurring series, each occurrence carries the id
/// of its series master in `recurring_event_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    #[serde(default)]
    pub recurring_event_id: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    /// Start time as reported by the store; absent for records that carry
    /// no time (e.g. a bare series master)
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

impl CalendarEntry {
    /// Whether this record is an occurrence expanded from a series.
    pub fn is_instance(&self) -> bool {
        self.recurring_event_id.is_some()
    }

    /// Whether this record defines a recurring series.
    pub fn is_series_master(&self) -> bool {
        !self.recurrence.is_empty()
    }
}

/// Local wall-clock time paired with the IANA zone it is expressed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    pub local: NaiveDateTime,
    pub time_zone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

impl_domain_status_conversions!(ReminderMethod {
    Email => "email",
    Popup => "popup",
});

/// Reminder override attached to a created entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

impl Reminder {
    pub fn email(minutes: u32) -> Self {
        Self { method: ReminderMethod::Email, minutes }
    }
}

/// Body of a calendar insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntryDraft {
    pub title: String,
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    /// RRULE lines; empty for single occurrences
    pub recurrence: Vec<String>,
    pub reminders: Vec<Reminder>,
}

/// Counts reported by one synchronization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub created: usize,
    pub duplicates: usize,
    pub errors: usize,
}

impl SyncSummary {
    /// Total candidates accounted for.
    pub fn total(&self) -> usize {
        self.created + self.duplicates + self.errors
    }
}

impl AddAssign for SyncSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.duplicates += rhs.duplicates;
        self.errors += rhs.errors;
    }
}
