//! Calendar v3 wire types

use calbot_domain::{CalendarEntry, CalendarEntryDraft, EventTime, Reminder, ReminderMethod};
use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const GOOGLE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleEventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    #[serde(rename = "recurringEventId")]
    pub recurring_event_id: Option<String>,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
    pub start: Option<GoogleEventWhen>,
    pub end: Option<GoogleEventWhen>,
}

/// Read-side start/end: `dateTime` for timed events, `date` for all-day ones
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleEventWhen {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "timeZone")]
    pub time_zone: Option<String>,
}

impl GoogleEventWhen {
    /// Wall-clock time in the event's own zone, or in UTC when the zone is
    /// missing or unknown. Unparseable values yield `None`.
    fn to_event_time(&self) -> Option<EventTime> {
        let zone = self.time_zone.as_deref().and_then(|name| name.parse::<Tz>().ok());

        if let Some(raw) = &self.date_time {
            let instant = DateTime::parse_from_rfc3339(raw).ok()?;
            return Some(match zone {
                Some(tz) => EventTime {
                    local: instant.with_timezone(&tz).naive_local(),
                    time_zone: tz.name().to_string(),
                },
                None => EventTime {
                    local: instant.naive_utc(),
                    time_zone: "UTC".to_string(),
                },
            });
        }

        let day = NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;
        Some(EventTime {
            local: day.and_time(NaiveTime::MIN),
            time_zone: zone.map_or_else(|| "UTC".to_string(), |tz| tz.name().to_string()),
        })
    }
}

impl From<GoogleEvent> for CalendarEntry {
    fn from(event: GoogleEvent) -> Self {
        CalendarEntry {
            id: event.id,
            title: event.summary.unwrap_or_default(),
            description: event.description,
            location: event.location,
            recurrence: event.recurrence,
            recurring_event_id: event.recurring_event_id,
            html_link: event.html_link,
            start: event.start.as_ref().and_then(GoogleEventWhen::to_event_time),
            end: event.end.as_ref().and_then(GoogleEventWhen::to_event_time),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleEventInsert {
    pub summary: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    pub reminders: GoogleReminders,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleReminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<GoogleReminder>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleReminder {
    pub method: &'static str,
    pub minutes: u32,
}

impl From<&Reminder> for GoogleReminder {
    fn from(reminder: &Reminder) -> Self {
        let method = match reminder.method {
            ReminderMethod::Email => "email",
            ReminderMethod::Popup => "popup",
        };
        Self { method, minutes: reminder.minutes }
    }
}

impl From<&CalendarEntryDraft> for GoogleEventInsert {
    fn from(draft: &CalendarEntryDraft) -> Self {
        Self {
            summary: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start: GoogleEventTime {
                date_time: draft.start.local.format(GOOGLE_DATETIME_FORMAT).to_string(),
                time_zone: draft.start.time_zone.clone(),
            },
            end: GoogleEventTime {
                date_time: draft.end.local.format(GOOGLE_DATETIME_FORMAT).to_string(),
                time_zone: draft.end.time_zone.clone(),
            },
            recurrence: draft.recurrence.clone(),
            reminders: GoogleReminders {
                use_default: false,
                overrides: draft.reminders.iter().map(GoogleReminder::from).collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleTokenRefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
