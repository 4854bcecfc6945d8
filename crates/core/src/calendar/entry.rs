//! Mapping extracted candidates onto calendar drafts

use calbot_domain::{
    parse_event_date, CalbotError, CalendarConfig, CalendarEntryDraft, EventCandidate,
    EventSchedule, EventTime, Reminder, Result,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Calendar-side settings for one sync run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub calendar_id: String,
    pub time_zone: Tz,
    pub all_day_start_hour: u32,
    pub all_day_end_hour: u32,
    pub event_duration: Duration,
    pub max_permalinks: usize,
    pub reminders: Vec<Reminder>,
}

impl SyncSettings {
    /// # Errors
    /// Returns [`CalbotError::Config`] for an unknown time zone.
    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        Ok(Self {
            calendar_id: config.calendar_id.clone(),
            time_zone: config.tz()?,
            all_day_start_hour: config.all_day_start_hour,
            all_day_end_hour: config.all_day_end_hour,
            event_duration: Duration::minutes(config.event_duration_minutes),
            max_permalinks: config.max_permalinks,
            reminders: config.reminders.clone(),
        })
    }

    /// UTC bounds of the local calendar day containing `date`.
    ///
    /// # Errors
    /// Returns [`CalbotError::Unschedulable`] when local midnight does not
    /// exist in the configured zone.
    pub fn day_bounds(
        &self,
        date: NaiveDate,
    ) -> Result<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)> {
        let start = self.local_midnight(date)?;
        let next = date
            .succ_opt()
            .ok_or_else(|| CalbotError::Unschedulable(format!("no day after {date}")))?;
        let end = self.local_midnight(next)?;
        Ok((start, end))
    }

    fn local_midnight(&self, date: NaiveDate) -> Result<chrono::DateTime<Utc>> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        self.time_zone
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                CalbotError::Unschedulable(format!(
                    "local midnight of {date} does not exist in {}",
                    self.time_zone
                ))
            })
    }
}

/// Description body: short description, kind-specific details, place, and
/// up to `max_permalinks` source links.
pub fn describe(candidate: &EventCandidate, permalinks: &[String], max_permalinks: usize) -> String {
    let mut parts = vec![candidate.short_description().to_string()];

    if let Some(category) = candidate.category() {
        parts.push(format!("\nCategory: {category}"));
        if candidate.lunch_provided() {
            parts.push("Lunch provided: Yes".to_string());
        }
    } else {
        let academic = if candidate.is_academic().unwrap_or(false) { "Yes" } else { "No" };
        parts.push(format!("\nAcademic: {academic}"));
        let recurrence = candidate.recurrence();
        if recurrence.is_recurring() {
            parts.push(format!("Recurring: {recurrence}"));
        }
    }

    if let Some(location) = candidate.location() {
        parts.push(format!("\nLocation: {location}"));
    } else if let Some(link) = candidate.virtual_link() {
        parts.push(format!("\nZoom Link: {link}"));
    }

    if !permalinks.is_empty() && max_permalinks > 0 {
        parts.push("\n\nSource Slack messages:".to_string());
        parts.extend(permalinks.iter().take(max_permalinks).map(|link| format!("  {link}")));
    }

    parts.join("\n")
}

/// Build the insert body for a candidate already placed on `schedule`.
///
/// # Errors
/// Returns [`CalbotError::Config`] if the all-day hours cannot be applied.
pub fn build_draft(
    candidate: &EventCandidate,
    schedule: &EventSchedule,
    permalinks: &[String],
    settings: &SyncSettings,
) -> Result<CalendarEntryDraft> {
    let (start, end) = schedule.window(
        settings.all_day_start_hour,
        settings.all_day_end_hour,
        settings.event_duration,
    )?;
    let zone = settings.time_zone.name().to_string();

    Ok(CalendarEntryDraft {
        title: candidate.title(),
        description: describe(candidate, permalinks, settings.max_permalinks),
        start: EventTime { local: start, time_zone: zone.clone() },
        end: EventTime { local: end, time_zone: zone },
        location: candidate.location().map(str::to_string),
        recurrence: candidate.recurrence().rrule().map(str::to_string).into_iter().collect(),
        reminders: settings.reminders.clone(),
    })
}

/// Parse a candidate's date expression.
pub fn schedule_for(candidate: &EventCandidate) -> Result<EventSchedule> {
    parse_event_date(candidate.date_expression())
}
