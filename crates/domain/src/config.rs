//! Configuration structures
//!
//! Every section has serde defaults, so a config file only needs the keys it
//! changes. Secrets (API keys, OAuth tokens) never live here; adapters read
//! them from the environment.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALL_DAY_END_HOUR, ALL_DAY_START_HOUR, DEFAULT_CALENDAR_ID, DEFAULT_TIME_ZONE,
    EVENT_DURATION_MINUTES, EXTRACTION_WORKERS, INITIAL_RETRY_DELAY_SECS, MAX_DESCRIPTION_PERMALINKS,
    MAX_ORACLE_ATTEMPTS, MAX_RETRY_DELAY_SECS, MERGE_WINDOW_MINUTES, SAMPLE_COUNT,
};
use crate::errors::{CalbotError, Result};
use crate::types::Reminder;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aggregation: AggregationConfig,
    pub extraction: ExtractionConfig,
    pub calendar: CalendarConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Messages within this many minutes of a group's first message merge
    /// into it
    pub window_minutes: i64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self { window_minutes: MERGE_WINDOW_MINUTES }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub model: String,
    pub api_url: String,
    pub sample_count: u32,
    pub workers: usize,
    pub max_attempts: u32,
    pub initial_retry_delay_secs: u64,
    pub max_retry_delay_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            sample_count: SAMPLE_COUNT,
            workers: EXTRACTION_WORKERS,
            max_attempts: MAX_ORACLE_ATTEMPTS,
            initial_retry_delay_secs: INITIAL_RETRY_DELAY_SECS,
            max_retry_delay_secs: MAX_RETRY_DELAY_SECS,
            temperature: 1.0,
            max_tokens: 4_096,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub calendar_id: String,
    /// IANA zone used for entry times and for day-window queries
    pub time_zone: String,
    pub all_day_start_hour: u32,
    pub all_day_end_hour: u32,
    pub event_duration_minutes: i64,
    pub max_permalinks: usize,
    pub api_base: String,
    pub reminders: Vec<Reminder>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            all_day_start_hour: ALL_DAY_START_HOUR,
            all_day_end_hour: ALL_DAY_END_HOUR,
            event_duration_minutes: EVENT_DURATION_MINUTES,
            max_permalinks: MAX_DESCRIPTION_PERMALINKS,
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            reminders: vec![Reminder::email(24 * 60), Reminder::email(60)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the staged batch files
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: "output".to_string() }
    }
}

impl CalendarConfig {
    /// Parsed IANA time zone.
    ///
    /// # Errors
    /// Returns [`CalbotError::Config`] for unknown zone names.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.time_zone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| CalbotError::Config(format!("unknown time zone '{}': {e}", self.time_zone)))
    }
}

impl Config {
    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns [`CalbotError::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.aggregation.window_minutes < 0 {
            return Err(CalbotError::Config("aggregation.window_minutes must be >= 0".into()));
        }
        if self.extraction.workers == 0 {
            return Err(CalbotError::Config("extraction.workers must be >= 1".into()));
        }
        if self.extraction.sample_count == 0 {
            return Err(CalbotError::Config("extraction.sample_count must be >= 1".into()));
        }
        if self.extraction.max_attempts == 0 {
            return Err(CalbotError::Config("extraction.max_attempts must be >= 1".into()));
        }
        if self.extraction.initial_retry_delay_secs > self.extraction.max_retry_delay_secs {
            return Err(CalbotError::Config(
                "extraction.initial_retry_delay_secs exceeds max_retry_delay_secs".into(),
            ));
        }
        let calendar = &self.calendar;
        calendar.tz()?;
        if calendar.all_day_start_hour >= calendar.all_day_end_hour || calendar.all_day_end_hour > 23
        {
            return Err(CalbotError::Config(format!(
                "calendar all-day hours {}..{} are not a valid range",
                calendar.all_day_start_hour, calendar.all_day_end_hour
            )));
        }
        if calendar.event_duration_minutes <= 0 {
            return Err(CalbotError::Config("calendar.event_duration_minutes must be > 0".into()));
        }
        if calendar.calendar_id.trim().is_empty() {
            return Err(CalbotError::Config("calendar.calendar_id must not be empty".into()));
        }
        Ok(())
    }
}
