//! Placeholder date expressions
//!
//! Extracted candidates carry their date as `YYYY-MM-DDTHH:MM`, with `_` in
//! every digit position the announcement did not state. Parsing treats a
//! placeholder digit as `0`, then:
//!
//! - a zero year, month or day makes the expression unschedulable;
//! - an hour and minute made entirely of placeholders means "time unknown",
//!   which schedules as an all-day block;
//! - anything else is a timed start, including an explicit `00:00`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::DATE_PLACEHOLDER;
use crate::errors::{CalbotError, Result};

/// Calendar placement of a parsed date expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSchedule {
    pub date: NaiveDate,
    /// `None` when the announcement gave no time of day
    pub time: Option<NaiveTime>,
}

impl EventSchedule {
    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    /// Start and end in local wall-clock time.
    ///
    /// All-day schedules span `all_day_start_hour..all_day_end_hour`; timed
    /// schedules last `duration`.
    pub fn window(
        &self,
        all_day_start_hour: u32,
        all_day_end_hour: u32,
        duration: Duration,
    ) -> Result<(NaiveDateTime, NaiveDateTime)> {
        match self.time {
            Some(time) => {
                let start = self.date.and_time(time);
                Ok((start, start + duration))
            }
            None => {
                let start = self.date.and_hms_opt(all_day_start_hour, 0, 0);
                let end = self.date.and_hms_opt(all_day_end_hour, 0, 0);
                start.zip(end).ok_or_else(|| {
                    CalbotError::Config(format!(
                        "invalid all-day hours {all_day_start_hour}..{all_day_end_hour}"
                    ))
                })
            }
        }
    }
}

/// Parse a `YYYY-MM-DDTHH:MM` expression with `_` placeholders.
///
/// # Errors
/// Returns [`CalbotError::Unschedulable`] when the expression is malformed,
/// has a zero year, month or day, or names a date or time that does not
/// exist.
pub fn parse_event_date(expression: &str) -> Result<EventSchedule> {
    let raw = expression.trim();
    let unschedulable = |reason: &str| CalbotError::Unschedulable(format!("'{raw}': {reason}"));

    let (date_part, time_part) =
        raw.split_once('T').ok_or_else(|| unschedulable("missing 'T' separator"))?;

    let date_fields: Vec<&str> = date_part.split('-').collect();
    let time_fields: Vec<&str> = time_part.split(':').collect();
    let ([year, month, day], [hour, minute]) = (date_fields.as_slice(), time_fields.as_slice())
    else {
        return Err(unschedulable("expected YYYY-MM-DDTHH:MM"));
    };

    let year = component(year).ok_or_else(|| unschedulable("invalid year"))?;
    let month = component(month).ok_or_else(|| unschedulable("invalid month"))?;
    let day = component(day).ok_or_else(|| unschedulable("invalid day"))?;

    if year == 0 || month == 0 || day == 0 {
        return Err(unschedulable("year, month and day must be known"));
    }

    let year = i32::try_from(year).map_err(|_| unschedulable("year out of range"))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| unschedulable("date does not exist"))?;

    if is_placeholder(hour) && is_placeholder(minute) {
        return Ok(EventSchedule { date, time: None });
    }

    let hour = component(hour).ok_or_else(|| unschedulable("invalid hour"))?;
    let minute = component(minute).ok_or_else(|| unschedulable("invalid minute"))?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| unschedulable("time does not exist"))?;

    Ok(EventSchedule { date, time: Some(time) })
}

fn is_placeholder(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c == DATE_PLACEHOLDER)
}

/// Numeric value of one component, placeholders counting as zero.
fn component(field: &str) -> Option<u32> {
    if field.is_empty() {
        return None;
    }
    field.chars().try_fold(0u32, |acc, c| {
        let digit = if c == DATE_PLACEHOLDER { 0 } else { c.to_digit(10)? };
        acc.checked_mul(10)?.checked_add(digit)
    })
}
