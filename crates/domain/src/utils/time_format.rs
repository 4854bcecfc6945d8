//! Human-readable timestamp rendering

use chrono::NaiveDateTime;

/// Render a timestamp as `Thursday, October 23, 2025 at 4:00 PM`.
///
/// Day of week, month name and 12-hour clock give the oracle enough context
/// to resolve relative phrases such as "next Friday".
pub fn readable_timestamp(at: NaiveDateTime) -> String {
    at.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn renders_weekday_month_and_twelve_hour_clock() {
        let at = NaiveDate::from_ymd_opt(2025, 10, 23).unwrap().and_hms_opt(16, 0, 0).unwrap();
        assert_eq!(readable_timestamp(at), "Thursday, October 23, 2025 at 4:00 PM");
    }

    #[test]
    fn morning_times_use_am() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap().and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(readable_timestamp(at), "Sunday, January 5, 2025 at 9:05 AM");
    }
}
