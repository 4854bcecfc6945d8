//! Parsing and formatting helpers

pub mod event_date;
pub mod time_format;
