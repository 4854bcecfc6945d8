//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Aggregation
pub const MERGE_WINDOW_MINUTES: i64 = 30;
pub const MESSAGE_SEPARATOR: &str = " [ADDITIONAL MESSAGE] ";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// Extraction
pub const SAMPLE_COUNT: u32 = 3;
pub const MAX_ORACLE_ATTEMPTS: u32 = 5;
pub const INITIAL_RETRY_DELAY_SECS: u64 = 1;
pub const MAX_RETRY_DELAY_SECS: u64 = 32;
pub const EXTRACTION_WORKERS: usize = 5;

// Date expressions (`YYYY-MM-DDTHH:MM`, unknown digits replaced by `_`)
pub const DATE_PLACEHOLDER: char = '_';
pub const UNKNOWN_DATE_EXPRESSION: &str = "____-__-__T__:__";

// Calendar
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";
pub const ALL_DAY_START_HOUR: u32 = 8;
pub const ALL_DAY_END_HOUR: u32 = 17;
pub const EVENT_DURATION_MINUTES: i64 = 60;
pub const MAX_DESCRIPTION_PERMALINKS: usize = 3;
pub const DEFAULT_CALENDAR_ID: &str = "primary";
