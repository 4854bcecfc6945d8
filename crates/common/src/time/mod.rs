//! Time abstraction for retry loops
//!
//! Production code sleeps through [`TokioSleeper`]; tests hand a
//! [`RecordingSleeper`] to the component under test and assert on the exact
//! delays requested, without any wall-clock waiting.

pub mod sleeper;

pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
