//! Resilience primitives
//!
//! Only retry with exponential backoff lives here. The retry loop is
//! modelled as an explicit state machine ([`RetryState`]) so callers can
//! drive it around any fallible operation, sync or async, and tests can
//! assert on every transition without sleeping.

pub mod retry;

pub use retry::{BackoffPolicy, PolicyError, RetryState, RetryStep};
