//! Windowed message aggregation
//!
//! Chat users often split one announcement across several posts, or repost
//! a correction a few minutes later. The aggregator folds such runs into a
//! single unit before extraction so the oracle sees the whole announcement
//! once.

mod window;

pub use window::{RejectedRecord, WindowAggregator};
