//! Ingest normalization
//!
//! Collected records arrive with raw user-id mentions and sometimes without
//! their URL list. Normalization resolves display names through a
//! [`ports::UserDirectory`], backfills URLs from the text, drops empty posts
//! and restricts a batch to its time range.

mod cache;
mod normalize;
pub mod ports;

pub use cache::UserNameCache;
pub use normalize::{extract_urls, filter_time_range, MessageNormalizer};
