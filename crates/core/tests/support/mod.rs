//! Shared test helpers for `calbot-core` integration tests.
//!
//! In-memory stand-ins for the three ports plus record builders, so the
//! scenario tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod directory;
pub mod fixtures;
pub mod oracle;
