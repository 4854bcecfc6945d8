//! Calendar synchronization
//!
//! Candidates are matched against the store by exact title on the same local
//! day. A match is a duplicate unless overwrite is on, in which case the
//! matched record (the whole series when it is a recurring master) is
//! deleted and the candidate is created afresh.

pub mod entry;
pub mod ports;
mod sync;

pub use entry::{build_draft, describe, SyncSettings};
pub use sync::{CalendarSyncEngine, ExistingRecord, SyncOutcome};
