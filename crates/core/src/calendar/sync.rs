//! Calendar sync engine - core business logic

use std::sync::Arc;

use calbot_domain::{
    CalbotError, CalendarEntry, EventCandidate, EventSchedule, MessageExtract, Result, SyncSummary,
};
use tracing::{debug, info, instrument, warn};

use super::entry::{build_draft, schedule_for, SyncSettings};
use super::ports::CalendarStore;

/// A same-day entry whose title matches a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingRecord {
    /// A one-off entry, or an occurrence whose master carries no recurrence
    Single(CalendarEntry),
    /// The master of the recurring series the matching occurrence belongs to
    SeriesMaster(CalendarEntry),
    /// An occurrence whose master could not be fetched; only this occurrence
    /// may be replaced
    InstanceOnly(CalendarEntry),
}

impl ExistingRecord {
    /// The record a replacement deletes.
    pub fn entry(&self) -> &CalendarEntry {
        match self {
            Self::Single(entry) | Self::SeriesMaster(entry) | Self::InstanceOnly(entry) => entry,
        }
    }
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(CalendarEntry),
    Duplicate(ExistingRecord),
    Replaced { removed: ExistingRecord, created: CalendarEntry },
}

/// Writes extracted candidates into a calendar store
///
/// Candidates are processed one at a time; the engine assumes it is the only
/// writer to the calendar for the duration of a run.
pub struct CalendarSyncEngine {
    store: Arc<dyn CalendarStore>,
    settings: SyncSettings,
}

impl CalendarSyncEngine {
    pub fn new(store: Arc<dyn CalendarStore>, settings: SyncSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Sync a batch of extraction results.
    ///
    /// `permalinks[i]` holds the source links of the message behind
    /// `extracts[i]`; a missing entry means no links. Every candidate ends up
    /// counted exactly once as created, duplicate or error.
    #[instrument(skip_all, fields(extracts = extracts.len(), overwrite = overwrite))]
    pub async fn sync_batch(
        &self,
        extracts: &[MessageExtract],
        permalinks: &[Vec<String>],
        overwrite: bool,
    ) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for (index, extract) in extracts.iter().enumerate() {
            let links = permalinks.get(index).map(Vec::as_slice).unwrap_or_default();
            for candidate in &extract.events {
                match self.sync_candidate(candidate, links, overwrite).await {
                    Ok(SyncOutcome::Created(entry)) => {
                        info!(title = %entry.title, id = %entry.id, "created calendar entry");
                        summary.created += 1;
                    }
                    Ok(SyncOutcome::Replaced { removed, created }) => {
                        info!(
                            title = %created.title,
                            removed = %removed.entry().id,
                            id = %created.id,
                            "replaced calendar entry"
                        );
                        summary.created += 1;
                    }
                    Ok(SyncOutcome::Duplicate(existing)) => {
                        info!(
                            title = %existing.entry().title,
                            id = %existing.entry().id,
                            "skipping duplicate calendar entry"
                        );
                        summary.duplicates += 1;
                    }
                    Err(err) => {
                        warn!(
                            message_index = index,
                            title = %candidate.title(),
                            date = %candidate.date_expression(),
                            error = %err,
                            "failed to sync candidate"
                        );
                        summary.errors += 1;
                    }
                }
            }
        }

        info!(
            created = summary.created,
            duplicates = summary.duplicates,
            errors = summary.errors,
            "calendar sync complete"
        );
        summary
    }

    /// Create, skip or replace one candidate.
    ///
    /// # Errors
    /// Unschedulable dates, failed listings, failed deletes and failed inserts
    /// all surface as errors; nothing is written after a failed delete.
    pub async fn sync_candidate(
        &self,
        candidate: &EventCandidate,
        permalinks: &[String],
        overwrite: bool,
    ) -> Result<SyncOutcome> {
        let schedule = schedule_for(candidate)?;
        let title = candidate.title();

        let existing = self.find_existing(&title, &schedule).await?;

        let removed = match existing {
            Some(record) if !overwrite => return Ok(SyncOutcome::Duplicate(record)),
            Some(record) => {
                let target = &record.entry().id;
                self.store.delete(&self.settings.calendar_id, target).await.map_err(|err| {
                    CalbotError::Calendar(format!("delete of '{target}' failed: {err}"))
                })?;
                debug!(%title, id = %target, "deleted existing entry for overwrite");
                Some(record)
            }
            None => None,
        };

        let draft = build_draft(candidate, &schedule, permalinks, &self.settings)?;
        let created = self.store.insert(&self.settings.calendar_id, &draft).await?;

        Ok(match removed {
            Some(removed) => SyncOutcome::Replaced { removed, created },
            None => SyncOutcome::Created(created),
        })
    }

    /// Find a same-day entry with exactly `title`, resolving occurrences of
    /// a recurring series to their master.
    ///
    /// # Errors
    /// A failed listing is an error. A failed master lookup is not: the
    /// occurrence itself is returned as [`ExistingRecord::InstanceOnly`].
    pub async fn find_existing(
        &self,
        title: &str,
        schedule: &EventSchedule,
    ) -> Result<Option<ExistingRecord>> {
        let (time_min, time_max) = self.settings.day_bounds(schedule.date)?;
        let entries = self.store.list(&self.settings.calendar_id, time_min, time_max).await?;

        let Some(found) = entries.into_iter().find(|entry| entry.title == title) else {
            return Ok(None);
        };

        let Some(master_id) = found.recurring_event_id.clone() else {
            return Ok(Some(ExistingRecord::Single(found)));
        };

        match self.store.get(&self.settings.calendar_id, &master_id).await {
            Ok(master) if master.is_series_master() => Ok(Some(ExistingRecord::SeriesMaster(master))),
            Ok(_) => Ok(Some(ExistingRecord::Single(found))),
            Err(err) => {
                warn!(
                    %title,
                    instance = %found.id,
                    master = %master_id,
                    error = %err,
                    "could not resolve series master; treating occurrence as the duplicate"
                );
                Ok(Some(ExistingRecord::InstanceOnly(found)))
            }
        }
    }
}
