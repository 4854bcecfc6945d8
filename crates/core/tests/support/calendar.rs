use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calbot_core::calendar::ports::CalendarStore;
use calbot_domain::{
    CalbotError, CalendarEntry, CalendarEntryDraft, Result as DomainResult,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::New_York;

#[derive(Debug, Clone)]
struct Stored {
    entry: CalendarEntry,
    start: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    /// Occurrences as returned by `list` (series already expanded)
    listed: Vec<Stored>,
    /// Records reachable through `get` only (series masters)
    masters: Vec<CalendarEntry>,
    inserted: Vec<CalendarEntryDraft>,
    deleted: Vec<String>,
    list_calls: usize,
    next_id: usize,
    fail_list: bool,
    fail_get: bool,
    fail_delete: bool,
    fail_insert: bool,
}

/// In-memory mock for `CalendarStore`.
///
/// Seeded occurrences are listed by start time; masters are only reachable
/// through `get`. Inserted drafts become listable occurrences, so a second
/// sync of the same candidate sees the first one as a duplicate.
#[derive(Clone, Default)]
pub struct InMemoryCalendarStore {
    state: Arc<Mutex<State>>,
}

/// Interpret a naive wall-clock time in the default sync zone.
pub fn new_york(local: &str) -> DateTime<Utc> {
    let naive: NaiveDateTime = local.parse().unwrap();
    New_York.from_local_datetime(&naive).earliest().unwrap().with_timezone(&Utc)
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listable entry starting at `local` New York time.
    pub fn with_entry(self, entry: CalendarEntry, local: &str) -> Self {
        self.state.lock().unwrap().listed.push(Stored { entry, start: new_york(local) });
        self
    }

    /// Add a series master reachable through `get`.
    pub fn with_master(self, master: CalendarEntry) -> Self {
        self.state.lock().unwrap().masters.push(master);
        self
    }

    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    pub fn failing_get(self) -> Self {
        self.state.lock().unwrap().fail_get = true;
        self
    }

    pub fn failing_delete(self) -> Self {
        self.state.lock().unwrap().fail_delete = true;
        self
    }

    pub fn failing_insert(self) -> Self {
        self.state.lock().unwrap().fail_insert = true;
        self
    }

    pub fn inserted(&self) -> Vec<CalendarEntryDraft> {
        self.state.lock().unwrap().inserted.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn listed_titles(&self) -> Vec<String> {
        self.state.lock().unwrap().listed.iter().map(|s| s.entry.title.clone()).collect()
    }
}

#[async_trait]
impl CalendarStore for InMemoryCalendarStore {
    async fn list(
        &self,
        _calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<CalendarEntry>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if state.fail_list {
            return Err(CalbotError::Calendar("list unavailable".into()));
        }
        Ok(state
            .listed
            .iter()
            .filter(|stored| stored.start >= time_min && stored.start < time_max)
            .map(|stored| stored.entry.clone())
            .collect())
    }

    async fn get(&self, _calendar_id: &str, entry_id: &str) -> DomainResult<CalendarEntry> {
        let state = self.state.lock().unwrap();
        if state.fail_get {
            return Err(CalbotError::Calendar("get unavailable".into()));
        }
        state
            .masters
            .iter()
            .cloned()
            .chain(state.listed.iter().map(|stored| stored.entry.clone()))
            .find(|entry| entry.id == entry_id)
            .ok_or_else(|| CalbotError::NotFound(entry_id.to_string()))
    }

    async fn insert(
        &self,
        _calendar_id: &str,
        draft: &CalendarEntryDraft,
    ) -> DomainResult<CalendarEntry> {
        let mut state = self.state.lock().unwrap();
        if state.fail_insert {
            return Err(CalbotError::Calendar("insert rejected".into()));
        }
        state.next_id += 1;
        let entry = CalendarEntry {
            id: format!("created-{}", state.next_id),
            title: draft.title.clone(),
            description: Some(draft.description.clone()),
            location: draft.location.clone(),
            recurrence: draft.recurrence.clone(),
            recurring_event_id: None,
            html_link: None,
            start: Some(draft.start.clone()),
            end: Some(draft.end.clone()),
        };
        let start = New_York
            .from_local_datetime(&draft.start.local)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        state.inserted.push(draft.clone());
        state.listed.push(Stored { entry: entry.clone(), start });
        Ok(entry)
    }

    async fn delete(&self, _calendar_id: &str, entry_id: &str) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(CalbotError::Calendar("delete rejected".into()));
        }
        state.deleted.push(entry_id.to_string());
        state.masters.retain(|master| master.id != entry_id);
        state.listed.retain(|stored| {
            stored.entry.id != entry_id
                && stored.entry.recurring_event_id.as_deref() != Some(entry_id)
        });
        Ok(())
    }
}
