//! Stage output files
//!
//! Each pipeline stage writes one pretty-printed JSON array. File names carry
//! the stage and the batch time range so reruns over the same range find
//! (and with `--use-cache` reuse) earlier outputs.

use std::fs;
use std::path::{Path, PathBuf};

use calbot_domain::{CalbotError, Result};
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::InfraError;

const RANGE_FORMAT: &str = "%Y%m%d_%H%M";

/// Pipeline stage whose output a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Messages,
    Aggregated,
    Events,
}

impl Stage {
    fn prefix(self) -> &'static str {
        match self {
            Self::Messages => "stage1_messages",
            Self::Aggregated => "stage2_aggregated",
            Self::Events => "stage3_events",
        }
    }
}

/// Output locations for one batch time range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePaths {
    directory: PathBuf,
    range: String,
}

impl StagePaths {
    pub fn new(directory: impl Into<PathBuf>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            directory: directory.into(),
            range: format!("{}_{}", start.format(RANGE_FORMAT), end.format(RANGE_FORMAT)),
        }
    }

    pub fn path(&self, stage: Stage) -> PathBuf {
        self.directory.join(format!("{}_{}.json", stage.prefix(), self.range))
    }

    pub fn messages(&self) -> PathBuf {
        self.path(Stage::Messages)
    }

    pub fn aggregated(&self) -> PathBuf {
        self.path(Stage::Aggregated)
    }

    pub fn events(&self) -> PathBuf {
        self.path(Stage::Events)
    }
}

/// Stage-2 file produced alongside a stage-3 file, if the name follows the
/// staged naming scheme.
pub fn aggregated_path_for_events(events: &Path) -> Option<PathBuf> {
    let name = events.file_name()?.to_str()?;
    let range = name.strip_prefix(Stage::Events.prefix())?;
    Some(events.with_file_name(format!("{}{}", Stage::Aggregated.prefix(), range)))
}

/// Read a JSON document.
///
/// # Errors
/// [`CalbotError::NotFound`] for a missing file, [`CalbotError::DataFormat`]
/// for content that does not match `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        let InfraError(err) = InfraError::from(e);
        with_path(err, path)
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        let InfraError(err) = InfraError::from(e);
        with_path(err, path)
    })
}

/// Write `value` as pretty JSON, creating parent directories.
///
/// # Errors
/// [`CalbotError::Io`] when the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CalbotError::from(InfraError::from(e)))?;
    }
    let contents =
        serde_json::to_string_pretty(value).map_err(|e| CalbotError::from(InfraError::from(e)))?;
    fs::write(path, contents).map_err(|e| CalbotError::from(InfraError::from(e)))?;
    debug!(path = %path.display(), "wrote stage file");
    Ok(())
}

fn with_path(err: CalbotError, path: &Path) -> CalbotError {
    let shown = path.display();
    match err {
        CalbotError::NotFound(msg) => CalbotError::NotFound(format!("{shown}: {msg}")),
        CalbotError::DataFormat(msg) => CalbotError::DataFormat(format!("{shown}: {msg}")),
        CalbotError::Io(msg) => CalbotError::Io(format!("{shown}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use calbot_domain::{ChannelType, Message, MessageExtract};
    use tempfile::TempDir;

    use super::*;

    fn range() -> (NaiveDateTime, NaiveDateTime) {
        ("2025-10-20T00:00:00".parse().unwrap(), "2025-10-26T23:59:00".parse().unwrap())
    }

    #[test]
    fn stage_paths_encode_stage_and_range() {
        let (start, end) = range();
        let paths = StagePaths::new("output", start, end);

        assert_eq!(
            paths.messages(),
            PathBuf::from("output/stage1_messages_20251020_0000_20251026_2359.json")
        );
        assert_eq!(
            paths.events(),
            PathBuf::from("output/stage3_events_20251020_0000_20251026_2359.json")
        );
    }

    #[test]
    fn aggregated_path_is_derived_from_events_path() {
        let (start, end) = range();
        let paths = StagePaths::new("/data/runs", start, end);

        assert_eq!(aggregated_path_for_events(&paths.events()), Some(paths.aggregated()));
        assert_eq!(aggregated_path_for_events(Path::new("/tmp/custom.json")), None);
    }

    #[test]
    fn round_trips_messages_through_nested_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/run/stage1.json");
        let messages = vec![Message {
            workspace: "lab".into(),
            channel: "seminars".into(),
            channel_type: ChannelType::External,
            sender: "ada".into(),
            timestamp: "2025-10-20T09:00:00".into(),
            text: "Talk Friday".into(),
            urls: vec![],
            file_paths: vec![],
            permalinks: vec!["https://chat.example/p1".into()],
            original_indices: vec![0],
        }];

        write_json(&path, &messages).unwrap();
        let read: Vec<Message> = read_json(&path).unwrap();

        assert_eq!(read, messages);
        assert!(std::fs::read_to_string(&path).unwrap().contains("\n  {"));
    }

    #[test]
    fn missing_and_malformed_files_are_distinct_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.json");
        let malformed = dir.path().join("bad.json");
        std::fs::write(&malformed, "[{\"events\": 3}]").unwrap();

        let missing_err = read_json::<Vec<MessageExtract>>(&missing).unwrap_err();
        let malformed_err = read_json::<Vec<MessageExtract>>(&malformed).unwrap_err();

        assert!(matches!(missing_err, CalbotError::NotFound(_)));
        match malformed_err {
            CalbotError::DataFormat(msg) => assert!(msg.contains("bad.json")),
            other => panic!("expected data format error, got {other:?}"),
        }
    }
}
