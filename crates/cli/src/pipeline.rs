//! Staged pipeline runner
//!
//! Each stage reads and writes a JSON batch file so that any stage can be
//! re-run on its own:
//!
//! 1. `stage1_messages`: collected chat records
//! 2. `stage2_aggregated`: normalized and merged messages
//! 3. `stage3_events`: one extraction result per aggregated message
//! 4. calendar sync (no file)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use calbot_core::{
    ingest::filter_time_range, CalendarStore, CalendarSyncEngine, ExtractionOrchestrator,
    ExtractionSettings, InferenceOracle, MessageNormalizer, SyncSettings, UserDirectory,
    UserNameCache, WindowAggregator,
};
use calbot_domain::{AggregatedMessage, Config, Message, MessageExtract, SyncSummary};
use calbot_infra::storage::{aggregated_path_for_events, read_json, write_json, StagePaths};
use chrono::{Duration, NaiveDateTime};
use tracing::{info, instrument, warn};

use crate::adapters::AdapterFactory;

/// Options of a full `run`
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Stage-1 file; defaults to the staged name inside `output_dir`
    pub messages: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub use_cache: bool,
    pub skip_calendar: bool,
    pub overwrite: bool,
}

/// What a full run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub messages: usize,
    pub aggregated: usize,
    pub events: usize,
    pub sync: Option<SyncSummary>,
}

/// Stage implementations over one configuration
pub struct Pipeline {
    config: Config,
    directory: Arc<dyn UserDirectory>,
}

impl Pipeline {
    pub fn new(config: Config, directory: Arc<dyn UserDirectory>) -> Self {
        Self { config, directory }
    }

    /// Normalize, validate and merge a batch of collected records.
    ///
    /// With a `range`, records outside `[start, end]` are dropped first.
    /// Records with unreadable timestamps are logged and skipped.
    pub async fn aggregate(
        &self,
        messages: Vec<Message>,
        range: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> anyhow::Result<Vec<AggregatedMessage>> {
        // Stage-1 rows are addressed by their position in the input file.
        let messages: Vec<Message> = messages
            .into_iter()
            .enumerate()
            .map(|(row, mut message)| {
                if message.original_indices.is_empty() {
                    message.original_indices.push(row);
                }
                message
            })
            .collect();

        let messages = match range {
            Some((start, end)) => filter_time_range(messages, start, end),
            None => messages,
        };

        let mut cache = UserNameCache::new();
        let normalized =
            MessageNormalizer::new(Arc::clone(&self.directory)).normalize(messages, &mut cache).await;

        let (valid, rejected) = WindowAggregator::partition_valid(normalized);
        if !rejected.is_empty() {
            warn!(rejected = rejected.len(), "skipped records with unreadable timestamps");
        }

        let window = Duration::minutes(self.config.aggregation.window_minutes);
        let aggregated = WindowAggregator::new(window).aggregate(&valid)?;
        info!(input = valid.len(), output = aggregated.len(), "aggregation complete");
        Ok(aggregated)
    }

    /// Run the extraction orchestrator over aggregated messages.
    pub async fn extract(
        &self,
        oracle: Arc<dyn InferenceOracle>,
        aggregated: &[AggregatedMessage],
    ) -> anyhow::Result<Vec<MessageExtract>> {
        let settings = ExtractionSettings::from_config(&self.config.extraction)?;
        let orchestrator = ExtractionOrchestrator::new(oracle).with_settings(settings);
        Ok(orchestrator.extract_all(aggregated).await)
    }

    /// Write extracted candidates to the calendar.
    ///
    /// `permalinks[i]` are the source links of the message behind
    /// `extracts[i]`.
    pub async fn sync(
        &self,
        store: Arc<dyn CalendarStore>,
        extracts: &[MessageExtract],
        permalinks: &[Vec<String>],
        overwrite: bool,
    ) -> anyhow::Result<SyncSummary> {
        let settings = SyncSettings::from_config(&self.config.calendar)?;
        let engine = CalendarSyncEngine::new(store, settings);
        Ok(engine.sync_batch(extracts, permalinks, overwrite).await)
    }

    /// Stage 2 from a stage-1 file.
    pub async fn aggregate_file(&self, input: &Path, output: &Path) -> anyhow::Result<usize> {
        let messages: Vec<Message> = read_json(input)?;
        let aggregated = self.aggregate(messages, None).await?;
        write_json(output, &aggregated)?;
        Ok(aggregated.len())
    }

    /// Stage 3 from a stage-2 file.
    pub async fn extract_file(
        &self,
        adapters: &dyn AdapterFactory,
        input: &Path,
        output: &Path,
    ) -> anyhow::Result<usize> {
        let aggregated: Vec<AggregatedMessage> = read_json(input)?;
        let extracts = self.extract(adapters.oracle()?, &aggregated).await?;
        write_json(output, &extracts)?;
        Ok(total_events(&extracts))
    }

    /// Stage 4 from a stage-3 file.
    ///
    /// Permalinks come from `messages` when given, otherwise from the
    /// stage-2 file next to `events`. Without either, entries are created
    /// without source links.
    pub async fn sync_file(
        &self,
        adapters: &dyn AdapterFactory,
        events: &Path,
        messages: Option<&Path>,
        overwrite: bool,
    ) -> anyhow::Result<SyncSummary> {
        let extracts: Vec<MessageExtract> = read_json(events)?;
        let permalinks = load_permalinks(events, messages)?;
        self.sync(adapters.calendar()?, &extracts, &permalinks, overwrite).await
    }

    /// Run every stage for one time range.
    #[instrument(skip_all, fields(start = %options.start, end = %options.end))]
    pub async fn run(
        &self,
        adapters: &dyn AdapterFactory,
        options: &RunOptions,
    ) -> anyhow::Result<RunReport> {
        anyhow::ensure!(options.start <= options.end, "--start must not be after --end");

        let paths = StagePaths::new(&options.output_dir, options.start, options.end);
        let stage1 = options.messages.clone().unwrap_or_else(|| paths.messages());
        let mut report = RunReport::default();

        let aggregated: Vec<AggregatedMessage> =
            if options.use_cache && paths.aggregated().exists() {
                info!(path = %paths.aggregated().display(), "using cached aggregated messages");
                read_json(&paths.aggregated())?
            } else {
                let messages: Vec<Message> = read_json(&stage1)
                    .with_context(|| format!("reading collected messages {}", stage1.display()))?;
                report.messages = messages.len();
                let aggregated =
                    self.aggregate(messages, Some((options.start, options.end))).await?;
                write_json(&paths.aggregated(), &aggregated)?;
                aggregated
            };
        report.aggregated = aggregated.len();

        let extracts: Vec<MessageExtract> = if options.use_cache && paths.events().exists() {
            info!(path = %paths.events().display(), "using cached extraction results");
            read_json(&paths.events())?
        } else {
            let extracts = self.extract(adapters.oracle()?, &aggregated).await?;
            write_json(&paths.events(), &extracts)?;
            extracts
        };
        report.events = total_events(&extracts);
        info!(
            messages = aggregated.len(),
            events = report.events,
            "extracted events from aggregated messages"
        );

        if options.skip_calendar {
            info!("skipping calendar sync");
            return Ok(report);
        }

        let permalinks: Vec<Vec<String>> =
            aggregated.iter().map(|message| message.permalinks.clone()).collect();
        report.sync =
            Some(self.sync(adapters.calendar()?, &extracts, &permalinks, options.overwrite).await?);
        Ok(report)
    }
}

fn total_events(extracts: &[MessageExtract]) -> usize {
    extracts.iter().map(|extract| extract.events.len()).sum()
}

fn load_permalinks(events: &Path, messages: Option<&Path>) -> anyhow::Result<Vec<Vec<String>>> {
    let source = match messages {
        Some(path) => Some(path.to_path_buf()),
        None => aggregated_path_for_events(events).filter(|path| path.exists()),
    };

    let Some(source) = source else {
        warn!(events = %events.display(), "no aggregated messages found; syncing without permalinks");
        return Ok(Vec::new());
    };

    let aggregated: Vec<AggregatedMessage> = read_json(&source)?;
    Ok(aggregated.into_iter().map(|message| message.permalinks).collect())
}
