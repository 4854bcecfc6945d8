use std::collections::{BTreeMap, HashSet};

use calbot_domain::constants::{MERGE_WINDOW_MINUTES, MESSAGE_SEPARATOR};
use calbot_domain::{AggregatedMessage, CalbotError, Message, Result, SenderKey};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

/// A record that failed validation, with its position in the input batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub index: usize,
    pub error: CalbotError,
}

/// Groups messages by `(workspace, channel, sender)` and merges each run
/// that falls inside a fixed window anchored at the run's first message.
///
/// The window does not slide: a message belongs to the current group only
/// if it is within the window of the group's *first* message, no matter how
/// close it is to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAggregator {
    window: Duration,
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self { window: Duration::minutes(MERGE_WINDOW_MINUTES) }
    }
}

impl WindowAggregator {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Split a batch into records with parseable timestamps and the rest.
    ///
    /// Valid records keep their batch position in `original_indices` when
    /// they did not already carry one, so merged output still points at the
    /// right source rows.
    pub fn partition_valid(messages: Vec<Message>) -> (Vec<Message>, Vec<RejectedRecord>) {
        let mut valid = Vec::with_capacity(messages.len());
        let mut rejected = Vec::new();

        for (index, mut message) in messages.into_iter().enumerate() {
            match message.sent_at() {
                Ok(_) => {
                    if message.original_indices.is_empty() {
                        message.original_indices.push(index);
                    }
                    valid.push(message);
                }
                Err(error) => {
                    warn!(index, sender = %message.sender, error = %error, "rejecting message record");
                    rejected.push(RejectedRecord { index, error });
                }
            }
        }

        (valid, rejected)
    }

    /// Merge a batch into aggregated units, ordered by merged timestamp.
    ///
    /// # Errors
    /// Returns [`CalbotError::DataFormat`] if any record has a malformed
    /// timestamp. Nothing is dropped silently; use
    /// [`WindowAggregator::partition_valid`] first to skip bad records.
    pub fn aggregate(&self, messages: &[Message]) -> Result<Vec<AggregatedMessage>> {
        let mut partitions: BTreeMap<SenderKey, Vec<(NaiveDateTime, usize)>> = BTreeMap::new();
        for (index, message) in messages.iter().enumerate() {
            let sent_at = message.sent_at().map_err(|err| match err {
                CalbotError::DataFormat(detail) => {
                    CalbotError::DataFormat(format!("record {index}: {detail}"))
                }
                other => other,
            })?;
            partitions.entry(message.sender_key()).or_default().push((sent_at, index));
        }

        let mut merged: Vec<(NaiveDateTime, AggregatedMessage)> = Vec::new();
        for (key, mut entries) in partitions {
            entries.sort_by_key(|(sent_at, _)| *sent_at);

            let mut start = 0;
            while start < entries.len() {
                let anchor = entries[start].0;
                let mut end = start + 1;
                while end < entries.len() && entries[end].0 - anchor <= self.window {
                    end += 1;
                }

                let group = &entries[start..end];
                if group.len() > 1 {
                    debug!(
                        sender = %key.sender,
                        channel = %key.channel,
                        merged = group.len(),
                        "merging message run"
                    );
                }
                let last_sent = group[group.len() - 1].0;
                merged.push((last_sent, merge_group(messages, group)));
                start = end;
            }
        }

        merged.sort_by_key(|(sent_at, _)| *sent_at);
        Ok(merged.into_iter().map(|(_, message)| message).collect())
    }
}

/// Fold a time-ordered run into one message; the latest post supplies the
/// timestamp.
fn merge_group(messages: &[Message], group: &[(NaiveDateTime, usize)]) -> AggregatedMessage {
    let first = &messages[group[0].1];
    let last = &messages[group[group.len() - 1].1];

    let mut texts = Vec::with_capacity(group.len());
    let mut urls = Vec::new();
    let mut seen_urls = HashSet::new();
    let mut file_paths = Vec::new();
    let mut permalinks = Vec::new();
    let mut original_indices = Vec::new();

    for &(_, index) in group {
        let message = &messages[index];
        texts.push(message.text.as_str());
        for url in &message.urls {
            if seen_urls.insert(url.as_str()) {
                urls.push(url.clone());
            }
        }
        file_paths.extend(message.file_paths.iter().cloned());
        permalinks.extend(message.permalinks.iter().cloned());
        if message.original_indices.is_empty() {
            original_indices.push(index);
        } else {
            original_indices.extend(message.original_indices.iter().copied());
        }
    }

    AggregatedMessage {
        workspace: first.workspace.clone(),
        channel: first.channel.clone(),
        channel_type: first.channel_type,
        sender: first.sender.clone(),
        timestamp: last.timestamp.clone(),
        text: texts.join(MESSAGE_SEPARATOR),
        urls,
        file_paths,
        permalinks,
        original_indices,
    }
}

#[cfg(test)]
mod tests {
    use calbot_domain::ChannelType;

    use super::*;

    fn message(sender: &str, timestamp: &str, text: &str) -> Message {
        Message {
            workspace: "lab".into(),
            channel: "general".into(),
            channel_type: ChannelType::Public,
            sender: sender.into(),
            timestamp: timestamp.into(),
            text: text.into(),
            urls: vec![],
            file_paths: vec![],
            permalinks: vec![format!("https://chat.example/{text}")],
            original_indices: vec![],
        }
    }

    #[test]
    fn merges_within_window_of_anchor() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("ada", "2025-10-20T10:20:00", "b"),
            message("ada", "2025-10-20T10:35:00", "c"),
        ];

        let merged = WindowAggregator::default().aggregate(&batch).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "a [ADDITIONAL MESSAGE] b");
        assert_eq!(merged[0].timestamp, "2025-10-20T10:20:00");
        assert_eq!(merged[0].original_indices, vec![0, 1]);
        assert_eq!(merged[1].text, "c");
        assert_eq!(merged[1].original_indices, vec![2]);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("ada", "2025-10-20T10:30:00", "b"),
        ];

        let merged = WindowAggregator::default().aggregate(&batch).unwrap();

        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn window_does_not_slide() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("ada", "2025-10-20T10:25:00", "b"),
            message("ada", "2025-10-20T10:50:00", "c"),
        ];

        let merged = WindowAggregator::default().aggregate(&batch).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].text, "c");
    }

    #[test]
    fn different_senders_never_merge() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("bob", "2025-10-20T10:01:00", "b"),
        ];

        let merged = WindowAggregator::default().aggregate(&batch).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].sender, "ada");
        assert_eq!(merged[1].sender, "bob");
    }

    #[test]
    fn unions_urls_in_first_seen_order() {
        let mut first = message("ada", "2025-10-20T10:00:00", "a");
        first.urls = vec!["a".into(), "b".into(), "a".into(), "c".into()];
        let mut second = message("ada", "2025-10-20T10:05:00", "b");
        second.urls = vec!["b".into(), "d".into()];

        let merged = WindowAggregator::default().aggregate(&[first, second]).unwrap();

        assert_eq!(merged[0].urls, vec!["a", "b", "c", "d"]);
        assert_eq!(merged[0].permalinks.len(), 2);
    }

    #[test]
    fn sorts_out_of_order_input_and_output() {
        let batch = vec![
            message("bob", "2025-10-20T12:00:00", "late"),
            message("ada", "2025-10-20T10:10:00", "second"),
            message("ada", "2025-10-20T10:00:00", "first"),
        ];

        let merged = WindowAggregator::default().aggregate(&batch).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "first [ADDITIONAL MESSAGE] second");
        assert_eq!(merged[0].original_indices, vec![2, 1]);
        assert_eq!(merged[1].text, "late");
    }

    #[test]
    fn malformed_timestamp_is_a_data_format_error() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("ada", "not a time", "b"),
        ];

        let err = WindowAggregator::default().aggregate(&batch).unwrap_err();

        assert!(matches!(err, CalbotError::DataFormat(ref detail) if detail.contains("record 1")));
    }

    #[test]
    fn partition_keeps_positions_and_reports_rejects() {
        let batch = vec![
            message("ada", "2025-10-20T10:00:00", "a"),
            message("ada", "garbage", "b"),
            message("ada", "2025-10-20T10:05:00.250000", "c"),
        ];

        let (valid, rejected) = WindowAggregator::partition_valid(batch);

        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].original_indices, vec![2]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].index, 1);
    }

    #[test]
    fn empty_batch_yields_nothing() {
        assert!(WindowAggregator::default().aggregate(&[]).unwrap().is_empty());
    }
}
