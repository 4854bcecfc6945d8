//! Chat message records
//!
//! A [`Message`] is one collected chat post. The aggregation stage folds
//! several of them into an [`AggregatedMessage`], which has the same shape:
//! its list fields are the ordered concatenation of the merged records.
//!
//! Field names on the wire follow the batch files produced by the message
//! collector (`workspace_name`, `textract`, `permalink`, ...).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{CalbotError, Result};
use crate::impl_domain_status_conversions;

/// Visibility of the channel a message was posted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Public,
    External,
}

impl_domain_status_conversions!(ChannelType {
    Public => "public",
    External => "external",
});

/// One chat message, immutable once produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "workspace_name")]
    pub workspace: String,
    #[serde(rename = "channel_name")]
    pub channel: String,
    pub channel_type: ChannelType,
    #[serde(rename = "sending_user_name")]
    pub sender: String,
    /// ISO-8601 local timestamp, `YYYY-MM-DDTHH:MM:SS` with optional
    /// fractional seconds
    #[serde(rename = "datetime")]
    pub timestamp: String,
    #[serde(rename = "textract")]
    pub text: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub file_paths: Vec<String>,
    #[serde(rename = "permalink", default)]
    pub permalinks: Vec<String>,
    #[serde(default)]
    pub original_indices: Vec<usize>,
}

/// A message produced by merging one or more [`Message`]s
pub type AggregatedMessage = Message;

/// Identity used to partition messages before windowing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenderKey {
    pub workspace: String,
    pub channel: String,
    pub sender: String,
}

impl Message {
    /// Parse the timestamp.
    ///
    /// # Errors
    /// Returns [`CalbotError::DataFormat`] when the timestamp is not an
    /// ISO-8601 local date-time.
    pub fn sent_at(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    pub fn sender_key(&self) -> SenderKey {
        SenderKey {
            workspace: self.workspace.clone(),
            channel: self.channel.clone(),
            sender: self.sender.clone(),
        }
    }
}

/// Parse a message timestamp, accepting optional fractional seconds.
///
/// # Errors
/// Returns [`CalbotError::DataFormat`] for anything else.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    raw.trim()
        .parse::<NaiveDateTime>()
        .map_err(|e| CalbotError::DataFormat(format!("invalid timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wire_record() -> serde_json::Value {
        json!({
            "workspace_name": "lab",
            "channel_name": "talks",
            "channel_type": "public",
            "sending_user_name": "Ada",
            "datetime": "2025-10-23T09:15:42.123456",
            "textract": "Seminar Friday",
            "urls": [],
            "file_paths": [],
            "permalink": ["https://chat.example/p1"],
            "original_indices": [4]
        })
    }

    #[test]
    fn deserializes_collector_field_names() {
        let message: Message = serde_json::from_value(wire_record()).unwrap();

        assert_eq!(message.workspace, "lab");
        assert_eq!(message.sender, "Ada");
        assert_eq!(message.channel_type, ChannelType::Public);
        assert_eq!(message.permalinks, vec!["https://chat.example/p1".to_string()]);
        assert_eq!(message.original_indices, vec![4]);
    }

    #[test]
    fn accepts_fractional_seconds() {
        let message: Message = serde_json::from_value(wire_record()).unwrap();
        let sent_at = message.sent_at().unwrap();
        assert_eq!(sent_at.format("%H:%M:%S").to_string(), "09:15:42");
    }

    #[test]
    fn channel_types_parse_from_their_names() {
        assert_eq!("PUBLIC".parse::<ChannelType>(), Ok(ChannelType::Public));
        assert_eq!("external".parse::<ChannelType>(), Ok(ChannelType::External));
        assert_eq!(ChannelType::External.to_string(), "external");
        assert!("private".parse::<ChannelType>().is_err());
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let mut message: Message = serde_json::from_value(wire_record()).unwrap();
        message.timestamp = "yesterday at noon".into();

        assert!(matches!(message.sent_at(), Err(CalbotError::DataFormat(_))));
    }

    #[test]
    fn missing_list_fields_default_to_empty() {
        let message: Message = serde_json::from_value(json!({
            "workspace_name": "lab",
            "channel_name": "talks",
            "channel_type": "external",
            "sending_user_name": "Ada",
            "datetime": "2025-10-23T09:15:42",
            "textract": "hi"
        }))
        .unwrap();

        assert!(message.urls.is_empty());
        assert!(message.permalinks.is_empty());
        assert_eq!(message.channel_type, ChannelType::External);
    }
}
