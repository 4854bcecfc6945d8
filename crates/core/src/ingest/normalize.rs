use std::sync::Arc;

use calbot_domain::Message;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::cache::UserNameCache;
use super::ports::UserDirectory;

/// `<@U123ABC>` or `<@U123ABC|label>`
static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<@(U\w+)(?:\|[^>]*)?>").expect("MENTION regex should compile - this is a bug")
});

static USER_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^U[A-Z0-9]{6,}$").expect("USER_ID regex should compile - this is a bug")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>|"]+"#).expect("URL regex should compile - this is a bug")
});

/// URLs found in `text`, in order of appearance, trailing punctuation
/// stripped.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL.find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']']).to_string())
        .filter(|url| url.len() > "https://".len())
        .collect()
}

/// Keep records sent within `[start, end]`.
///
/// Records with unreadable timestamps are kept so that aggregation rejects
/// them explicitly instead of them vanishing here.
pub fn filter_time_range(
    messages: Vec<Message>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Message> {
    messages
        .into_iter()
        .filter(|message| match message.sent_at() {
            Ok(at) => at >= start && at <= end,
            Err(_) => true,
        })
        .collect()
}

/// Resolves mentions and fills in derived fields of collected records
pub struct MessageNormalizer {
    directory: Arc<dyn UserDirectory>,
}

impl MessageNormalizer {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Normalize a batch, dropping records whose text is empty.
    pub async fn normalize(&self, messages: Vec<Message>, cache: &mut UserNameCache) -> Vec<Message> {
        let before = messages.len();
        let mut normalized = Vec::with_capacity(before);

        for mut message in messages {
            if USER_ID.is_match(&message.sender) {
                message.sender = self.resolve_name(&message.sender, cache).await;
            }
            message.text = self.resolve_mentions(&message.text, cache).await.trim().to_string();
            if message.text.is_empty() {
                continue;
            }
            if message.urls.is_empty() {
                message.urls = extract_urls(&message.text);
            }
            normalized.push(message);
        }

        debug!(before, after = normalized.len(), cached_names = cache.len(), "normalized batch");
        normalized
    }

    /// Replace every `<@U…>` mention with the user's display name.
    pub async fn resolve_mentions(&self, text: &str, cache: &mut UserNameCache) -> String {
        let ids: Vec<String> =
            MENTION.captures_iter(text).map(|caps| caps[1].to_string()).collect();
        for id in &ids {
            self.resolve_name(id, cache).await;
        }

        MENTION
            .replace_all(text, |caps: &regex::Captures<'_>| {
                cache.get(&caps[1]).unwrap_or(&caps[1]).to_string()
            })
            .into_owned()
    }

    /// Display name for `user_id`, falling back to the id itself.
    pub async fn resolve_name(&self, user_id: &str, cache: &mut UserNameCache) -> String {
        if let Some(name) = cache.get(user_id) {
            return name.to_string();
        }

        let name = match self.directory.display_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => user_id.to_string(),
            Err(err) => {
                warn!(user_id, error = %err, "user lookup failed; keeping raw id");
                user_id.to_string()
            }
        };
        cache.insert(user_id, name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn extracts_urls_and_strips_punctuation() {
        let urls = extract_urls(
            "Slides at https://example.org/talk.pdf, zoom <https://zoom.us/j/123|here>. Done.",
        );
        assert_eq!(urls, vec!["https://example.org/talk.pdf", "https://zoom.us/j/123"]);
    }

    #[test]
    fn text_without_urls_yields_none() {
        assert!(extract_urls("Room 302 at noon").is_empty());
    }

    #[test]
    fn time_range_is_inclusive_and_keeps_unreadable_records() {
        let at = |h: u32| NaiveDate::from_ymd_opt(2025, 10, 20).unwrap().and_hms_opt(h, 0, 0).unwrap();
        let record = |ts: &str| Message {
            workspace: "lab".into(),
            channel: "general".into(),
            channel_type: calbot_domain::ChannelType::Public,
            sender: "ada".into(),
            timestamp: ts.into(),
            text: "x".into(),
            urls: vec![],
            file_paths: vec![],
            permalinks: vec![],
            original_indices: vec![],
        };

        let kept = filter_time_range(
            vec![
                record("2025-10-20T08:00:00"),
                record("2025-10-20T09:00:00"),
                record("2025-10-20T12:00:00"),
                record("2025-10-20T12:00:01"),
                record("bogus"),
            ],
            at(9),
            at(12),
        );

        let stamps: Vec<&str> = kept.iter().map(|m| m.timestamp.as_str()).collect();
        assert_eq!(stamps, vec!["2025-10-20T09:00:00", "2025-10-20T12:00:00", "bogus"]);
    }
}
