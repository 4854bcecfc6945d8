//! Port interface for user-name lookups

use async_trait::async_trait;
use calbot_domain::Result;

/// Resolves chat user ids to display names
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when the id is unknown to the directory.
    async fn display_name(&self, user_id: &str) -> Result<Option<String>>;
}
