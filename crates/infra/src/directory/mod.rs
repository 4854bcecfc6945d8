//! User directory backed by an exported user map
//!
//! The collector exports `{ "<user id>": "<display name>" }` alongside its
//! message batches; mention resolution reads it through the core
//! `UserDirectory` port.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use calbot_core::UserDirectory;
use calbot_domain::Result;
use tracing::info;

use crate::storage::read_json;

/// In-memory [`UserDirectory`] loaded from a JSON user map
#[derive(Debug, Clone, Default)]
pub struct JsonUserDirectory {
    names: HashMap<String, String>,
}

impl JsonUserDirectory {
    /// A directory that knows nobody; every id resolves to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    /// # Errors
    /// Fails when the file is missing or is not a string-to-string object.
    pub fn from_file(path: &Path) -> Result<Self> {
        let names: HashMap<String, String> = read_json(path)?;
        info!(path = %path.display(), users = names.len(), "loaded user map");
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl UserDirectory for JsonUserDirectory {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .names
            .get(user_id)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }
}
