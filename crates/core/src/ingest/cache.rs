use std::collections::HashMap;

/// User id to display name memo, owned by one pipeline run
///
/// Unresolvable ids are cached as themselves so the directory is asked at
/// most once per id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserNameCache {
    names: HashMap<String, String>,
}

impl UserNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache from a known mapping.
    pub fn with_names(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    pub fn get(&self, user_id: &str) -> Option<&str> {
        self.names.get(user_id).map(String::as_str)
    }

    pub fn insert(&mut self, user_id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(user_id.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
