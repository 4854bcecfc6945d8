use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calbot_core::UserDirectory;
use calbot_domain::{CalbotError, Result as DomainResult};

/// Fixed id to name map; ids listed in `failing` return an error.
#[derive(Clone, Default)]
pub struct MapDirectory {
    names: HashMap<String, String>,
    failing: Vec<String>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MapDirectory {
    pub fn new(names: &[(&str, &str)]) -> Self {
        Self {
            names: names.iter().map(|(id, name)| (id.to_string(), name.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, user_id: &str) -> Self {
        self.failing.push(user_id.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDirectory for MapDirectory {
    async fn display_name(&self, user_id: &str) -> DomainResult<Option<String>> {
        self.lookups.lock().unwrap().push(user_id.to_string());
        if self.failing.iter().any(|id| id == user_id) {
            return Err(CalbotError::Network(format!("lookup of {user_id} timed out")));
        }
        Ok(self.names.get(user_id).cloned())
    }
}
