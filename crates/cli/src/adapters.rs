//! Construction of the live oracle and calendar adapters
//!
//! Adapters are built on demand so that runs which never reach a stage
//! (cached extraction, `--skip-calendar`) do not need its credentials.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use calbot_core::{CalendarStore, InferenceOracle, UserDirectory};
use calbot_domain::Config;
use calbot_infra::{GoogleCalendarStore, HttpClient, JsonUserDirectory, OpenAiOracle, TokenSource};

const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Source of the external collaborators a pipeline run needs
pub trait AdapterFactory {
    fn oracle(&self) -> anyhow::Result<Arc<dyn InferenceOracle>>;
    fn calendar(&self) -> anyhow::Result<Arc<dyn CalendarStore>>;
}

/// OpenAI oracle and Google Calendar store configured from `Config` and the
/// environment
pub struct LiveAdapters {
    config: Config,
}

impl LiveAdapters {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl AdapterFactory for LiveAdapters {
    fn oracle(&self) -> anyhow::Result<Arc<dyn InferenceOracle>> {
        let api_key = std::env::var(OPENAI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{OPENAI_API_KEY} must be set for extraction"))?;

        // The orchestrator owns retries; one HTTP attempt per oracle call.
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(self.config.extraction.request_timeout_secs))
            .max_attempts(1)
            .build()?;

        Ok(Arc::new(OpenAiOracle::from_config(api_key, http, &self.config.extraction)))
    }

    fn calendar(&self) -> anyhow::Result<Arc<dyn CalendarStore>> {
        let tokens = TokenSource::from_env().context("calendar credentials")?;
        let store = GoogleCalendarStore::new(HttpClient::new()?, tokens)
            .with_api_base(self.config.calendar.api_base.clone())?;
        Ok(Arc::new(store))
    }
}

/// User directory from an exported user map, or one that knows nobody.
pub fn user_directory(
    user_map: Option<&std::path::Path>,
) -> anyhow::Result<Arc<dyn UserDirectory>> {
    let directory = match user_map {
        Some(path) => JsonUserDirectory::from_file(path)
            .with_context(|| format!("loading user map {}", path.display()))?,
        None => JsonUserDirectory::empty(),
    };
    Ok(Arc::new(directory))
}
