//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Use the explicit path when one is given, otherwise search the standard
//!    locations; fall back to built-in defaults when nothing is found
//! 2. Apply `CALBOT_*` environment overrides
//! 3. Validate the result
//!
//! JSON and TOML are both accepted, detected by file extension.
//!
//! ## Environment Variables
//! - `CALBOT_CALENDAR_ID`: Target calendar
//! - `CALBOT_TIME_ZONE`: IANA zone for scheduling and day windows
//! - `CALBOT_MODEL`: Oracle model name
//! - `CALBOT_OUTPUT_DIR`: Directory for stage files
//! - `CALBOT_WORKERS`: Concurrent extraction workers
//! - `CALBOT_SAMPLE_COUNT`: Candidates sampled per message
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./calbot.toml`, `./calbot.json` (current working directory)
//! 2. `./config.toml`, `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use calbot_domain::{CalbotError, Config, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["calbot.toml", "calbot.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CalbotError::Config` if:
/// - An explicit path does not exist
/// - File format is invalid
/// - An environment override cannot be parsed
/// - The merged configuration fails validation
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => match search_config_paths() {
            Some(found) => load_from_file(&found)?,
            None => {
                tracing::info!("No config file found; using built-in defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// # Errors
/// Returns `CalbotError::Config` if the file is missing, unreadable or not
/// valid JSON/TOML for [`Config`].
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(CalbotError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CalbotError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalbotError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalbotError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CalbotError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn search_config_paths() -> Option<PathBuf> {
    let mut directories = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        directories.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            directories.push(exe_dir.to_path_buf());
        }
    }

    directories
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Apply `CALBOT_*` environment overrides on top of `config`
///
/// # Errors
/// Returns `CalbotError::Config` when a numeric override does not parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(value) = env_string("CALBOT_CALENDAR_ID") {
        config.calendar.calendar_id = value;
    }
    if let Some(value) = env_string("CALBOT_TIME_ZONE") {
        config.calendar.time_zone = value;
    }
    if let Some(value) = env_string("CALBOT_MODEL") {
        config.extraction.model = value;
    }
    if let Some(value) = env_string("CALBOT_OUTPUT_DIR") {
        config.output.directory = value;
    }
    if let Some(value) = env_parsed::<usize>("CALBOT_WORKERS")? {
        config.extraction.workers = value;
    }
    if let Some(value) = env_parsed::<u32>("CALBOT_SAMPLE_COUNT")? {
        config.extraction.sample_count = value;
    }
    Ok(())
}

/// Get an optional, non-blank environment variable
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `CalbotError::Config` if the variable is set but does not parse.
fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| CalbotError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
