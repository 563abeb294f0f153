//! Configuration for Melon.
//!
//! Settings are read from environment variables. Secrets and overrides can
//! live in `~/.melon/config/.env.local`, which the binary loads before
//! falling back to a local `.env.local` or `.env`.
//!
//! # Environment Variables
//!
//! - `MELON_STATE_DIR`: Override the base state directory
//! - `MELON_BASE_URL`: Catalog backend base URL (default `http://localhost:8080`)
//! - `MELON_REQUEST_TIMEOUT_SECS`: Per-request timeout (default 10)
//! - `MELON_PUSH_ENABLED`: Enable scheduled digests (default false)
//! - `MELON_PUSH_TIMES`: Comma-separated `HH:MM` list (default `08:00,12:00,20:00`)
//! - `MELON_PUSH_CHECK_HOURS`: Digest window width in hours (default 12)
//! - `MELON_PUSH_TARGET_GROUPS`: Comma-separated chat ids to push to
//! - `MELON_ONEBOT_URL`: Shared-file gateway base URL (enables file lookup)
//! - `MELON_ONEBOT_TOKEN`: Optional gateway access token
//! - `MELON_FILE_GROUP`: Group whose shared files are searched

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use tracing::debug;

use crate::error::{MelonError, Result};

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "MELON_STATE_DIR";

pub const BASE_URL_ENV: &str = "MELON_BASE_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "MELON_REQUEST_TIMEOUT_SECS";
pub const PUSH_ENABLED_ENV: &str = "MELON_PUSH_ENABLED";
pub const PUSH_TIMES_ENV: &str = "MELON_PUSH_TIMES";
pub const PUSH_CHECK_HOURS_ENV: &str = "MELON_PUSH_CHECK_HOURS";
pub const PUSH_TARGET_GROUPS_ENV: &str = "MELON_PUSH_TARGET_GROUPS";
pub const ONEBOT_URL_ENV: &str = "MELON_ONEBOT_URL";
pub const ONEBOT_TOKEN_ENV: &str = "MELON_ONEBOT_TOKEN";
pub const FILE_GROUP_ENV: &str = "MELON_FILE_GROUP";

/// Default catalog backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default daily push slots.
pub const DEFAULT_PUSH_TIMES: &str = "08:00,12:00,20:00";

/// Default digest window width.
pub const DEFAULT_CHECK_HOURS: u32 = 12;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".melon";

const CONFIG_SUBDIR: &str = "config";

/// Get the Melon state directory.
///
/// 1. `MELON_STATE_DIR` if set
/// 2. `~/.melon` if a home directory is available
/// 3. `.melon` in the current directory
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the `.env.local` file path holding secrets (bot token, gateway token).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Load environment files: the config-dir file first, then a local
/// `.env.local` or `.env`. Variables already set are never overwritten.
///
/// Returns the files that were loaded.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    let global = env_file();
    if load_env_file(&global) {
        loaded.push(global);
    }

    if let Ok(path) = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv()) {
        loaded.push(path);
    }

    loaded
}

/// Load a single env file if it exists.
pub fn load_env_file(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded env file");
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to load env file");
            false
        }
    }
}

/// Scheduled digest settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    pub enabled: bool,
    /// Distinct times of day, sorted.
    pub times: Vec<NaiveTime>,
    /// Width of the trailing update window, at least 1.
    pub check_hours: u32,
    /// Destinations in configured order, duplicates removed.
    pub target_groups: Vec<i64>,
}

impl PushSettings {
    /// Push tasks only run when enabled and there is somewhere to push to.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.target_groups.is_empty() && !self.times.is_empty()
    }
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            // The default list is a constant known to parse.
            times: parse_push_times(DEFAULT_PUSH_TIMES).unwrap_or_default(),
            check_hours: DEFAULT_CHECK_HOURS,
            target_groups: Vec::new(),
        }
    }
}

/// Shared-file gateway settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStoreSettings {
    pub url: String,
    pub access_token: Option<String>,
    /// Group whose shared files are searched by `/cid`.
    pub group_id: i64,
}

/// Complete runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub push: PushSettings,
    /// `None` disables the shared-file lookup.
    pub file_store: Option<FileStoreSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            push: PushSettings::default(),
            file_store: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Unset or blank variables fall back to defaults; malformed values are
    /// reported as [`MelonError::Config`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = get(BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match get(REQUEST_TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    MelonError::Config(format!("{REQUEST_TIMEOUT_ENV} must be a number of seconds, got '{raw}'"))
                })?;
                if secs == 0 {
                    return Err(MelonError::Config(format!("{REQUEST_TIMEOUT_ENV} must be at least 1")));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let enabled = match get(PUSH_ENABLED_ENV) {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| MelonError::Config(format!("{PUSH_ENABLED_ENV}: expected a boolean, got '{raw}'")))?,
            None => false,
        };

        let times = parse_push_times(&get(PUSH_TIMES_ENV).unwrap_or_else(|| DEFAULT_PUSH_TIMES.to_string()))?;

        let check_hours = match get(PUSH_CHECK_HOURS_ENV) {
            Some(raw) => parse_check_hours(&raw)?,
            None => DEFAULT_CHECK_HOURS,
        };

        let target_groups = match get(PUSH_TARGET_GROUPS_ENV) {
            Some(raw) => parse_target_groups(&raw)?,
            None => Vec::new(),
        };

        let file_store = match get(ONEBOT_URL_ENV) {
            Some(url) => {
                let raw_group = get(FILE_GROUP_ENV).ok_or_else(|| {
                    MelonError::Config(format!("{FILE_GROUP_ENV} is required when {ONEBOT_URL_ENV} is set"))
                })?;
                let group_id = raw_group
                    .parse()
                    .map_err(|_| MelonError::Config(format!("{FILE_GROUP_ENV}: invalid group id '{raw_group}'")))?;
                Some(FileStoreSettings {
                    url: url.trim_end_matches('/').to_string(),
                    access_token: get(ONEBOT_TOKEN_ENV),
                    group_id,
                })
            }
            None => None,
        };

        Ok(Self {
            base_url,
            request_timeout,
            push: PushSettings {
                enabled,
                times,
                check_hours,
                target_groups,
            },
            file_store,
        })
    }
}

/// Parse a comma-separated `HH:MM` list into sorted, distinct times.
pub fn parse_push_times(raw: &str) -> Result<Vec<NaiveTime>> {
    let mut times = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let time = NaiveTime::parse_from_str(part, "%H:%M")
            .map_err(|_| MelonError::Config(format!("invalid push time '{part}', expected HH:MM")))?;
        times.push(time);
    }
    times.sort();
    times.dedup();
    Ok(times)
}

/// Parse a comma-separated list of chat ids, keeping the first occurrence
/// of each.
pub fn parse_target_groups(raw: &str) -> Result<Vec<i64>> {
    let mut groups: Vec<i64> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse()
            .map_err(|_| MelonError::Config(format!("invalid target group '{part}'")))?;
        if !groups.contains(&id) {
            groups.push(id);
        }
    }
    Ok(groups)
}

/// Parse a window width in hours; zero is rejected.
pub fn parse_check_hours(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(hours) if hours >= 1 => Ok(hours),
        _ => Err(MelonError::Config(format!(
            "check hours must be a whole number of at least 1, got '{raw}'"
        ))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
