use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::alert::AlertKind;
use crate::app_dirs::AppDirs;
use crate::timer::{
    ApplyChanges, Lengths, Limits, DEFAULT_BREAK_MAX_MINUTES, DEFAULT_BREAK_MINUTES,
    DEFAULT_SESSION_MINUTES,
};

/// Startup settings. Missing fields take their defaults; in-app edits are
/// never written back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub session_minutes: u32,
    pub break_minutes: u32,
    pub session_max_minutes: Option<u32>,
    pub break_max_minutes: Option<u32>,
    pub apply_changes: ApplyChanges,
    pub alert: AlertKind,
    pub alert_command: Option<String>,
    pub alert_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_minutes: DEFAULT_SESSION_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            session_max_minutes: None,
            break_max_minutes: Some(DEFAULT_BREAK_MAX_MINUTES),
            apply_changes: ApplyChanges::Immediately,
            alert: AlertKind::Bell,
            alert_command: None,
            alert_file: None,
        }
    }
}

impl Config {
    pub fn lengths(&self) -> Lengths {
        Lengths {
            session: self.session_minutes,
            break_time: self.break_minutes,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            session_max: self.session_max_minutes,
            break_max: self.break_max_minutes,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("pomoclock_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring malformed config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }
}
