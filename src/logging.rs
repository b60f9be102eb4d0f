use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter directive scoping `level` to this crate
pub fn filter_directive(level: &str) -> String {
    format!("pomoclock={}", level.trim().to_lowercase())
}

/// Send tracing output to `path`. The terminal belongs to the UI, so logs
/// never go to stdout. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directive(level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("warn"), "pomoclock=warn");
        assert_eq!(filter_directive(" DEBUG "), "pomoclock=debug");
    }

    // installs the global subscriber, so keep it the only test that calls init
    #[test]
    fn test_init_writes_to_nested_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("pomoclock.log");
        std::env::remove_var("RUST_LOG");

        init("debug", &path).unwrap();
        tracing::debug!(target: "pomoclock", "log file check");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("log file check"), "log was: {contents:?}");
    }

    #[test]
    fn test_directive_parses() {
        for level in ["trace", "debug", "info", "warn", "error", DEFAULT_LOG_LEVEL] {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok());
        }
    }
}
