// Application state module
// Immutable per-process state shared by every connection

use std::path::PathBuf;

use super::types::Config;
use crate::logger::LogFormat;

/// Application state
///
/// Built once at startup and shared behind an `Arc`. Nothing in here changes
/// while the server runs.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical root directory; every served path lies beneath it
    pub root: PathBuf,
    pub access_log: bool,
    pub access_log_format: LogFormat,
}

impl AppState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        let access_log = config.logging.access_log;
        let access_log_format = LogFormat::from(config.logging.access_log_format.as_str());

        Self {
            config,
            root,
            access_log,
            access_log_format,
        }
    }
}
