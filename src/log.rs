//! Logging setup
//!
//! Always logs to stderr. With file logging on, the same events also go to
//! `scraper.log` under the user config dir, truncated at every start.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::APP_DIR;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Install the global subscriber. Returns the log file path when file
/// logging is on and the file could be created.
pub fn init_log(to_file: bool) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let file = if to_file { open_log_file() } else { None };

    let file_layer = file.map(|(path, file)| {
        let _ = LOG_PATH.set(path);
        fmt::layer().with_ansi(false).with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    get_log_path()
}

/// Get the log file path
pub fn get_log_path() -> Option<PathBuf> {
    LOG_PATH.get().cloned()
}

fn open_log_file() -> Option<(PathBuf, File)> {
    let dir = dirs::config_dir()?.join(APP_DIR);
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("scraper.log");

    let mut file = File::create(&path).ok()?;
    writeln!(
        file,
        "=== Scraper Log Started {} ===",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
    .ok()?;

    Some((path, file))
}
