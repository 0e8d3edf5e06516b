//! Logging setup
//!
//! Console output goes through `tracing` with an env-filter (`RUST_LOG`,
//! default "info"). In addition, `log_to_file` appends timestamped lines
//! to `log.txt` in the app data directory for post-run inspection.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::get_create_cyrus_dir;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}

fn log_file_path() -> Option<PathBuf> {
    get_create_cyrus_dir().ok().map(|dir| dir.join("log.txt"))
}

/// Append a timestamped message to the log file. Failures are reported to
/// stderr and otherwise ignored; file logging must never abort a run.
pub fn log_to_file(msg: &str) {
    let Some(log_file) = log_file_path() else {
        return;
    };

    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
    let log_line = format!("[{}] {}\n", timestamp, msg);

    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .and_then(|mut file| file.write_all(log_line.as_bytes()));

    if let Err(e) = result {
        eprintln!("Failed to write to log file: {}", e);
    }
}
