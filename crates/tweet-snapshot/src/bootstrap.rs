use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use snapshot_core::settings::Settings;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr, or are appended to `<log_file_path>/<command>.log`
/// when `--log-destination file` (the default) is selected.
pub fn setup_logging(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(tracing_level(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = if settings.logs_to_file() {
        std::fs::create_dir_all(&settings.log_file_path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file(settings))?;
        BoxMakeWriter::new(Mutex::new(file))
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(!settings.logs_to_file())
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

/// Path of the log file for the selected command.
pub fn log_file(settings: &Settings) -> PathBuf {
    settings
        .log_file_path
        .join(format!("{}.log", settings.command_name()))
}

/// Map Python-style level names to `tracing` directives.
fn tracing_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
