use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::error::{Result, SnapshotError};
use crate::time_utils::{parse_token_date, DateWindow};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build and clean a normalized tweet snapshot from raw provider exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tweet-snapshot",
    about = "Build and clean a normalized tweet snapshot from raw provider exports",
    version
)]
pub struct Settings {
    /// Logging level
    #[arg(long, short = 'l', global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Where log lines are written
    #[arg(long, global = true, default_value = "file", value_parser = ["file", "stderr"])]
    pub log_destination: String,

    /// Directory holding the log file when logging to a file
    #[arg(long, short = 'P', global = true, default_value = ".")]
    pub log_file_path: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Normalize raw provider files into one snapshot file per input file
    Build(BuildArgs),
    /// Merge both collection periods, keeping French posts from known clients
    Clean(CleanArgs),
}

/// Options of the normalization stage.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Directory of raw `.data` files and `.tgz` archives
    #[arg(long = "input", short = 'p')]
    pub input: PathBuf,

    /// Directory receiving the normalized files
    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    /// First day of the snapshot (YYYY-MM-DD)
    #[arg(long, short = 'f', default_value = "2014-01-01", value_parser = parse_date_arg)]
    pub from_date: NaiveDate,

    /// Last day of the snapshot (YYYY-MM-DD)
    #[arg(long, short = 't', value_parser = parse_date_arg)]
    pub to_date: NaiveDate,

    /// Whether the input was collected with Tweepy (true/false)
    #[arg(long, short = 'T', action = clap::ArgAction::Set, required = true, value_parser = parse_bool_arg)]
    pub from_tweepy: bool,
}

/// Options of the merge stage.
#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Normalized files of the first collection period (Gnip or Datasift)
    #[arg(long = "earlier", short = 'g')]
    pub earlier: PathBuf,

    /// Normalized files of the second collection period (Tweepy)
    #[arg(long = "later", short = 'i')]
    pub later: PathBuf,

    /// Directory receiving the merged files
    #[arg(long = "output", short = 'o')]
    pub output: PathBuf,

    /// First day of the clean snapshot (YYYY-MM-DD)
    #[arg(long, short = 'f', default_value = "2006-01-01", value_parser = parse_date_arg)]
    pub from_date: NaiveDate,

    /// Last day of the clean snapshot (YYYY-MM-DD)
    #[arg(long, short = 't', value_parser = parse_date_arg)]
    pub to_date: NaiveDate,
}

impl BuildArgs {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from_date, self.to_date)
    }
}

impl CleanArgs {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from_date, self.to_date)
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve the `--debug` flag.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Reject output directories that would overwrite an input directory.
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Build(args) => ensure_distinct(&args.input, &args.output),
            Command::Clean(args) => {
                ensure_distinct(&args.earlier, &args.output)?;
                ensure_distinct(&args.later, &args.output)
            }
        }
    }

    /// Short name of the selected command, used for the log file name.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Build(_) => "build-snapshot",
            Command::Clean(_) => "clean-snapshot",
        }
    }

    /// `true` when logs go to `<log_file_path>/<command>.log`.
    pub fn logs_to_file(&self) -> bool {
        self.log_destination == "file"
    }
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    if same_dir(input, output) {
        return Err(SnapshotError::Config(format!(
            "input directory {} and output directory must be different",
            input.display()
        )));
    }
    Ok(())
}

/// Compare directories by their canonical form when both exist, by their
/// components otherwise (so `a/` equals `a`).
fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => a.components().eq(b.components()),
    }
}

// ── Value parsers ──────────────────────────────────────────────────────────────

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_token_date(value).map_err(|_| format!("expected a YYYY-MM-DD date, got \"{value}\""))
}

/// Accepts `true`/`false` in any case (the historical scripts used `True`).
fn parse_bool_arg(value: &str) -> std::result::Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected true or false, got \"{value}\"")),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
