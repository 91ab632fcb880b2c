use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::error::{Result, SnapshotError};

/// Output layout of every normalized `date` field.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Date layout of file-name tokens and of the CLI date bounds.
pub const TOKEN_FORMAT: &str = "%Y-%m-%d";

/// `created_at` layout used by the Twitter REST API (and so by Tweepy dumps).
const TWITTER_CREATED_AT: &str = "%a %b %d %H:%M:%S +0000 %Y";

static SHORT_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$").expect("regex is valid")
});

// ── Canonical formatting ──────────────────────────────────────────────────────

/// Render a UTC wall-clock time in the canonical millisecond layout.
pub fn format_canonical(naive: &NaiveDateTime) -> String {
    naive.format(CANONICAL_FORMAT).to_string()
}

/// Parse a Twitter API `created_at` string such as
/// `"Tue Mar 01 10:20:30 +0000 2016"`.
pub fn parse_twitter_created_at(s: &str) -> Result<String> {
    NaiveDateTime::parse_from_str(s, TWITTER_CREATED_AT)
        .map(|naive| format_canonical(&naive))
        .map_err(|_| SnapshotError::TimestampParse(s.to_string()))
}

/// Parse a Datasift `created_at` string.
///
/// Datasift emits either a bare `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or the
/// same followed by a numeric offset such as `+00:00`.
pub fn parse_datasift_created_at(s: &str) -> Result<String> {
    if SHORT_ISO.is_match(s) {
        return NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| format_canonical(&naive))
            .map_err(|_| SnapshotError::TimestampParse(s.to_string()));
    }
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%:z")
        .map(|dt| format_canonical(&dt.with_timezone(&Utc).naive_utc()))
        .map_err(|_| SnapshotError::TimestampParse(s.to_string()))
}

// ── File-name date tokens ─────────────────────────────────────────────────────

/// Last `/`-separated component of a path or archive member name.
pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Date token of a data file: the basename up to its first `T`.
///
/// `"in/2016-03-01T10-00.data"` → `"2016-03-01"`.
pub fn date_token(name: &str) -> &str {
    let base = base_name(name);
    base.split('T').next().unwrap_or(base)
}

/// Date token of an archive: the basename up to its first `.`.
///
/// `"in/2015-06-01.tgz"` → `"2015-06-01"`.
pub fn archive_date_token(name: &str) -> &str {
    let base = base_name(name);
    base.split('.').next().unwrap_or(base)
}

// ── DateWindow ────────────────────────────────────────────────────────────────

/// Inclusive `[from, to]` calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// `true` when `token` is a valid `YYYY-MM-DD` date inside the window.
    ///
    /// Tokens that are not dates never match.
    pub fn contains_token(&self, token: &str) -> bool {
        match NaiveDate::parse_from_str(token, TOKEN_FORMAT) {
            Ok(date) => self.contains(date),
            Err(_) => {
                debug!("ignoring name with non-date token \"{}\"", token);
                false
            }
        }
    }
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_token_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, TOKEN_FORMAT)
        .map_err(|_| SnapshotError::TimestampParse(s.to_string()))
}
