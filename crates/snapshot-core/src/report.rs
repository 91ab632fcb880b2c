//! Progress and diagnostics reporting for batch runs.
//!
//! The builder and merger never log directly about units or lines; they call
//! a [`Reporter`] handed to them by the caller. [`TracingReporter`] turns
//! those calls into `tracing` events and keeps the run's counters.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::SnapshotError;
use crate::models::{RunTotals, UnitStats};

/// How often (in units) a progress line is emitted.
pub const PROGRESS_EVERY: usize = 10;

/// Sink for per-unit and per-line events of a batch run.
pub trait Reporter {
    /// Unit `index` (0-based) of `total` is about to be processed.
    fn unit_started(&mut self, index: usize, total: usize, name: &str);

    /// Line `line_no` (1-based) of `unit` produced no record.
    fn line_skipped(&mut self, unit: &str, line_no: u64, err: &SnapshotError);

    fn unit_finished(&mut self, unit: &str, stats: &UnitStats, elapsed: Duration);

    /// The unit was abandoned; the batch moves on to the next one.
    fn unit_failed(&mut self, unit: &str, err: &SnapshotError);

    /// The earlier-period counterpart of `unit` does not exist in `dir`.
    fn counterpart_missing(&mut self, unit: &str, dir: &Path);

    fn totals(&self) -> RunTotals;
}

// ── TracingReporter ───────────────────────────────────────────────────────────

/// [`Reporter`] backed by the process `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingReporter {
    totals: RunTotals,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for TracingReporter {
    fn unit_started(&mut self, index: usize, total: usize, name: &str) {
        if index % PROGRESS_EVERY == 0 {
            info!("{}/{} files treated", index, total);
        }
        info!("treating {} ({}/{})", name, index + 1, total);
    }

    fn line_skipped(&mut self, unit: &str, line_no: u64, err: &SnapshotError) {
        if err.is_decode_error() {
            warn!("cannot parse line {} of {}: {}", line_no, unit, err);
        } else {
            debug!("failed to treat line {} of {}: {}", line_no, unit, err);
        }
    }

    fn unit_finished(&mut self, unit: &str, stats: &UnitStats, elapsed: Duration) {
        self.totals.add_unit(stats);
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            stats.lines_read as f64 / secs
        } else {
            0.0
        };
        info!(
            "{} treated in {:.2} seconds at {:.2} lines per second ({} written, {} skipped)",
            unit, secs, rate, stats.records_written, stats.unparseable
        );
    }

    fn unit_failed(&mut self, unit: &str, err: &SnapshotError) {
        self.totals.units_failed += 1;
        error!("failed to treat {}: {:?}", unit, err);
    }

    fn counterpart_missing(&mut self, unit: &str, dir: &Path) {
        self.totals.counterparts_missing += 1;
        info!("{} does not exist in {}", unit, dir.display());
    }

    fn totals(&self) -> RunTotals {
        self.totals
    }
}
