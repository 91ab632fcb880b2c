//! Normalization stage: raw provider files to per-file snapshot files.
//!
//! Every selected unit is written to `<output>/<basename>`, one
//! [`NormalizedRecord`](snapshot_core::models::NormalizedRecord) per line, in
//! input order. Lines that cannot be normalized are reported and skipped, and
//! a unit that fails as a whole never stops the batch. The members of one
//! archive are all written during a single pass over that archive.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use snapshot_core::error::{Result, SnapshotError};
use snapshot_core::models::{RunTotals, UnitStats};
use snapshot_core::provider::Provider;
use snapshot_core::report::Reporter;
use snapshot_core::settings::BuildArgs;
use snapshot_core::time_utils::base_name;
use tracing::{debug, info};

use crate::archive::{for_each_member, with_unit_reader};
use crate::selector::{find_units, RawUnit};
use crate::writer::SnapshotWriter;

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize every unit selected by `args` into `args.output`.
pub fn build_snapshot(args: &BuildArgs, reporter: &mut dyn Reporter) -> Result<RunTotals> {
    info!("input directory: {}", args.input.display());
    info!("output directory: {}", args.output.display());
    ensure_output_dir(&args.output)?;

    let units = find_units(&args.input, &args.window());
    let mut batch = Batch {
        output: &args.output,
        from_tweepy: args.from_tweepy,
        total: units.len(),
        next: 0,
        reporter,
    };

    for group in units.chunk_by(same_archive) {
        match group {
            [RawUnit::ArchiveMember { archive, .. }, ..] => batch.run_archive(archive, group),
            _ => group.iter().for_each(|unit| batch.run_file(unit)),
        }
    }

    Ok(batch.reporter.totals())
}

/// Normalize one unit into `output_dir`.
pub fn build_unit(
    unit: &RawUnit,
    output_dir: &Path,
    from_tweepy: bool,
    reporter: &mut dyn Reporter,
) -> Result<UnitStats> {
    let name = unit.name();
    with_unit_reader(unit, |reader| {
        write_unit(reader, &name, output_dir, from_tweepy, reporter)
    })
}

/// Normalize `reader` line by line into `writer`.
///
/// Blank lines are counted and ignored. Invalid UTF-8 is replaced rather than
/// failing the unit.
pub fn normalize_lines<R, W>(
    reader: &mut R,
    writer: &mut SnapshotWriter<W>,
    provider: Provider,
    unit_name: &str,
    reporter: &mut dyn Reporter,
) -> Result<UnitStats>
where
    R: BufRead + ?Sized,
    W: Write,
{
    let mut stats = UnitStats::default();
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        if read_line(reader, &mut buf, unit_name)? == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match provider.normalize_line(trimmed) {
            Ok(record) => {
                writer.write_record(&record)?;
                stats.records_written += 1;
            }
            Err(e) => {
                stats.unparseable += 1;
                reporter.line_skipped(unit_name, stats.lines_read, &e);
            }
        }
    }

    Ok(stats)
}

/// Read one raw line, newline included, into `buf`. Returns 0 at end of input.
pub(crate) fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, unit_name: &str) -> Result<usize>
where
    R: BufRead + ?Sized,
{
    reader
        .read_until(b'\n', buf)
        .map_err(|source| SnapshotError::FileRead {
            path: unit_name.into(),
            source,
        })
}

pub(crate) fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| SnapshotError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Progress state of one build run.
struct Batch<'a> {
    output: &'a Path,
    from_tweepy: bool,
    total: usize,
    next: usize,
    reporter: &'a mut dyn Reporter,
}

impl Batch<'_> {
    fn start(&mut self, name: &str) -> Instant {
        self.reporter.unit_started(self.next, self.total, name);
        self.next += 1;
        Instant::now()
    }

    fn finish(&mut self, name: &str, outcome: Result<UnitStats>, started: Instant) {
        match outcome {
            Ok(stats) => self.reporter.unit_finished(name, &stats, started.elapsed()),
            Err(e) => self.reporter.unit_failed(name, &e),
        }
    }

    fn run_file(&mut self, unit: &RawUnit) {
        let name = unit.name();
        let started = self.start(&name);
        let outcome = build_unit(unit, self.output, self.from_tweepy, &mut *self.reporter);
        self.finish(&name, outcome, started);
    }

    /// Write the selected `units` of `archive` during one pass over it.
    ///
    /// Members are visited in archive order. Those the pass never reached are
    /// reported as failed.
    fn run_archive(&mut self, archive: &Path, units: &[RawUnit]) {
        let members: Vec<String> = units.iter().map(RawUnit::name).collect();
        let mut visited: HashSet<String> = HashSet::new();

        let pass = for_each_member(archive, &members, |member, reader| {
            visited.insert(member.to_string());
            let started = self.start(member);
            let outcome =
                write_unit(reader, member, self.output, self.from_tweepy, &mut *self.reporter);
            self.finish(member, outcome, started);
        });
        let aborted = pass.err().map(|e| e.to_string());

        for member in members.iter().filter(|m| !visited.contains(*m)) {
            self.start(member);
            let err = match &aborted {
                Some(reason) => SnapshotError::Archive {
                    path: archive.to_path_buf(),
                    source: io::Error::other(reason.clone()),
                },
                None => SnapshotError::MemberNotFound {
                    archive: archive.to_path_buf(),
                    member: member.clone(),
                },
            };
            self.reporter.unit_failed(member, &err);
        }
    }
}

fn same_archive(a: &RawUnit, b: &RawUnit) -> bool {
    matches!(
        (a, b),
        (
            RawUnit::ArchiveMember { archive: x, .. },
            RawUnit::ArchiveMember { archive: y, .. },
        ) if x == y
    )
}

/// Normalize the unit called `name` from `reader` into `output_dir`.
fn write_unit(
    reader: &mut dyn BufRead,
    name: &str,
    output_dir: &Path,
    from_tweepy: bool,
    reporter: &mut dyn Reporter,
) -> Result<UnitStats> {
    let provider = Provider::detect(name, from_tweepy);
    let out_path = output_dir.join(base_name(name));
    debug!("{} is a {} file, writing {}", name, provider, out_path.display());

    let mut writer = SnapshotWriter::create(&out_path)?;
    let stats = normalize_lines(reader, &mut writer, provider, name, reporter)?;
    writer.finish()?;
    Ok(stats)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
