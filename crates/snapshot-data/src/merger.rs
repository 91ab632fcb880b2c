//! Merge stage: one clean snapshot out of two collection periods.
//!
//! The later period (Tweepy) covers every date of the earlier one (Gnip or
//! Datasift), so its file list drives the merge. For each later-period file,
//! the earlier-period file of the same name is read first; its records take
//! precedence over later ones with the same id. Only French posts from
//! allowlisted clients are kept.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use indexmap::IndexMap;
use snapshot_core::clients::AllowedClients;
use snapshot_core::error::{Result, SnapshotError};
use snapshot_core::models::{NormalizedRecord, RunTotals, UnitStats};
use snapshot_core::report::Reporter;
use snapshot_core::settings::CleanArgs;
use tracing::{debug, info};

use crate::builder::{ensure_output_dir, read_line};
use crate::selector::list_data_files;
use crate::writer::SnapshotWriter;

/// Twitter language tag retained by the merge.
pub const RETAINED_LANGUAGE: &str = "fr";

/// Records keyed by id, in insertion order.
pub type MergedSnapshot = IndexMap<String, NormalizedRecord>;

// ── Merge engine ──────────────────────────────────────────────────────────────

/// `true` for records posted from an allowlisted client and tagged French by
/// Twitter. Records without a Twitter language tag never pass.
pub fn is_retained(record: &NormalizedRecord, clients: &AllowedClients) -> bool {
    record.language.twitter.as_deref() == Some(RETAINED_LANGUAGE)
        && clients.contains(&record.client)
}

/// Merge two normalized snapshots of the same window.
///
/// Retained earlier-period records are inserted first, then retained
/// later-period records whose id is not yet present. The first record seen
/// for an id wins.
pub fn merge_records<E, L>(earlier: E, later: L, clients: &AllowedClients) -> MergedSnapshot
where
    E: IntoIterator<Item = NormalizedRecord>,
    L: IntoIterator<Item = NormalizedRecord>,
{
    let mut merged = MergedSnapshot::new();
    for record in earlier.into_iter().chain(later) {
        if is_retained(&record, clients) {
            merged.entry(record.id.clone()).or_insert(record);
        }
    }
    merged
}

// ── Batch driver ──────────────────────────────────────────────────────────────

/// Merge every later-period file of `args` with its earlier counterpart.
pub fn clean_snapshot(
    args: &CleanArgs,
    clients: &AllowedClients,
    reporter: &mut dyn Reporter,
) -> Result<RunTotals> {
    info!("input directory (earlier period): {}", args.earlier.display());
    info!("input directory (later period): {}", args.later.display());
    info!("output directory: {}", args.output.display());
    ensure_output_dir(&args.output)?;

    let files = list_data_files(&args.later, &args.window());
    info!("{} files to treat", files.len());
    let total = files.len();

    for (index, later_path) in files.iter().enumerate() {
        let name = later_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        reporter.unit_started(index, total, &name);
        let started = Instant::now();
        match clean_file(later_path, &args.earlier, &args.output, clients, reporter) {
            Ok(stats) => reporter.unit_finished(&name, &stats, started.elapsed()),
            Err(e) => reporter.unit_failed(&name, &e),
        }
    }

    Ok(reporter.totals())
}

/// Merge one later-period file with the same-named file of `earlier_dir`.
///
/// Nothing is written when no record survives the merge.
pub fn clean_file(
    later_path: &Path,
    earlier_dir: &Path,
    output_dir: &Path,
    clients: &AllowedClients,
    reporter: &mut dyn Reporter,
) -> Result<UnitStats> {
    let file_name = later_path.file_name().ok_or_else(|| {
        SnapshotError::Config(format!("not a file path: {}", later_path.display()))
    })?;
    let name = file_name.to_string_lossy().into_owned();

    let earlier_path = earlier_dir.join(file_name);
    let (earlier, earlier_stats) = if earlier_path.is_file() {
        read_snapshot(&earlier_path, reporter)?
    } else {
        reporter.counterpart_missing(&name, earlier_dir);
        (Vec::new(), UnitStats::default())
    };
    let (later, later_stats) = read_snapshot(later_path, reporter)?;

    let merged = merge_records(earlier, later, clients);
    let stats = UnitStats {
        lines_read: earlier_stats.lines_read + later_stats.lines_read,
        records_written: merged.len() as u64,
        unparseable: earlier_stats.unparseable + later_stats.unparseable,
    };

    if merged.is_empty() {
        debug!("{}: no record kept, no output written", name);
        return Ok(stats);
    }

    write_snapshot(&output_dir.join(file_name), merged.values())?;
    Ok(stats)
}

/// Read a normalized snapshot file, reporting and skipping unreadable lines.
///
/// Invalid UTF-8 is replaced before decoding, so a damaged line costs only
/// that line.
pub fn read_snapshot(
    path: &Path,
    reporter: &mut dyn Reporter,
) -> Result<(Vec<NormalizedRecord>, UnitStats)> {
    let file = File::open(path).map_err(|source| SnapshotError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let unit = path.to_string_lossy();
    let mut reader = BufReader::new(file);
    let mut stats = UnitStats::default();
    let mut records = Vec::new();
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        if read_line(&mut reader, &mut buf, &unit)? == 0 {
            break;
        }
        stats.lines_read += 1;
        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<NormalizedRecord>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                stats.unparseable += 1;
                reporter.line_skipped(&unit, stats.lines_read, &SnapshotError::from(e));
            }
        }
    }

    Ok((records, stats))
}

/// Write `records` to `path`, one JSON document per line.
pub fn write_snapshot<'a, I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut writer = SnapshotWriter::create(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_lines;
    use chrono::NaiveDate;
    use snapshot_core::provider::Provider;
    use snapshot_core::report::TracingReporter;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn record(id: &str, client: &str, lang: Option<&str>, provider: Provider) -> NormalizedRecord {
        let mut r = NormalizedRecord::new(
            id.to_string(),
            "2016-03-01T10:00:00.000Z".to_string(),
            "u1".to_string(),
            client.to_string(),
            provider,
        );
        r.language.twitter = lang.map(str::to_string);
        r
    }

    fn french(id: &str, provider: Provider) -> NormalizedRecord {
        record(id, "Twitter for Android", Some("fr"), provider)
    }

    fn line(r: &NormalizedRecord) -> String {
        serde_json::to_string(r).unwrap()
    }

    fn ids(snapshot: &MergedSnapshot) -> Vec<&str> {
        snapshot.keys().map(String::as_str).collect()
    }

    fn read_ids(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<NormalizedRecord>(l).unwrap().id)
            .collect()
    }

    fn args(earlier: &Path, later: &Path, output: &Path) -> CleanArgs {
        CleanArgs {
            earlier: earlier.to_path_buf(),
            later: later.to_path_buf(),
            output: output.to_path_buf(),
            from_date: NaiveDate::from_ymd_opt(2006, 1, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2017, 12, 31).unwrap(),
        }
    }

    // ── merge_records ─────────────────────────────────────────────────────────

    #[test]
    fn test_earlier_period_wins_ties() {
        let clients = AllowedClients::default_set();
        let mut earlier = french("X", Provider::Gnip);
        earlier.text = Some("earlier".to_string());
        let mut later = french("X", Provider::Tweepy);
        later.text = Some("later".to_string());

        let merged = merge_records(vec![earlier.clone()], vec![later], &clients);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged["X"], earlier);
    }

    #[test]
    fn test_predicate_failures_never_emitted() {
        let clients = AllowedClients::default_set();
        let earlier = vec![
            record("bot", "IFTTT", Some("fr"), Provider::Gnip),
            record("en", "Twitter for iPhone", Some("en"), Provider::Gnip),
        ];
        let later = vec![
            record("bot2", "dlvr.it", Some("fr"), Provider::Tweepy),
            record("de", "TweetDeck", Some("de"), Provider::Tweepy),
        ];

        assert!(merge_records(earlier, later, &clients).is_empty());
    }

    #[test]
    fn test_missing_twitter_language_skipped() {
        let clients = AllowedClients::default_set();
        let earlier = vec![record("a", "Twitter", None, Provider::Gnip)];
        let later = vec![record("b", "Twitter", None, Provider::Tweepy)];
        assert!(merge_records(earlier, later, &clients).is_empty());
    }

    #[test]
    fn test_insertion_order_earlier_then_later() {
        let clients = AllowedClients::default_set();
        let earlier = vec![french("3", Provider::Gnip), french("1", Provider::Gnip)];
        let later = vec![
            french("2", Provider::Tweepy),
            french("1", Provider::Tweepy),
            french("0", Provider::Tweepy),
        ];

        let merged = merge_records(earlier, later, &clients);
        assert_eq!(ids(&merged), vec!["3", "1", "2", "0"]);
        assert_eq!(merged["1"].collected_with, Provider::Gnip);
    }

    #[test]
    fn test_first_writer_wins_within_a_snapshot() {
        let clients = AllowedClients::default_set();
        let mut first = french("1", Provider::Gnip);
        first.text = Some("first".to_string());
        let mut second = french("1", Provider::Gnip);
        second.text = Some("second".to_string());

        let merged = merge_records(vec![first, second], Vec::new(), &clients);
        assert_eq!(merged["1"].text.as_deref(), Some("first"));
    }

    #[test]
    fn test_rejected_earlier_does_not_shadow_later() {
        let clients = AllowedClients::default_set();
        let earlier = vec![record("X", "IFTTT", Some("fr"), Provider::Gnip)];
        let later = vec![french("X", Provider::Tweepy)];

        let merged = merge_records(earlier, later, &clients);
        assert_eq!(merged["X"].collected_with, Provider::Tweepy);
    }

    // ── clean_snapshot ────────────────────────────────────────────────────────

    #[test]
    fn test_clean_merges_counterparts() {
        let earlier = TempDir::new().unwrap();
        let later = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let name = "2016-03-01T00.data";
        write_lines(
            earlier.path(),
            name,
            &[&line(&french("1", Provider::Gnip)), &line(&french("2", Provider::Gnip))],
        );
        write_lines(
            later.path(),
            name,
            &[&line(&french("2", Provider::Tweepy)), &line(&french("3", Provider::Tweepy))],
        );

        let mut reporter = TracingReporter::new();
        let totals = clean_snapshot(
            &args(earlier.path(), later.path(), output.path()),
            &AllowedClients::default_set(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(totals.units_processed, 1);
        assert_eq!(totals.records_written, 3);
        assert_eq!(totals.lines_read, 4);
        assert_eq!(read_ids(&output.path().join(name)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_clean_missing_counterpart_is_empty_contribution() {
        let earlier = TempDir::new().unwrap();
        let later = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let name = "2017-01-05T00.data";
        write_lines(later.path(), name, &[&line(&french("9", Provider::Tweepy))]);

        let mut reporter = TracingReporter::new();
        let totals = clean_snapshot(
            &args(earlier.path(), later.path(), output.path()),
            &AllowedClients::default_set(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(totals.counterparts_missing, 1);
        assert_eq!(totals.units_failed, 0);
        assert_eq!(read_ids(&output.path().join(name)), vec!["9"]);
    }

    #[test]
    fn test_clean_empty_merge_writes_nothing() {
        let earlier = TempDir::new().unwrap();
        let later = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let name = "2016-03-01T00.data";
        write_lines(
            later.path(),
            name,
            &[&line(&record("1", "IFTTT", Some("fr"), Provider::Tweepy))],
        );

        let mut reporter = TracingReporter::new();
        let totals = clean_snapshot(
            &args(earlier.path(), later.path(), output.path()),
            &AllowedClients::default_set(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(totals.units_processed, 1);
        assert_eq!(totals.records_written, 0);
        assert!(!output.path().join(name).exists());
    }

    #[test]
    fn test_clean_respects_window() {
        let earlier = TempDir::new().unwrap();
        let later = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_lines(later.path(), "2018-01-01T00.data", &[&line(&french("1", Provider::Tweepy))]);

        let mut reporter = TracingReporter::new();
        let totals = clean_snapshot(
            &args(earlier.path(), later.path(), output.path()),
            &AllowedClients::default_set(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(totals.units_processed, 0);
        assert!(!output.path().join("2018-01-01T00.data").exists());
    }

    #[test]
    fn test_read_snapshot_survives_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2016-03-01T00.data");
        let mut content = Vec::new();
        content.extend_from_slice(line(&french("1", Provider::Gnip)).as_bytes());
        content.extend_from_slice(b"\n{\"tweet\":\"\xff\xfe\"}\n");
        content.extend_from_slice(line(&french("2", Provider::Gnip)).as_bytes());
        content.push(b'\n');
        std::fs::write(&path, content).unwrap();

        let (records, stats) = read_snapshot(&path, &mut TracingReporter::new()).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.unparseable, 1);
    }

    #[test]
    fn test_clean_keeps_records_around_damaged_line() {
        let earlier = TempDir::new().unwrap();
        let later = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let name = "2016-03-01T00.data";
        let mut content = Vec::new();
        content.extend_from_slice(line(&french("1", Provider::Gnip)).as_bytes());
        content.extend_from_slice(b"\n\xff\xfe\n");
        std::fs::write(earlier.path().join(name), content).unwrap();
        write_lines(later.path(), name, &[&line(&french("2", Provider::Tweepy))]);

        let mut reporter = TracingReporter::new();
        let totals = clean_snapshot(
            &args(earlier.path(), later.path(), output.path()),
            &AllowedClients::default_set(),
            &mut reporter,
        )
        .unwrap();

        assert_eq!(totals.units_failed, 0);
        assert_eq!(totals.unparseable, 1);
        assert_eq!(read_ids(&output.path().join(name)), vec!["1", "2"]);
    }

    #[test]
    fn test_read_snapshot_skips_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(
            dir.path(),
            "2016-03-01T00.data",
            &[&line(&french("1", Provider::Gnip)), "{broken", "", "{\"id\": 5}"],
        );

        let (records, stats) = read_snapshot(&path, &mut TracingReporter::new()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.lines_read, 4);
        assert_eq!(stats.unparseable, 2);
    }
}
