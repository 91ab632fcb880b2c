//! Access to input units: plain files and members of `.tgz` archives.
//!
//! Archives are streamed. [`for_each_member`] visits every selected member of
//! one archive in a single forward pass and releases the archive handle when
//! it returns.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use snapshot_core::error::{Result, SnapshotError};
use tracing::debug;

use crate::selector::RawUnit;

/// Names of the regular-file members of the archive at `path`, in archive
/// order.
pub fn list_members(path: &Path) -> Result<Vec<String>> {
    let archive_err = |source| SnapshotError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(archive_err)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut names = Vec::new();

    for entry in archive.entries().map_err(archive_err)? {
        let entry = entry.map_err(archive_err)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        if let Some(name) = entry_name(&entry) {
            names.push(name);
        }
    }

    debug!("{}: {} members", path.display(), names.len());
    Ok(names)
}

/// Hand a line reader over each of `members` to `f`, in archive order.
///
/// The archive is decompressed once, and reading stops as soon as every
/// member has been seen. A member that occurs twice is visited once. Members
/// absent from the archive are not visited; the caller tells them apart.
pub fn for_each_member<F>(archive: &Path, members: &[String], mut f: F) -> Result<()>
where
    F: FnMut(&str, &mut dyn BufRead),
{
    let archive_err = |source| SnapshotError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let mut pending: HashSet<&str> = members.iter().map(String::as_str).collect();
    debug!("reading {} members of {}", pending.len(), archive.display());

    let file = File::open(archive).map_err(archive_err)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    for entry in tar.entries().map_err(archive_err)? {
        if pending.is_empty() {
            break;
        }
        let entry = entry.map_err(archive_err)?;
        let Some(name) = entry_name(&entry) else {
            continue;
        };
        if !pending.remove(name.as_str()) {
            continue;
        }
        let mut reader = BufReader::new(entry);
        f(&name, &mut reader);
    }

    Ok(())
}

/// Open `unit` and hand its line reader to `f`.
///
/// The file or archive handle is closed when `f` returns.
pub fn with_unit_reader<T, F>(unit: &RawUnit, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn BufRead) -> Result<T>,
{
    match unit {
        RawUnit::File { path } => {
            let file = File::open(path).map_err(|source| SnapshotError::FileRead {
                path: path.clone(),
                source,
            })?;
            let mut reader = BufReader::new(file);
            f(&mut reader)
        }
        RawUnit::ArchiveMember { archive, member } => {
            let mut f = Some(f);
            let mut outcome = None;
            for_each_member(archive, std::slice::from_ref(member), |_, reader| {
                if let Some(f) = f.take() {
                    outcome = Some(f(reader));
                }
            })?;
            outcome.unwrap_or_else(|| {
                Err(SnapshotError::MemberNotFound {
                    archive: archive.clone(),
                    member: member.clone(),
                })
            })
        }
    }
}

fn entry_name<R: Read>(entry: &tar::Entry<'_, R>) -> Option<String> {
    entry
        .path()
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_lines, write_tgz};
    use std::io::Read as _;
    use tempfile::TempDir;

    fn read_all(unit: &RawUnit) -> Result<String> {
        with_unit_reader(unit, |reader| {
            let mut out = String::new();
            reader.read_to_string(&mut out)?;
            Ok(out)
        })
    }

    #[test]
    fn test_list_members() {
        let dir = TempDir::new().unwrap();
        let path = write_tgz(
            dir.path(),
            "2015-06-01.tgz",
            &[
                ("export/2015-06-01T00.data", "{}\n"),
                ("export/2015-06-02T00.data", "{}\n"),
            ],
        );

        let names = list_members(&path).unwrap();
        assert_eq!(
            names,
            vec!["export/2015-06-01T00.data", "export/2015-06-02T00.data"]
        );
    }

    #[test]
    fn test_list_members_not_an_archive() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(dir.path(), "2015-06-01.tgz", &["plain text"]);
        let err = list_members(&path).unwrap_err();
        assert!(matches!(err, SnapshotError::Archive { .. }));
    }

    #[test]
    fn test_read_plain_file() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(dir.path(), "2016-01-01T00.data", &["a", "b"]);
        let content = read_all(&RawUnit::File { path }).unwrap();
        assert_eq!(content, "a\nb\n");
    }

    #[test]
    fn test_read_missing_plain_file() {
        let err = read_all(&RawUnit::File {
            path: "/tmp/does-not-exist-snapshot-xyz.data".into(),
        })
        .unwrap_err();
        assert!(matches!(err, SnapshotError::FileRead { .. }));
    }

    #[test]
    fn test_read_archive_member() {
        let dir = TempDir::new().unwrap();
        let archive = write_tgz(
            dir.path(),
            "2015-06-01.tgz",
            &[
                ("export/2015-06-01T00.data", "first\n"),
                ("export/2015-06-02T00.data", "second\n"),
            ],
        );
        let unit = RawUnit::ArchiveMember {
            archive,
            member: "export/2015-06-02T00.data".to_string(),
        };
        assert_eq!(read_all(&unit).unwrap(), "second\n");
    }

    #[test]
    fn test_for_each_member_single_pass() {
        let dir = TempDir::new().unwrap();
        let archive = write_tgz(
            dir.path(),
            "2015-06-01.tgz",
            &[
                ("2015-06-01T00.data", "one\n"),
                ("2015-06-01T01.data", "skipped\n"),
                ("2015-06-01T02.data", "two\n"),
                ("2015-06-01T02.data", "duplicate\n"),
            ],
        );
        let members = vec![
            "2015-06-01T02.data".to_string(),
            "2015-06-01T00.data".to_string(),
            "2015-06-01T09.data".to_string(),
        ];

        let mut seen: Vec<(String, String)> = Vec::new();
        for_each_member(&archive, &members, |name, reader| {
            let mut content = String::new();
            reader.read_to_string(&mut content).unwrap();
            seen.push((name.to_string(), content));
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("2015-06-01T00.data".to_string(), "one\n".to_string()),
                ("2015-06-01T02.data".to_string(), "two\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_for_each_member_unreadable_archive() {
        let dir = TempDir::new().unwrap();
        let path = write_lines(dir.path(), "2015-06-01.tgz", &["plain text"]);
        let mut visited = 0;
        let err = for_each_member(&path, &["a.data".to_string()], |_, _| visited += 1)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Archive { .. }));
        assert_eq!(visited, 0);
    }

    #[test]
    fn test_read_absent_member() {
        let dir = TempDir::new().unwrap();
        let archive = write_tgz(dir.path(), "2015-06-01.tgz", &[("a.data", "x\n")]);
        let unit = RawUnit::ArchiveMember {
            archive,
            member: "b.data".to_string(),
        };
        let err = read_all(&unit).unwrap_err();
        assert!(matches!(err, SnapshotError::MemberNotFound { .. }));
    }
}
