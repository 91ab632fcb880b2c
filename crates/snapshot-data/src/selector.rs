//! Date-windowed discovery of input units.
//!
//! Raw exports are named after the moment their collection started
//! (`2016-03-01T10-00-00.data`). Older periods were bundled into per-period
//! `.tgz` archives (`2015-06-01.tgz`) whose members follow the same naming.

use std::path::{Path, PathBuf};

use snapshot_core::time_utils::{archive_date_token, date_token, DateWindow};
use tracing::{debug, info, warn};

use crate::archive::list_members;

// ── RawUnit ───────────────────────────────────────────────────────────────────

/// One source of raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawUnit {
    /// A plain file on disk.
    File { path: PathBuf },
    /// A member of a `.tgz` archive.
    ArchiveMember { archive: PathBuf, member: String },
}

impl RawUnit {
    /// Path of the file, or the member name inside its archive.
    pub fn name(&self) -> String {
        match self {
            RawUnit::File { path } => path.to_string_lossy().into_owned(),
            RawUnit::ArchiveMember { member, .. } => member.clone(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Units under `root` whose date token falls in `window`.
///
/// Archive members come first, then plain files sorted by path: archives hold
/// the older collection period. Members stay grouped by archive (archives in
/// path order) and are sorted by name within their archive, so each archive
/// can be read in one pass.
pub fn find_units(root: &Path, window: &DateWindow) -> Vec<RawUnit> {
    info!("looking for files to treat in {}", root.display());

    let mut archived: Vec<RawUnit> = Vec::new();
    for archive in list_archives(root, window) {
        debug!("checking: {}", archive.display());
        let mut members: Vec<String> = match list_members(&archive) {
            Ok(names) => names
                .into_iter()
                .filter(|name| is_selected_member(name, window))
                .collect(),
            Err(e) => {
                warn!("skipping unreadable archive {}: {}", archive.display(), e);
                continue;
            }
        };
        members.sort();
        members.dedup();
        archived.extend(members.into_iter().map(|member| RawUnit::ArchiveMember {
            archive: archive.clone(),
            member,
        }));
    }

    let plain = list_data_files(root, window)
        .into_iter()
        .map(|path| RawUnit::File { path });

    let units: Vec<RawUnit> = archived.into_iter().chain(plain).collect();
    info!("{} files to treat", units.len());
    units
}

/// Plain `.data` files directly under `root` whose date token falls in
/// `window`, sorted by path.
pub fn list_data_files(root: &Path, window: &DateWindow) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = top_level_files(root)
        .into_iter()
        .filter(|path| {
            let name = path.to_string_lossy();
            name.ends_with(".data") && window.contains_token(date_token(&name))
        })
        .collect();
    files.sort();
    files
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `.tgz` archives directly under `root` whose own date falls in `window`.
fn list_archives(root: &Path, window: &DateWindow) -> Vec<PathBuf> {
    let mut archives: Vec<PathBuf> = top_level_files(root)
        .into_iter()
        .filter(|path| {
            let name = path.to_string_lossy();
            name.ends_with(".tgz") && window.contains_token(archive_date_token(&name))
        })
        .collect();
    archives.sort();
    archives
}

/// Regular files directly inside `root` (no recursion).
fn top_level_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        warn!("Data path does not exist: {}", root.display());
        return Vec::new();
    }

    walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Archive members must be dated in the window, end in `.data`, and not be
/// a `.retweets.data` side file.
fn is_selected_member(name: &str, window: &DateWindow) -> bool {
    name.ends_with(".data")
        && name.rsplit('.').nth(1) != Some("retweets")
        && window.contains_token(date_token(name))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
