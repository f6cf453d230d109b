//! Manager tree traversal.
//!
//! Layout under a manager directory is `<year>/<month>/...`. The walker picks
//! the year and month directories selected by the filters, then descends
//! every subdirectory below each month with an explicit stack. Unreadable
//! entries are skipped; only a manager or year directory that cannot be
//! listed fails the walk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use tracing::{debug, trace, warn};
use crate::errors::FinderError;
use crate::models::{client_label, ScanRequest, StatementRecord};
use super::matcher::{matches_client, TypeFilter};

/// Timestamp layout of `StatementRecord::modified`.
pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Year/month/type filters shared by every task of a run.
#[derive(Debug, Clone)]
pub struct WalkFilter {
    pub year: Option<String>,
    pub month: Option<String>,
    pub types: TypeFilter,
}

impl WalkFilter {
    pub fn new(
        year: Option<String>,
        month: Option<String>,
        types: &[String],
    ) -> Result<Self, FinderError> {
        Ok(Self {
            year,
            month,
            types: TypeFilter::new(types)?,
        })
    }

    pub fn from_request(request: &ScanRequest) -> Result<Self, FinderError> {
        Self::new(request.year.clone(), request.month.clone(), &request.types)
    }
}

/// Month directories to scan under one year directory.
///
/// With a month filter only that directory is returned, and only if it
/// exists. Without one, every immediate subdirectory is returned. Symlinks
/// are never treated as month directories.
pub fn months_to_process(year_dir: &Path, month: Option<&str>) -> Result<Vec<PathBuf>, FinderError> {
    if let Some(month) = month {
        let month_dir = year_dir.join(month);
        return Ok(if is_real_dir(&month_dir) { vec![month_dir] } else { Vec::new() });
    }
    list_subdirs(year_dir)
}

/// All records under `manager_dir` matching `client` and the shared filters.
pub fn walk_manager(
    manager_dir: &Path,
    client: &str,
    filter: &WalkFilter,
) -> Result<Vec<StatementRecord>, FinderError> {
    let manager = dir_name(manager_dir);
    let month_dirs = select_month_dirs(manager_dir, filter)?;

    let mut records = Vec::new();
    for month_dir in &month_dirs {
        walk_month(month_dir, &manager, client, filter, &mut records);
    }

    debug!(
        manager = %manager,
        client = %client,
        month_dirs = month_dirs.len(),
        matched = records.len(),
        "Manager walk finished"
    );
    Ok(records)
}

fn select_month_dirs(manager_dir: &Path, filter: &WalkFilter) -> Result<Vec<PathBuf>, FinderError> {
    let month = filter.month.as_deref();
    match filter.year.as_deref() {
        Some(year) => {
            let year_dir = manager_dir.join(year);
            if !is_real_dir(&year_dir) {
                trace!(path = %year_dir.display(), "Year directory absent");
                return Ok(Vec::new());
            }
            months_to_process(&year_dir, month)
        }
        None => {
            let mut month_dirs = Vec::new();
            for year_dir in list_subdirs(manager_dir)? {
                match months_to_process(&year_dir, month) {
                    Ok(dirs) => month_dirs.extend(dirs),
                    Err(e) => warn!(error = %e, "Skipping unreadable year directory"),
                }
            }
            Ok(month_dirs)
        }
    }
}

/// Depth-first traversal below one month directory.
fn walk_month(
    month_dir: &Path,
    manager: &str,
    client: &str,
    filter: &WalkFilter,
    out: &mut Vec<StatementRecord>,
) {
    let mut pending = vec![month_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match sorted_entries(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries {
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "Skipping entry");
                    continue;
                }
            };

            if file_type.is_dir() {
                subdirs.push(entry.path());
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !matches_client(&file_name, client) || !filter.types.matches(&file_name) {
                continue;
            }

            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(time) => DateTime::<Local>::from(time).format(MODIFIED_FORMAT).to_string(),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping file without readable mtime");
                    continue;
                }
            };

            let parent = path.parent().unwrap_or(month_dir);
            let year = parent.parent().map(dir_name).unwrap_or_default();
            let month = dir_name(parent);
            out.push(StatementRecord {
                manager: manager.to_string(),
                year,
                month,
                file_name,
                client: client_label(client),
                path,
                modified,
            });
        }

        // reversed so the stack pops subdirectories in name order
        pending.extend(subdirs.into_iter().rev());
    }
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>, FinderError> {
    let entries = sorted_entries(dir).map_err(|source| FinderError::Walk {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries
        .into_iter()
        .filter(|e| e.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect())
}

/// Directory check that does not follow symlinks, matching `list_subdirs`.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
