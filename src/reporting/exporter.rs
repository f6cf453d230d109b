//! Per-client CSV manifests and ZIP archives.
//!
//! The archive is flat: entries are named by file base name only. When two
//! records share a base name the later one replaces the earlier entry, so
//! the archive holds one file per name. Source files that vanished before
//! archiving are skipped and counted.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::errors::FinderError;
use crate::models::{ScanRequest, StatementRecord, CSV_HEADER};
use super::naming::export_file_stem;

/// Files written for one client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientExport {
    pub client: String,
    pub csv_path: PathBuf,
    pub zip_path: PathBuf,
    pub rows: usize,
    pub archived: usize,
    pub skipped_missing: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub archived: usize,
    pub skipped_missing: usize,
}

#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    year: String,
    month: String,
    types: Vec<String>,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, request: &ScanRequest) -> Self {
        Self {
            output_dir: output_dir.into(),
            year: request.year_label().to_string(),
            month: request.month_label().to_string(),
            types: request.types.clone(),
        }
    }

    /// CSV and ZIP paths for a client.
    pub fn paths_for(&self, client: &str) -> (PathBuf, PathBuf) {
        let stem = export_file_stem(&self.year, &self.month, client, &self.types);
        (
            self.output_dir.join(format!("{stem}.csv")),
            self.output_dir.join(format!("{stem}.zip")),
        )
    }

    /// Write the manifest and archive for one client's records.
    pub fn export_client(
        &self,
        client: &str,
        records: &[StatementRecord],
    ) -> Result<ClientExport, FinderError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            FinderError::export(
                client,
                format!("cannot create output directory '{}': {e}", self.output_dir.display()),
            )
        })?;

        let (csv_path, zip_path) = self.paths_for(client);
        write_csv(records, &csv_path).map_err(|e| FinderError::export(client, e))?;
        let stats = match write_zip(records, &zip_path) {
            Ok(stats) => stats,
            Err(e) => {
                // manifest without its archive is not a valid export
                discard(&csv_path);
                return Err(FinderError::export(client, e));
            }
        };

        info!(
            client = %client,
            rows = records.len(),
            archived = stats.archived,
            skipped = stats.skipped_missing,
            csv = %csv_path.display(),
            "Exported client statements"
        );

        Ok(ClientExport {
            client: client.to_string(),
            csv_path,
            zip_path,
            rows: records.len(),
            archived: stats.archived,
            skipped_missing: stats.skipped_missing,
        })
    }
}

/// Write the 7-column manifest, header first, one row per record in order.
pub fn write_csv(records: &[StatementRecord], path: &Path) -> Result<(), FinderError> {
    let tmp = staging_path(path);
    publish(&tmp, path, || {
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Deflate every record's file into a flat archive at `path`.
pub fn write_zip(records: &[StatementRecord], path: &Path) -> Result<ArchiveStats, FinderError> {
    let tmp = staging_path(path);
    publish(&tmp, path, || {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut stats = ArchiveStats::default();

        let mut zip = ZipWriter::new(File::create(&tmp)?);
        for (name, source) in archive_entries(records) {
            let mut input = match File::open(source) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %source.display(), "Source file gone, not archived");
                    stats.skipped_missing += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            zip.start_file(name, options)?;
            io::copy(&mut input, &mut zip)?;
            stats.archived += 1;
        }
        zip.finish()?;
        Ok(stats)
    })
}

/// Run `write` against the staging file, then move it over `path`.
/// The staging file never survives a failure.
fn publish<T>(
    tmp: &Path,
    path: &Path,
    write: impl FnOnce() -> Result<T, FinderError>,
) -> Result<T, FinderError> {
    let result = write().and_then(|value| {
        fs::rename(tmp, path)?;
        Ok(value)
    });
    if result.is_err() {
        discard(tmp);
    }
    result
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial export file");
        }
    }
}

/// One entry per base name, in first-seen order; the last path wins.
fn archive_entries(records: &[StatementRecord]) -> Vec<(&str, &Path)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(&str, &Path)> = Vec::with_capacity(records.len());
    for record in records {
        let name = record.file_name.as_str();
        match index.get(name) {
            Some(&i) => entries[i].1 = record.path.as_path(),
            None => {
                index.insert(name, entries.len());
                entries.push((name, record.path.as_path()));
            }
        }
    }
    entries
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn record_for(path: &Path, client: &str) -> StatementRecord {
        StatementRecord {
            manager: "Smith".into(),
            year: "2024".into(),
            month: "03-March".into(),
            file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
            client: client.into(),
            path: path.to_path_buf(),
            modified: "2024-03-01 10:00:00".into(),
        }
    }

    fn write_source(dir: &Path, rel: &str, body: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let src = write_source(dir.path(), "src/a, b.pdf", "a");
        let csv_path = dir.path().join("out.csv");
        write_csv(&[record_for(&src, "Jones")], &csv_path).unwrap();

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER.to_vec());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "a, b.pdf");
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn test_zip_is_flat_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let a = write_source(dir.path(), "m/2024/01/a.pdf", "alpha");
        let b = dir.path().join("m/2024/01/gone.pdf");
        let zip_path = dir.path().join("out.zip");

        let stats = write_zip(&[record_for(&a, "x"), record_for(&b, "x")], &zip_path).unwrap();
        assert_eq!(stats, ArchiveStats { archived: 1, skipped_missing: 1 });

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "a.pdf");
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut body = String::new();
        entry.read_to_string(&mut body).unwrap();
        assert_eq!(body, "alpha");
    }

    #[test]
    fn test_colliding_base_names_last_wins() {
        let dir = TempDir::new().unwrap();
        let first = write_source(dir.path(), "A/2024/01/stmt.pdf", "first");
        let second = write_source(dir.path(), "B/2024/01/stmt.pdf", "second");
        let zip_path = dir.path().join("out.zip");

        let stats = write_zip(&[record_for(&first, "x"), record_for(&second, "x")], &zip_path).unwrap();
        assert_eq!(stats.archived, 1);

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut body = String::new();
        archive.by_name("stmt.pdf").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "second");
    }

    #[test]
    fn test_export_client_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let src = write_source(dir.path(), "in/report_K-1.pdf", "k1");
        let request = ScanRequest::new(
            dir.path().join("in"),
            Some("2024".into()),
            Some("03-March".into()),
            vec!["report".into()],
            vec!["K-1".into()],
            Some(1),
        );
        let exporter = Exporter::new(dir.path().join("nested/out"), &request);
        let export = exporter.export_client("report", &[record_for(&src, "report")]).unwrap();

        assert!(export.csv_path.ends_with("2024_03-March_statements_report_K-1.csv"));
        assert!(export.zip_path.ends_with("2024_03-March_statements_report_K-1.zip"));
        assert!(export.csv_path.exists());
        assert!(export.zip_path.exists());
        assert_eq!(export.rows, 1);
        assert_eq!(export.archived, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_archive_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        // a directory opens fine but cannot be read as a file
        let unreadable = dir.path().join("in/2024/01/x_dir.pdf");
        fs::create_dir_all(&unreadable).unwrap();
        let request = ScanRequest::new(dir.path(), None, None, vec!["x".into()], vec![], Some(1));
        let exporter = Exporter::new(&out, &request);

        let err = exporter.export_client("x", &[record_for(&unreadable, "x")]).unwrap_err();
        assert!(matches!(err, FinderError::Export { ref client, .. } if client == "x"));

        let left: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(left.is_empty(), "files left behind: {left:?}");
    }

    #[test]
    fn test_failed_csv_removes_staging_file() {
        let dir = TempDir::new().unwrap();
        // rename onto a non-empty directory fails after the staging write
        let target = dir.path().join("taken.csv");
        fs::create_dir_all(target.join("inner")).unwrap();

        assert!(write_csv(&[], &target).is_err());
        assert!(!dir.path().join("taken.csv.tmp").exists());
    }

    #[test]
    fn test_export_failure_names_client() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a dir").unwrap();
        let request = ScanRequest::new(dir.path(), None, None, vec!["Jones".into()], vec![], Some(1));
        let exporter = Exporter::new(blocker.join("out"), &request);

        let src = write_source(dir.path(), "jones.pdf", "j");
        let err = exporter.export_client("Jones", &[record_for(&src, "Jones")]).unwrap_err();
        assert!(matches!(err, FinderError::Export { ref client, .. } if client == "Jones"));
    }
}
