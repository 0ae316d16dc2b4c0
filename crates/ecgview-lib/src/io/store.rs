//! Directory scan that turns WFDB headers into loaded records.

use super::wfdb::load_wfdb_record;
use crate::record::{Record, RecordMetadata};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER_EXTENSION: &str = "hea";

/// A recording that could not be loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFailure {
    pub id: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch load: every record that loaded, and why the rest did not.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: BTreeMap<String, Record>,
    pub paths: BTreeMap<String, PathBuf>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn metadata(&self) -> Vec<RecordMetadata> {
        self.records
            .values()
            .map(|record| record.metadata(self.paths.get(&record.id).cloned()))
            .collect()
    }

    fn insert(&mut self, path: &Path, record: Record) {
        if let Some(first) = self.paths.get(&record.id) {
            let reason = format!("duplicate record id, already loaded from {}", first.display());
            warn!("skipping {}: {}", path.display(), reason);
            self.failures.push(LoadFailure {
                id: record.id,
                path: path.to_path_buf(),
                reason,
            });
            return;
        }
        self.paths.insert(record.id.clone(), path.to_path_buf());
        self.records.insert(record.id.clone(), record);
    }
}

/// Source of recordings keyed by record id.
pub trait RecordStore {
    fn load_all(&self, dir: &Path) -> LoadReport;
}

/// Loads WFDB header/signal pairs found anywhere below a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct WfdbStore;

impl RecordStore for WfdbStore {
    fn load_all(&self, dir: &Path) -> LoadReport {
        load_all(dir)
    }
}

/// Scan `dir` recursively for `.hea` files, in sorted path order.
///
/// A missing directory yields an empty report. Records that fail to load are
/// logged and listed in `failures`; when two headers share a record id the
/// first one in path order is kept.
pub fn load_all(dir: &Path) -> LoadReport {
    let mut report = LoadReport::default();
    if !dir.is_dir() {
        info!("record directory {} does not exist", dir.display());
        return report;
    }
    let mut headers = Vec::new();
    collect_headers(dir, &mut headers);
    headers.sort();

    for header in headers {
        match load_wfdb_record(&header) {
            Ok(record) => report.insert(&header, record),
            Err(err) => {
                let id = record_id(&header);
                warn!("failed to load record {}: {:#}", id, err);
                report.failures.push(LoadFailure {
                    id,
                    path: header,
                    reason: format!("{:#}", err),
                });
            }
        }
    }
    info!(
        "loaded {} record(s) from {} ({} skipped)",
        report.records.len(),
        dir.display(),
        report.failures.len()
    );
    report
}

fn collect_headers(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot list {}: {}", dir.display(), err);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_headers(&path, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(HEADER_EXTENSION))
        {
            out.push(path);
        }
    }
}

fn record_id(header: &Path) -> String {
    header
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::wfdb::tests::write_record_212;

    fn beats(n: usize) -> Vec<(i16, i16)> {
        (0..n).map(|i| (((i % 10) * 10) as i16, 0)).collect()
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = load_all(&dir.path().join("nope"));
        assert!(report.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("g1");
        fs::create_dir_all(&nested).unwrap();
        write_record_212(&nested, "A0001", 500, ["I", "II"], &beats(500), &["Dx: 426783006"]);
        fs::write(dir.path().join("broken.hea"), "broken two 500\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a header").unwrap();

        let report = load_all(dir.path());
        assert_eq!(report.records.len(), 1);
        assert!(report.records.contains_key("A0001"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "broken");

        let meta = report.metadata();
        assert_eq!(meta[0].n_leads, 2);
        assert_eq!(meta[0].diagnosis, "Dx: 426783006");
        assert!((meta[0].length_seconds - 1.0).abs() < 1e-12);
        assert_eq!(meta[0].file_path, Some(nested.join("A0001.hea")));
    }

    #[test]
    fn duplicate_ids_keep_first_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a");
        let second = dir.path().join("b");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        write_record_212(&first, "R1", 250, ["I", "II"], &beats(250), &[]);
        write_record_212(&second, "R1", 500, ["I", "II"], &beats(500), &[]);

        let report = WfdbStore.load_all(dir.path());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records["R1"].fs(), 250.0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("duplicate record id"));
        assert_eq!(report.failures[0].path, second.join("R1.hea"));
    }
}
