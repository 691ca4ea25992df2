//! Record Store - loads logged checkpoints from a sweep output directory
//!
//! ## Layout
//!
//! ```text
//! <input_dir>/
//!   <run_hash_a>/results.jsonl   one JSON object per checkpoint
//!   <run_hash_b>/results.jsonl
//!   ...
//! ```
//!
//! Run directories without a `results.jsonl` (runs that never logged) are
//! skipped. Lines that are not valid JSON or do not describe a checkpoint are
//! dropped here with a warning, so the query layer only ever sees well-formed
//! records.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::Record;
use crate::query::Q;
use crate::Result;

/// File name of the per-run checkpoint log.
pub const RESULTS_FILE: &str = "results.jsonl";

/// Counters describing one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Run directories that contained a results file
    pub run_dirs: usize,
    /// Records accepted
    pub records: usize,
    /// Lines rejected as malformed
    pub skipped_lines: usize,
}

/// In-memory store of every checkpoint of a sweep output directory.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Q<Record>,
    summary: LoadSummary,
}

impl RecordStore {
    /// Create a store from already-parsed records.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let summary = LoadSummary {
            run_dirs: 0,
            records: records.len(),
            skipped_lines: 0,
        };
        Self {
            records: Q::new(records),
            summary,
        }
    }

    /// Load every `*/results.jsonl` under `input_dir`.
    ///
    /// Subdirectories are visited in name order so repeated loads of the same
    /// directory produce the same record order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if `input_dir` cannot be listed or a results file
    /// exists but cannot be read.
    pub fn load_dir<P: AsRef<Path>>(input_dir: P) -> Result<Self> {
        let input_dir = input_dir.as_ref();

        let mut run_dirs: Vec<PathBuf> = fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        run_dirs.sort();

        let mut summary = LoadSummary::default();
        let mut records = Vec::new();

        for dir in run_dirs {
            let results_path = dir.join(RESULTS_FILE);
            let file = match File::open(&results_path) {
                Ok(file) => file,
                Err(e) => {
                    debug!(path = %results_path.display(), error = %e, "no results file, skipping");
                    continue;
                }
            };
            summary.run_dirs += 1;
            summary.skipped_lines += read_records(BufReader::new(file), &results_path, &mut records)?;
        }

        summary.records = records.len();
        info!(
            input_dir = %input_dir.display(),
            run_dirs = summary.run_dirs,
            records = summary.records,
            skipped_lines = summary.skipped_lines,
            "loaded records"
        );

        Ok(Self {
            records: Q::new(records),
            summary,
        })
    }

    /// All loaded records, in load order.
    #[must_use]
    pub const fn records(&self) -> &Q<Record> {
        &self.records
    }

    /// Load counters.
    #[must_use]
    pub const fn summary(&self) -> LoadSummary {
        self.summary
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse JSON lines into records; returns the number of rejected lines.
///
/// # Errors
///
/// Returns `Error::Io` if reading fails.
pub fn read_records<R: BufRead>(reader: R, source: &Path, out: &mut Vec<Record>) -> Result<usize> {
    let mut skipped = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str::<serde_json::Value>(&line)
            .map_err(crate::Error::from)
            .and_then(Record::from_json);
        match parsed {
            Ok(record) => out.push(record),
            Err(e) => {
                warn!(path = %source.display(), line = index + 1, error = %e, "skipping malformed record");
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_store_default() {
        let store = RecordStore::default();
        assert!(store.is_empty());
        assert_eq!(store.summary(), LoadSummary::default());
    }

    #[test]
    fn test_read_records_skips_malformed() {
        let input = concat!(
            r#"{"args":{"dataset":"VLCS","algorithm":"ERM","test_envs":[0],"trial_seed":0,"hparams_seed":0},"step":0,"env0_out_acc":0.5}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"args":{"dataset":"VLCS"},"step":1}"#,
            "\n",
        );
        let mut out = Vec::new();
        let skipped = read_records(Cursor::new(input), Path::new("mem"), &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(skipped, 2);
        assert_eq!(out[0].out_acc(0), Some(0.5));
    }

    #[test]
    fn test_from_records() {
        let store = RecordStore::from_records(vec![Record::builder("PACS", "ERM", 0).build()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.summary().records, 1);
    }
}
