// parquetrestore/src/restore/report.rs
use tracing::{error, info, warn};

use crate::errors::RestoreError;

/// What happened to one table.
#[derive(Debug)]
pub struct TableOutcome {
    pub table: String,
    pub files: usize,
    pub chunks: usize,
    /// Rows appended before the table finished or failed.
    pub rows_committed: u64,
    pub result: Result<u64, RestoreError>,
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of one restore run.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub objects_discovered: usize,
    pub malformed_keys: Vec<String>,
    pub missing_tables: Vec<String>,
    pub tables: Vec<TableOutcome>,
}

impl RestoreReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|t| t.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|t| !t.is_success())
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_committed).sum()
    }

    /// True when no attempted table failed. A run with no tables succeeds.
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn log_summary(&self) {
        if !self.malformed_keys.is_empty() {
            warn!(
                "{} backup file(s) were skipped because their keys don't follow the backup layout",
                self.malformed_keys.len()
            );
        }
        for outcome in self.failed() {
            if let Err(e) = &outcome.result {
                error!(
                    table = %outcome.table,
                    stage = e.stage(),
                    "❌ Table {} ({} file(s), {} chunk(s), {} row(s) committed) failed: {}",
                    outcome.table,
                    outcome.files,
                    outcome.chunks,
                    outcome.rows_committed,
                    e
                );
            }
        }
        info!(
            "Restored {} of {} table(s), {} row(s) appended",
            self.succeeded().count(),
            self.tables.len(),
            self.total_rows()
        );
    }
}
