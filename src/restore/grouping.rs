// parquetrestore/src/restore/grouping.rs
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::MalformedKeyPolicy;
use crate::errors::{RestoreError, Result};
use crate::storage::ObjectEntry;

pub const BACKUP_FILE_SUFFIX: &str = ".parquet";

/// Position of the qualified table name, counted from the end of the key.
/// `snapshot/db/production.accounts/1/part-0.parquet` has it third from last.
pub const DEFAULT_QUALIFIER_DEPTH: usize = 3;

/// How an object key maps to the table it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableKeyRule {
    pub suffix: String,
    pub qualifier_depth: usize,
}

impl Default for TableKeyRule {
    fn default() -> Self {
        TableKeyRule {
            suffix: BACKUP_FILE_SUFFIX.to_string(),
            qualifier_depth: DEFAULT_QUALIFIER_DEPTH,
        }
    }
}

impl TableKeyRule {
    pub fn is_backup_file(&self, key: &str) -> bool {
        key.ends_with(&self.suffix)
    }

    /// Table name for a backup file key: the qualifier segment with any
    /// `schema.` prefix stripped.
    pub fn table_name<'a>(&self, key: &'a str) -> Result<&'a str> {
        let anomaly = |reason: String| RestoreError::Grouping {
            key: key.to_string(),
            reason,
        };

        let qualifier = key
            .rsplit('/')
            .nth(self.qualifier_depth.saturating_sub(1))
            .ok_or_else(|| {
                anomaly(format!(
                    "expected at least {} path segments",
                    self.qualifier_depth
                ))
            })?;
        if qualifier.is_empty() {
            return Err(anomaly("table qualifier segment is empty".to_string()));
        }

        let table = qualifier.rsplit('.').next().unwrap_or(qualifier);
        if table.is_empty() {
            return Err(anomaly(format!(
                "qualifier '{}' has no table name after the last '.'",
                qualifier
            )));
        }
        Ok(table)
    }
}

/// Backup files grouped by destination table, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct TableFileGroup {
    tables: Vec<(String, Vec<ObjectEntry>)>,
    index: HashMap<String, usize>,
}

impl TableFileGroup {
    pub fn push(&mut self, table: &str, entry: ObjectEntry) {
        match self.index.get(table) {
            Some(&position) => self.tables[position].1.push(entry),
            None => {
                self.index.insert(table.to_string(), self.tables.len());
                self.tables.push((table.to_string(), vec![entry]));
            }
        }
    }

    pub fn get(&self, table: &str) -> Option<&[ObjectEntry]> {
        self.index
            .get(table)
            .map(|&position| self.tables[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ObjectEntry])> {
        self.tables
            .iter()
            .map(|(table, files)| (table.as_str(), files.as_slice()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(table, _)| table.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.tables.iter().map(|(_, files)| files.len()).sum()
    }

    /// Keeps only the tables accepted by `keep`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tables.retain(|(table, _)| keep(table));
        self.index = self
            .tables
            .iter()
            .enumerate()
            .map(|(position, (table, _))| (table.clone(), position))
            .collect();
    }
}

/// Result of grouping a listing.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub groups: TableFileGroup,
    /// Keys with the backup suffix that did not fit the layout.
    pub malformed_keys: Vec<String>,
}

/// Maps every backup file in `objects` to its table. Keys without the backup
/// suffix are ignored.
pub fn group_by_table(
    objects: &[ObjectEntry],
    rule: &TableKeyRule,
    malformed: MalformedKeyPolicy,
) -> Result<Grouping> {
    let mut grouping = Grouping::default();

    for object in objects {
        if !rule.is_backup_file(&object.key) {
            continue;
        }

        match rule.table_name(&object.key) {
            Ok(table) => {
                debug!(key = %object.key, table, "Table name derived");
                grouping.groups.push(table, object.clone());
            }
            Err(err) if malformed == MalformedKeyPolicy::Skip => {
                warn!("Skipping object: {}", err);
                grouping.malformed_keys.push(object.key.clone());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(grouping)
}
