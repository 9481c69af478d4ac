// parquetrestore/src/restore/chunking.rs
use crate::storage::ObjectEntry;

/// Files per in-memory batch before a table is split into chunks.
pub const DEFAULT_CHUNK_FILES: usize = 20;

/// Upper bounds on how much is decoded into memory before one append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    pub max_files: usize,
    pub max_bytes: Option<u64>,
}

impl Default for ChunkBudget {
    fn default() -> Self {
        ChunkBudget {
            max_files: DEFAULT_CHUNK_FILES,
            max_bytes: None,
        }
    }
}

/// Splits a table's files into consecutive chunks that respect the budget.
///
/// Every file lands in exactly one chunk and order is preserved across chunk
/// boundaries. A file larger than `max_bytes` gets a chunk to itself.
pub fn plan_chunks<'a>(files: &'a [ObjectEntry], budget: &ChunkBudget) -> Vec<&'a [ObjectEntry]> {
    let max_files = budget.max_files.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut bytes = 0u64;

    for (index, file) in files.iter().enumerate() {
        let count = index - start;
        let over_bytes = budget
            .max_bytes
            .is_some_and(|limit| count > 0 && bytes.saturating_add(file.size) > limit);

        if count == max_files || over_bytes {
            chunks.push(&files[start..index]);
            start = index;
            bytes = 0;
        }
        bytes = bytes.saturating_add(file.size);
    }

    if start < files.len() {
        chunks.push(&files[start..]);
    }
    chunks
}
