// parquetrestore/src/storage/mod.rs
pub(crate) mod s3;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::config::StorageLocation;
use crate::errors::{RestoreError, Result};

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        ObjectEntry {
            key: key.into(),
            size,
        }
    }
}

/// A single page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectEntry>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

/// Read access to the bucket holding the backup.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of keys under `prefix`, resuming from `continuation_token`.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Fetches the full body of one object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes>;
}

/// Lists every object under the location, following continuation tokens
/// until the store reports the listing is complete.
pub async fn list_all_objects(
    store: &dyn ObjectStore,
    location: &StorageLocation,
) -> Result<Vec<ObjectEntry>> {
    let mut page = store
        .list_page(&location.bucket, &location.prefix, None)
        .await?;
    let mut all_objects = std::mem::take(&mut page.objects);
    let mut pages = 1usize;

    while page.is_truncated {
        let token = page
            .next_continuation_token
            .take()
            .ok_or_else(|| RestoreError::Discovery {
                bucket: location.bucket.clone(),
                prefix: location.prefix.clone(),
                source: "listing was truncated but no continuation token was returned".into(),
            })?;

        page = store
            .list_page(&location.bucket, &location.prefix, Some(token))
            .await?;
        pages += 1;
        debug!(page = pages, objects = page.objects.len(), "Fetched listing page");

        all_objects.append(&mut page.objects);
    }

    Ok(all_objects)
}
