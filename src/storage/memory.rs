// parquetrestore/src/storage/memory.rs
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ListPage, ObjectEntry, ObjectStore};
use crate::errors::{RestoreError, Result};

/// Bucket stand-in that lists keys in lexicographic order, `page_size` at a time.
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), Bytes>>,
    failing_keys: Mutex<HashSet<String>>,
    failing_list_page: Mutex<Option<usize>>,
    page_size: usize,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn with_page_size(page_size: usize) -> Self {
        MemoryObjectStore {
            objects: Mutex::new(BTreeMap::new()),
            failing_keys: Mutex::new(HashSet::new()),
            failing_list_page: Mutex::new(None),
            page_size: page_size.max(1),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    /// Makes every later fetch of `key` fail.
    pub fn fail_on_get(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Makes the `page`-th listing call (1-based) fail.
    pub fn fail_on_list_page(&self, page: usize) {
        *self.failing_list_page.lock().unwrap() = Some(page);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.failing_list_page.lock().unwrap() == Some(call) {
            return Err(RestoreError::Discovery {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                source: "AccessDenied".into(),
            });
        }
        let objects = self.objects.lock().unwrap();

        let start = match continuation_token {
            Some(token) => Bound::Excluded((bucket.to_string(), token)),
            None => Bound::Included((bucket.to_string(), String::new())),
        };
        let mut matching = objects
            .range((start, Bound::Unbounded))
            .take_while(|((b, _), _)| b == bucket)
            .filter(|((_, key), _)| key.starts_with(prefix));

        let page: Vec<ObjectEntry> = matching
            .by_ref()
            .take(self.page_size)
            .map(|((_, key), body)| ObjectEntry::new(key.clone(), body.len() as u64))
            .collect();
        let is_truncated = matching.next().is_some();

        Ok(ListPage {
            next_continuation_token: if is_truncated {
                page.last().map(|o| o.key.clone())
            } else {
                None
            },
            objects: page,
            is_truncated,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(RestoreError::Fetch {
                key: key.to_string(),
                source: "injected fetch failure".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| RestoreError::Fetch {
                key: key.to_string(),
                source: "NoSuchKey".into(),
            })
    }
}
