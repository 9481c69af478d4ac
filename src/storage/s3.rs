// parquetrestore/src/storage/s3.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use s3::config::Region;
use tracing::debug;

use super::{ListPage, ObjectEntry, ObjectStore};
use crate::config::S3Options;
use crate::errors::{RestoreError, Result};

/// Backup source backed by AWS S3 or an S3-compatible service.
pub struct S3ObjectStore {
    client: s3::Client,
}

impl S3ObjectStore {
    /// Builds a client for `region`, using the default credential chain unless
    /// static keys are configured.
    pub async fn connect(region: &str, options: &S3Options) -> Self {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()));

        if let Some(endpoint_url) = &options.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let (Some(key_id), Some(secret)) = (&options.access_key_id, &options.secret_access_key) {
            loader = loader.credentials_provider(s3::config::Credentials::new(
                key_id, secret, None, // session_token
                None, // expiry
                "Static",
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style)
            .build();

        S3ObjectStore {
            client: s3::Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| RestoreError::Discovery {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                source: DisplayErrorContext(e).to_string().into(),
            })?;

        debug!(
            key_count = output.key_count().unwrap_or_default(),
            truncated = output.is_truncated().unwrap_or(false),
            "ListObjectsV2 response"
        );

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                object.key().map(|key| {
                    ObjectEntry::new(key, object.size().unwrap_or_default().max(0) as u64)
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| RestoreError::Fetch {
                key: key.to_string(),
                source: DisplayErrorContext(e).to_string().into(),
            })?;

        let body = object.body.collect().await.map_err(|e| RestoreError::Fetch {
            key: key.to_string(),
            source: e.into(),
        })?;

        Ok(body.into_bytes())
    }
}
