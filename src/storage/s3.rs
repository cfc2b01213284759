//! S3-compatible storage backend
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    types::{Delete, ObjectIdentifier},
    Client,
};
use bytes::Bytes;

use crate::config::StorageConfig;

use super::{ObjectPage, ObjectStore, PutReceipt, StorageError, StoredObject};

/// Build an S3 client from configuration.
///
/// The same client is shared by the avatar and header stores; only the
/// bucket differs between them.
pub async fn s3_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        &config.access_key,
        &config.secret_key,
        None,
        None,
        "ens-media-server",
    );

    let region = config
        .region
        .clone()
        .unwrap_or_else(|| "us-east-1".to_string());

    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .endpoint_url(&config.endpoint)
        .region(Region::new(region))
        .credentials_provider(credentials)
        .force_path_style(true) // Required for MinIO and other S3-compatible services
        .build();

    Client::from_conf(s3_config)
}

/// Object store backed by a single S3-compatible bucket
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store over an existing client and bucket
    pub async fn new(client: Client, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();

        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Self { client, bucket }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    return Ok(None);
                }
                return Err(StorageError::Sdk(format!(
                    "Failed to get object {}: {}",
                    key, service
                )));
            }
        };

        let content_type = response.content_type().map(|s| s.to_string());

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Sdk(format!("Failed to read object body: {}", e)))?
            .into_bytes();

        Ok(Some(StoredObject {
            key: key.to_string(),
            content_type,
            data,
        }))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutReceipt, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(data.into())
            .send()
            .await
            .map_err(|e| StorageError::Sdk(format!("Failed to put object {}: {}", key, e)))?;

        Ok(PutReceipt {
            key: key.to_string(),
        })
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ObjectPage, StorageError> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix);

        if let Some(token) = cursor {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Sdk(format!("Failed to list objects: {}", e)))?;

        let keys: Vec<String> = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|s| s.to_string()))
            .collect();

        Ok(ObjectPage {
            keys,
            cursor: response.next_continuation_token().map(|s| s.to_string()),
            truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }

        let objects: Vec<ObjectIdentifier> = keys
            .iter()
            .map(|key| {
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(|e| StorageError::Sdk(format!("Invalid delete key {}: {}", key, e)))
            })
            .collect::<Result<_, _>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| StorageError::Sdk(format!("Failed to build delete request: {}", e)))?;

        self.client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StorageError::Sdk(format!("Failed to delete objects: {}", e)))?;

        Ok(())
    }
}
