use crate::content_type::content_type_for;
use crate::traits::{validate_key, ObjectStore, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use mediashift_core::MigrationConfig;
use std::path::Path;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 5;
const OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// S3 object store implementation
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3ObjectStore {
    /// Create a new S3ObjectStore with static credentials
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `access_key_id` / `secret_access_key` - Static credentials
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        region: String,
        access_key_id: &str,
        secret_access_key: &str,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        if region.trim().is_empty() {
            return Err(StorageError::ConfigError("region must not be empty".to_string()));
        }

        let retry_config = RetryConfig::standard()
            .with_max_attempts(MAX_ATTEMPTS)
            .with_retry_mode(RetryMode::Adaptive);

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "mediashift-static",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(credentials)
            .retry_config(retry_config)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(OPERATION_TIMEOUT)
                    .build(),
            );

        if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing is required for MinIO and most S3-compatible providers
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Ok(S3ObjectStore {
            client: Client::from_conf(s3_config_builder.build()),
            region,
            endpoint_url,
        })
    }

    pub fn from_config(config: &MigrationConfig) -> StorageResult<Self> {
        Self::new(
            config.region.clone(),
            &config.credentials.access_key_id,
            &config.credentials.secret_access_key,
            config.endpoint.clone(),
        )
    }

    /// Direct (non-CDN) URL of an object, for logging.
    fn object_url(&self, bucket: &str, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, source: &Path) -> StorageResult<()> {
        validate_key(key)?;

        let start = std::time::Instant::now();
        let body = ByteStream::from_path(source).await.map_err(|e| {
            StorageError::SourceUnreadable(format!("{}: {}", source.display(), e))
        })?;
        let size = body.size_hint().0;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type_for(source))
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            url = %self.object_url(bucket, key),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %DisplayErrorContext(&e),
                    bucket = %bucket,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 head_bucket failed"
                );
                StorageError::BucketUnreachable(DisplayErrorContext(&e).to_string())
            })?;

        tracing::debug!(
            bucket = %bucket,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 head_bucket successful"
        );

        Ok(())
    }
}
