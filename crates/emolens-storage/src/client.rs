//! S3-compatible storage client implementation.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Builder, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use emolens_models::ObjectKey;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Container used when `STORAGE_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "emotionvideoanalysics";

/// How the URL handed to the analysis service is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMode {
    /// Plain URL under the public base; the bucket must allow anonymous reads
    Public,
    /// Signed GET URL valid for the given duration
    Presigned(Duration),
}

/// Configuration for the storage client.
#[derive(Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for most S3-compatible stores)
    pub region: String,
    /// Base for public object URLs; `{endpoint_url}/{bucket_name}` when unset
    pub public_base_url: Option<String>,
    pub url_mode: UrlMode,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let url_mode = match std::env::var("STORAGE_PRESIGN_TTL_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    StorageError::config_error(format!(
                        "STORAGE_PRESIGN_TTL_SECS must be a number of seconds, got {raw:?}"
                    ))
                })?;
                UrlMode::Presigned(Duration::from_secs(secs))
            }
            Err(_) => UrlMode::Public,
        };

        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STORAGE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            url_mode,
        })
    }

    /// Base that public object URLs are built on, without a trailing slash.
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "{}/{}",
                self.endpoint_url.trim_end_matches('/'),
                self.bucket_name
            ),
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("public_base_url", &self.public_base_url)
            .field("url_mode", &self.url_mode)
            .finish()
    }
}

/// A stored object and the URL it can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: ObjectKey,
    pub url: String,
    pub size_bytes: u64,
}

/// Object storage client bound to one bucket.
#[derive(Clone)]
pub struct BlobClient {
    client: Client,
    bucket: String,
    public_base: String,
    url_mode: UrlMode,
}

impl BlobClient {
    /// Create a new client from configuration.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        if config.bucket_name.trim().is_empty() {
            return Err(StorageError::config_error("bucket name is empty"));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "emolens",
        );

        // No SDK retries. Checksums only when required, so the PUT body is the raw file.
        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        let public_base = config.public_base();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_base,
            url_mode: config.url_mode,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StorageConfig::from_env()?;
        Self::new(config).await
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload a local file under `{folder}/{sanitized file name}`.
    ///
    /// Overwrites any existing object at that key and returns the URL the
    /// analysis service should read it from.
    pub async fn upload_to_folder(
        &self,
        path: impl AsRef<Path>,
        folder: &str,
    ) -> StorageResult<UploadedObject> {
        let path = path.as_ref();
        let key = ObjectKey::for_path(folder, path).ok_or_else(|| {
            StorageError::invalid_key(format!("no usable file name in {}", path.display()))
        })?;

        let size_bytes = self.upload_file(path, &key).await?;
        let url = self.object_url(&key).await?;

        Ok(UploadedObject {
            key,
            url,
            size_bytes,
        })
    }

    /// Upload a file to an exact key. Returns the number of bytes sent.
    pub async fn upload_file(&self, path: impl AsRef<Path>, key: &ObjectKey) -> StorageResult<u64> {
        let path = path.as_ref();
        debug!("Uploading {} to {}", path.display(), key);

        let size_bytes = tokio::fs::metadata(path).await?.len();

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .body(body)
            .content_type(content_type_for(key.file_name()))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        info!(key = %key, size_bytes, "Uploaded {}", path.display());
        Ok(size_bytes)
    }

    /// URL for an object according to the configured [`UrlMode`].
    pub async fn object_url(&self, key: &ObjectKey) -> StorageResult<String> {
        match self.url_mode {
            UrlMode::Public => Ok(public_object_url(&self.public_base, key)),
            UrlMode::Presigned(expires_in) => self.presign_get(key.as_str(), expires_in).await,
        }
    }

    /// Generate a presigned URL for GET.
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Check connectivity by performing a head bucket operation.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "storage connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

/// `{base}/{key}` with every key segment percent-encoded.
pub fn public_object_url(base: &str, key: &ObjectKey) -> String {
    let encoded: Vec<String> = key
        .as_str()
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

/// MIME type for the accepted video containers.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
