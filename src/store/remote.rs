//! Object-storage tile store.
//!
//! High-zoom tiles are kept in a bucket under `<id>/<id>/<z>/<x>/<y>.png`.
//! The doubled layer segment is the publishing convention of the tile
//! pipeline, not something derived from the catalog.
//!
//! Any S3-compatible service works: AWS S3, MinIO, or Google Cloud Storage
//! through its interoperability endpoint (`https://storage.googleapis.com`)
//! with HMAC credentials.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client;
use tracing::{debug, warn};

use crate::error::IoError;
use crate::layer::LayerDescriptor;
use crate::tile::TileCoord;

use super::{StorageTier, TileFetch, TileStore};

/// Object key of a tile inside the bucket.
pub fn object_key(layer_id: &str, coord: TileCoord) -> String {
    format!(
        "{}/{}/{}/{}/{}.png",
        layer_id, layer_id, coord.z, coord.x, coord.y
    )
}

/// Whether the service named the object itself as missing.
///
/// Other 404 codes, such as `NoSuchBucket`, are backend failures.
fn is_missing_key<E: ProvideErrorMetadata>(err: &SdkError<E, HttpResponse>) -> bool {
    matches!(err.code(), Some("NoSuchKey") | Some("NotFound"))
}

/// HEAD responses carry no error body, so a bare 404 also counts as missing.
fn is_missing_on_head<E: ProvideErrorMetadata>(err: &SdkError<E, HttpResponse>) -> bool {
    is_missing_key(err)
        || err
            .raw_response()
            .map(|r| r.status().as_u16() == 404)
            .unwrap_or(false)
}

/// S3-backed implementation of [`TileStore`].
#[derive(Clone)]
pub struct S3TileStore {
    client: Client,
    bucket: String,
}

impl S3TileStore {
    /// Create a store reading from `bucket`.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Check whether an object exists.
    ///
    /// Returns `Ok(false)` only for a definite not-found; credential and
    /// transport failures are errors.
    pub async fn object_exists(&self, key: &str) -> Result<bool, IoError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_missing_on_head(&e) => Ok(false),
            Err(e) => Err(IoError::ObjectStore(
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }
}

#[async_trait]
impl TileStore for S3TileStore {
    fn tier(&self) -> StorageTier {
        StorageTier::Remote
    }

    async fn fetch(
        &self,
        layer: &LayerDescriptor,
        coord: TileCoord,
    ) -> Result<TileFetch, IoError> {
        let key = object_key(&layer.id, coord);

        if !self.object_exists(&key).await? {
            debug!(bucket = %self.bucket, key = %key, "Remote tile not found");
            return Ok(TileFetch::Absent { path: None });
        }

        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(resp) => resp,
            // Deleted between HEAD and GET
            Err(e) if is_missing_key(&e) => return Ok(TileFetch::Absent { path: None }),
            Err(e) => {
                let message = DisplayErrorContext(&e).to_string();
                warn!(bucket = %self.bucket, key = %key, error = %message, "GetObject failed");
                return Err(IoError::ObjectStore(message));
            }
        };

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?
            .into_bytes();

        Ok(TileFetch::Found(data))
    }
}

/// Create an S3 client.
///
/// * `endpoint_url` - custom endpoint for S3-compatible services (GCS
///   interop, MinIO); enables path-style addressing
/// * `region` - signing region
/// * `credentials_file` - optional shared-credentials file to read keys from,
///   in addition to the default credential chain
pub async fn create_s3_client(
    endpoint_url: Option<&str>,
    region: &str,
    credentials_file: Option<&Path>,
) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    if let Some(path) = credentials_file {
        use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};

        let files = EnvConfigFiles::builder()
            .include_default_config_file(true)
            .with_file(EnvConfigFileKind::Credentials, path)
            .build();
        config_loader = config_loader.profile_files(files);
    }

    let sdk_config = config_loader.load().await;

    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
