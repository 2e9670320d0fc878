//! Real service integration tests against MinIO.
//!
//! These tests exercise [`S3TileStore`] against a live S3-compatible service.
//!
//! # Requirements
//!
//! A MinIO server on localhost:9000 with the default credentials and a
//! `risk-tiles` bucket:
//!
//! ```bash
//! docker run -p 9000:9000 minio/minio server /data
//! ```
//!
//! # Running the tests
//!
//! ```bash
//! cargo test --test integration real_service -- --ignored
//! ```
//!
//! These tests are marked as `#[ignore]` by default because they require external
//! services to be running.

use std::time::Duration;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use atlas_tiles::error::IoError;
use atlas_tiles::layer::LayerRegistry;
use atlas_tiles::store::{object_key, S3TileStore, TileFetch, TileStore};
use atlas_tiles::tile::TileCoord;

use super::test_utils::PNG_BYTES;

/// Default URL for a local MinIO
const MINIO_ENDPOINT: &str = "http://localhost:9000";
const MINIO_BUCKET: &str = "risk-tiles";

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Check if the MinIO service is reachable
async fn is_minio_available() -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    client
        .get(format!("{}/minio/health/live", MINIO_ENDPOINT))
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

/// Create an S3 client configured for MinIO
fn create_minio_client(secret_key: &str) -> aws_sdk_s3::Client {
    let creds =
        aws_sdk_s3::config::Credentials::new(MINIO_ACCESS_KEY, secret_key, None, None, "test");

    let config = aws_sdk_s3::Config::builder()
        .behavior_version_latest()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .endpoint_url(MINIO_ENDPOINT)
        .credentials_provider(creds)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Upload a tile to MinIO
async fn upload_tile(client: &aws_sdk_s3::Client, key: &str, data: &[u8]) -> Result<(), String> {
    let _ = client.create_bucket().bucket(MINIO_BUCKET).send().await;

    client
        .put_object()
        .bucket(MINIO_BUCKET)
        .key(key)
        .content_type("image/png")
        .body(ByteStream::from(Bytes::copy_from_slice(data)))
        .send()
        .await
        .map_err(|e| format!("Failed to upload to MinIO: {}", e))?;

    Ok(())
}

/// Helper to skip test with a message
macro_rules! skip_if {
    ($cond:expr, $msg:expr) => {
        if $cond {
            eprintln!("SKIPPED: {}", $msg);
            return;
        }
    };
}

#[tokio::test]
#[ignore]
async fn test_s3_store_hit_and_miss() {
    skip_if!(!is_minio_available().await, "MinIO not available");

    let client = create_minio_client(MINIO_SECRET_KEY);
    let registry = LayerRegistry::builtin("http://localhost:3333");
    let layer = registry.resolve("annual_water_stress").unwrap();

    let present = TileCoord::new(10, 5, 5);
    upload_tile(&client, &object_key(&layer.id, present), PNG_BYTES)
        .await
        .unwrap();

    let store = S3TileStore::new(client, MINIO_BUCKET);

    let hit = store.fetch(layer, present).await.unwrap();
    assert_eq!(hit, TileFetch::Found(Bytes::from_static(PNG_BYTES)));

    let miss = store.fetch(layer, TileCoord::new(10, 6, 6)).await.unwrap();
    assert_eq!(miss, TileFetch::Absent { path: None });
}

#[tokio::test]
#[ignore]
async fn test_s3_store_bad_credentials_are_errors() {
    skip_if!(!is_minio_available().await, "MinIO not available");

    let store = S3TileStore::new(create_minio_client("wrong-secret"), MINIO_BUCKET);
    let registry = LayerRegistry::builtin("http://localhost:3333");
    let layer = registry.resolve("annual_water_stress").unwrap();

    let result = store.fetch(layer, TileCoord::new(10, 5, 5)).await;
    assert!(
        matches!(result, Err(IoError::ObjectStore(_))),
        "credential failure must not look like a missing tile: {:?}",
        result
    );
}
