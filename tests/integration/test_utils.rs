//! Test utilities for integration tests.
//!
//! This module provides a mock remote tile store that counts requests and
//! helpers for building local tile trees and driving the router.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use atlas_tiles::error::IoError;
use atlas_tiles::layer::{LayerDescriptor, LayerRegistry};
use atlas_tiles::server::{create_router, RouterConfig};
use atlas_tiles::store::{LocalTileStore, StorageTier, TileFetch, TileStore};
use atlas_tiles::tile::{TileCoord, TileService};

/// Base URL used for built-in tile URL templates in tests.
pub const TEST_BASE_URL: &str = "http://localhost:3333";

/// Bucket name reported by test routers.
pub const TEST_BUCKET: &str = "risk-tiles";

/// A minimal byte sequence starting with the PNG signature.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

// =============================================================================
// Mock Remote Store
// =============================================================================

/// A remote store serving pre-configured tiles and counting fetches.
pub struct MockRemoteStore {
    tiles: HashMap<(String, TileCoord), Bytes>,
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
            failure: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_tile(mut self, layer: &str, coord: TileCoord, data: &[u8]) -> Self {
        self.tiles
            .insert((layer.to_string(), coord), Bytes::copy_from_slice(data));
        self
    }

    /// Make every fetch fail as if the bucket were unreachable.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Shared call counter; stays valid after the store is moved into a service.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TileStore for MockRemoteStore {
    fn tier(&self) -> StorageTier {
        StorageTier::Remote
    }

    async fn fetch(&self, layer: &LayerDescriptor, coord: TileCoord) -> Result<TileFetch, IoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref message) = self.failure {
            return Err(IoError::ObjectStore(message.clone()));
        }

        match self.tiles.get(&(layer.id.clone(), coord)) {
            Some(data) => Ok(TileFetch::Found(data.clone())),
            None => Ok(TileFetch::Absent { path: None }),
        }
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

// =============================================================================
// Local Tile Trees
// =============================================================================

/// Write a tile at `<root>/<local_path>/<z>/<x>/<y>.png`.
pub fn write_tile(root: &Path, local_path: &str, z: u32, x: u32, y: u32, data: &[u8]) {
    let dir = root
        .join(local_path)
        .join(z.to_string())
        .join(x.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.png", y)), data).unwrap();
}

/// Local directory of a built-in layer.
pub fn builtin_local_path(layer_id: &str) -> String {
    LayerRegistry::builtin(TEST_BASE_URL)
        .resolve(layer_id)
        .unwrap()
        .local_path
        .clone()
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Tile service over the built-in catalog.
pub fn test_service(root: &Path, remote: MockRemoteStore) -> TileService<MockRemoteStore> {
    TileService::new(
        LayerRegistry::builtin(TEST_BASE_URL),
        LocalTileStore::new(root),
        remote,
    )
}

/// Router over the built-in catalog with tracing disabled.
pub fn test_router(root: &Path, remote: MockRemoteStore) -> Router {
    router_for(test_service(root, remote))
}

pub fn router_for(service: TileService<MockRemoteStore>) -> Router {
    create_router(
        service,
        RouterConfig::new()
            .with_tracing(false)
            .with_storage_info(TEST_BUCKET, Some("atlas-test".to_string())),
    )
}

/// Response parts collected for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(router: Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri).await
}
