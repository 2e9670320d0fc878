//! HTTP request handlers for the tile API.
//!
//! # Endpoints
//!
//! - `GET /tiles/{layer}/{z}/{x}/{y}.png` - Serve a tile
//! - `GET /layers` - List layers present on local storage
//! - `GET /layers/{layer}/info` - Zoom levels and tile counts of a layer
//! - `GET /health` - Liveness probe

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{LayerInfoError, TileError};
use crate::store::{StorageTier, TileStore, ZoomLevelInfo, TILE_SUFFIX};
use crate::tile::{TileCoord, TileService};

/// Path pattern advertised in malformed-request errors.
pub const EXPECTED_TILE_PATH: &str = "/tiles/{layer}/{z}/{x}/{y}.png";

// =============================================================================
// Application State
// =============================================================================

/// Storage details reported by `/layers` and `/health`.
#[derive(Debug, Clone, Default)]
pub struct StorageInfo {
    /// Object storage bucket holding high-zoom tiles
    pub bucket: String,

    /// Cloud project owning the bucket
    pub project_id: Option<String>,
}

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<R: TileStore> {
    /// The tile service for processing tile requests
    pub tile_service: Arc<TileService<R>>,

    /// Cache-Control max-age in seconds for tile responses
    pub cache_max_age: u32,

    /// Whether tile responses carry `Access-Control-Allow-Origin: *`
    pub allow_any_origin: bool,

    /// Reported storage configuration
    pub storage: StorageInfo,
}

impl<R: TileStore> AppState<R> {
    /// Create a new application state with default settings.
    pub fn new(tile_service: TileService<R>) -> Self {
        Self {
            tile_service: Arc::new(tile_service),
            cache_max_age: 3600,
            allow_any_origin: true,
            storage: StorageInfo::default(),
        }
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    pub fn with_allow_any_origin(mut self, allow: bool) -> Self {
        self.allow_any_origin = allow;
        self
    }

    pub fn with_storage_info(mut self, storage: StorageInfo) -> Self {
        self.storage = storage;
        self
    }
}

impl<R: TileStore> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            tile_service: Arc::clone(&self.tile_service),
            cache_max_age: self.cache_max_age,
            allow_any_origin: self.allow_any_origin,
            storage: self.storage.clone(),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from: `/tiles/{layer}/{z}/{x}/{filename}` where filename is
/// `{y}.png`. Segments are kept as strings so the layer can be checked
/// before the numbers are parsed.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub layer: String,
    pub z: String,
    pub x: String,
    pub filename: String,
}

impl TilePathParams {
    /// Parse the coordinate, requiring decimal segments and a `.png` suffix.
    pub fn coord(&self) -> Option<TileCoord> {
        let y = self.filename.strip_suffix(TILE_SUFFIX)?;
        Some(TileCoord::new(
            parse_segment(&self.z)?,
            parse_segment(&self.x)?,
            parse_segment(y)?,
        ))
    }
}

/// Decimal digits only: rejects signs, whitespace and empty segments.
fn parse_segment(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// =============================================================================
// Response Types
// =============================================================================

/// Generic JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Body of a 404 for an unregistered layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownLayerResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,

    pub available_layers: Vec<String>,
}

/// Body of a 404 for a missing tile.
#[derive(Debug, Serialize)]
pub struct TileNotFoundResponse {
    pub error: String,
    pub layer: String,
    pub z: u32,
    pub x: u32,
    pub y: u32,

    /// Attempted path, local misses only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Body of a 400 for a path that is not a tile address.
#[derive(Debug, Serialize)]
pub struct MalformedRequestResponse {
    pub error: String,
    pub received: String,
    pub expected: String,
}

/// Body of a 404 for a layer without a local directory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDirectoryMissingResponse {
    pub error: String,
    pub expected_path: String,
}

/// One entry of the `/layers` listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    pub name_ar: String,
    /// Layer directory relative to the tiles root
    pub path: String,
    pub low_zoom_source: String,
    pub high_zoom_source: String,
}

/// Where each zoom band is stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfoResponse {
    pub low_zoom: String,
    pub high_zoom: String,
    pub bucket: String,
}

/// Response from the layers list endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayersResponse {
    pub layers: Vec<LayerSummary>,
    pub total: usize,
    pub low_zoom_threshold: u32,
    pub storage_info: StorageInfoResponse,
}

/// Response from the layer info endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfoResponse {
    pub layer: String,
    pub layer_path: String,
    pub available_zooms: Vec<u32>,
    /// `None` when the layer directory holds no zoom levels
    pub min_zoom: Option<u32>,
    pub max_zoom: Option<u32>,
    pub zoom_info: Vec<ZoomLevelInfo>,
}

impl LayerInfoResponse {
    /// Summarize a directory scan.
    pub fn from_scan(layer: String, layer_path: String, zoom_info: Vec<ZoomLevelInfo>) -> Self {
        let available_zooms: Vec<u32> = zoom_info.iter().map(|info| info.zoom).collect();
        Self {
            layer,
            layer_path,
            min_zoom: available_zooms.iter().min().copied(),
            max_zoom: available_zooms.iter().max().copied(),
            available_zooms,
            zoom_info,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving
    pub status: String,

    /// RFC 3339 UTC time of the check
    pub timestamp: String,

    pub version: String,
    pub tiles_path: String,
    pub bucket: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    pub low_zoom_threshold: u32,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Log a mapped error at a level matching its status.
///
/// - 5xx at ERROR
/// - 404 at DEBUG (common and expected)
/// - other 4xx at WARN
fn log_error_response(status: StatusCode, error_type: &str, message: &str) {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else if status.is_client_error() {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }
}

/// Convert TileError to HTTP response.
///
/// Backend failures are reported with a fixed message; the underlying error
/// is only logged, so storage credentials and endpoints never reach clients.
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match self {
            TileError::UnknownLayer(unknown) => {
                let status = StatusCode::NOT_FOUND;
                log_error_response(status, "unknown_layer", &message);
                let body = UnknownLayerResponse {
                    error: "Unknown layer".to_string(),
                    layer: Some(unknown.layer),
                    available_layers: unknown.available,
                };
                (status, Json(body)).into_response()
            }

            TileError::TileAbsent {
                layer,
                z,
                x,
                y,
                tier,
                path,
            } => {
                let status = StatusCode::NOT_FOUND;
                log_error_response(status, "tile_not_found", &message);
                let error = match tier {
                    StorageTier::Local => "Low-zoom tile not found in local storage",
                    StorageTier::Remote => "High-zoom tile not found in object storage",
                };
                let body = TileNotFoundResponse {
                    error: error.to_string(),
                    layer,
                    z,
                    x,
                    y,
                    path,
                };
                (status, Json(body)).into_response()
            }

            TileError::MalformedRequest { received } => {
                let status = StatusCode::BAD_REQUEST;
                log_error_response(status, "malformed_request", &message);
                let body = MalformedRequestResponse {
                    error: "Malformed tile request".to_string(),
                    received,
                    expected: EXPECTED_TILE_PATH.to_string(),
                };
                (status, Json(body)).into_response()
            }

            TileError::Backend(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                log_error_response(status, "storage_error", &message);
                let body = ErrorResponse::new("Failed to fetch tile from storage");
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Convert LayerInfoError to HTTP response.
impl IntoResponse for LayerInfoError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        match self {
            LayerInfoError::UnknownLayer(unknown) => {
                let status = StatusCode::NOT_FOUND;
                log_error_response(status, "unknown_layer", &message);
                let body = UnknownLayerResponse {
                    error: "Layer not found".to_string(),
                    layer: Some(unknown.layer),
                    available_layers: unknown.available,
                };
                (status, Json(body)).into_response()
            }

            LayerInfoError::DirectoryMissing { expected_path } => {
                let status = StatusCode::NOT_FOUND;
                log_error_response(status, "layer_directory_missing", &message);
                let body = LayerDirectoryMissingResponse {
                    error: "Layer directory not found".to_string(),
                    expected_path,
                };
                (status, Json(body)).into_response()
            }

            LayerInfoError::Scan(io_err) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                log_error_response(status, "scan_error", &message);
                let body = ErrorResponse::with_details(
                    "Could not read layer information",
                    io_err.to_string(),
                );
                (status, Json(body)).into_response()
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /tiles/{layer}/{z}/{x}/{y}.png` (HEAD is answered by the same route)
///
/// # Response
///
/// - `200 OK`: PNG bytes, unmodified
/// - `400 Bad Request`: non-numeric segment or missing `.png` suffix
/// - `404 Not Found`: unknown layer (lists known ids), or no tile at the
///   selected tier
/// - `500 Internal Server Error`: storage backend failure
///
/// # Headers
///
/// - `Content-Type: image/png`
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `Access-Control-Allow-Origin: *` (unless CORS origins are restricted)
/// - `X-Tile-Source: local|remote`
pub async fn tile_handler<R: TileStore>(
    State(state): State<AppState<R>>,
    Path(params): Path<TilePathParams>,
    uri: Uri,
) -> Result<Response, TileError> {
    // Unknown layers are reported before coordinates are looked at
    state.tile_service.registry().resolve(&params.layer)?;

    let coord = params.coord().ok_or_else(|| TileError::MalformedRequest {
        received: uri.path().to_string(),
    })?;

    let tile = state.tile_service.get_tile(&params.layer, coord).await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, tile.content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        )
        .header("X-Tile-Source", tile.tier.as_str());

    if state.allow_any_origin {
        builder = builder.header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    }

    builder
        .body(axum::body::Body::from(tile.data))
        .map_err(|e| {
            TileError::Backend(crate::error::IoError::Connection(format!(
                "failed to build response: {}",
                e
            )))
        })
}

/// Catch-all for paths no route matched.
///
/// Anything under `/tiles/` is a malformed tile request (400); everything
/// else is a plain 404.
pub async fn fallback_handler(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/tiles" || path.starts_with("/tiles/") {
        return TileError::MalformedRequest {
            received: path.to_string(),
        }
        .into_response();
    }

    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}

/// Handle layer list requests.
///
/// # Endpoint
///
/// `GET /layers`
///
/// Only layers whose local directory exists are listed; a registered layer
/// without a directory is omitted rather than reported as an error.
///
/// # Response
///
/// ```json
/// {
///   "layers": [{"id": "annual_water_stress", "name": "Annual Water Stress", ...}],
///   "total": 1,
///   "lowZoomThreshold": 7,
///   "storageInfo": {"lowZoom": "...", "highZoom": "...", "bucket": "..."}
/// }
/// ```
pub async fn layers_handler<R: TileStore>(State(state): State<AppState<R>>) -> Json<LayersResponse> {
    let service = &state.tile_service;
    let threshold = service.low_zoom_threshold();

    let mut layers = Vec::new();
    for layer in service.registry().list() {
        if service.local().layer_exists(layer).await {
            layers.push(LayerSummary {
                id: layer.id.clone(),
                name: layer.name.clone(),
                name_ar: layer.name_ar.clone(),
                path: layer.local_path.clone(),
                low_zoom_source: "Local directory".to_string(),
                high_zoom_source: "Object storage".to_string(),
            });
        } else {
            debug!(layer = %layer.id, "Layer directory missing, omitted from listing");
        }
    }

    let low_zoom = if threshold == 0 {
        "Local directory (unused)".to_string()
    } else {
        format!("Local directory (zoom 0-{})", threshold - 1)
    };

    Json(LayersResponse {
        total: layers.len(),
        layers,
        low_zoom_threshold: threshold,
        storage_info: StorageInfoResponse {
            low_zoom,
            high_zoom: format!("Object storage (zoom {}+)", threshold),
            bucket: state.storage.bucket.clone(),
        },
    })
}

/// Handle layer info requests.
///
/// # Endpoint
///
/// `GET /layers/{layer}/info`
///
/// Walks the layer's local directory tree; an administrative call that is
/// O(tiles) and never part of tile serving.
///
/// # Errors
///
/// - `404 Not Found`: unknown layer, or layer directory missing
/// - `500 Internal Server Error`: directory could not be read
pub async fn layer_info_handler<R: TileStore>(
    State(state): State<AppState<R>>,
    Path(layer_id): Path<String>,
) -> Result<Json<LayerInfoResponse>, LayerInfoError> {
    let service = &state.tile_service;
    let layer = service.registry().resolve(&layer_id)?;
    let layer_dir = service.local().layer_dir(layer);

    if !service.local().layer_exists(layer).await {
        return Err(LayerInfoError::DirectoryMissing {
            expected_path: layer_dir.display().to_string(),
        });
    }

    let zoom_info = service
        .local()
        .scan_zoom_levels(layer)
        .await
        .map_err(LayerInfoError::Scan)?;

    Ok(Json(LayerInfoResponse::from_scan(
        layer.id.clone(),
        layer_dir.display().to_string(),
        zoom_info,
    )))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// A process-alive signal only: neither storage tier is contacted.
pub async fn health_handler<R: TileStore>(State(state): State<AppState<R>>) -> Json<HealthResponse> {
    let service = &state.tile_service;
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tiles_path: service.local().root().display().to_string(),
        bucket: state.storage.bucket.clone(),
        project_id: state.storage.project_id.clone(),
        low_zoom_threshold: service.low_zoom_threshold(),
    })
}

// =============================================================================
// Tests
// =============================================================================
