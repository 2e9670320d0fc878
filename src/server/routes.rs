//! Router configuration for the tile server.
//!
//! # Route Structure
//!
//! ```text
//! /health                               - Liveness probe
//! /tiles/{layer}/{z}/{x}/{y}.png        - Tile endpoint
//! /layers                               - Layers present on local storage
//! /layers/{layer}/info                  - Local zoom levels of one layer
//! ```
//!
//! Any other path under `/tiles/` is answered with a 400 describing the
//! expected pattern.
//!
//! # Example
//!
//! ```ignore
//! use atlas_tiles::server::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://atlas.example.org".to_string()])
//!     .with_storage_info("risk-tiles", None);
//!
//! let router = create_router(tile_service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3333").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    fallback_handler, health_handler, layer_info_handler, layers_handler, tile_handler, AppState,
    StorageInfo,
};
use crate::store::TileStore;
use crate::tile::TileService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Storage details shown by `/layers` and `/health`
    pub storage: StorageInfo,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
            storage: StorageInfo::default(),
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Set the bucket and project reported to clients.
    pub fn with_storage_info(
        mut self,
        bucket: impl Into<String>,
        project_id: Option<String>,
    ) -> Self {
        self.storage = StorageInfo {
            bucket: bucket.into(),
            project_id,
        };
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `tile_service` - The tile service for handling tile requests
/// * `config` - Router configuration
///
/// # Returns
///
/// A configured Axum router ready to be served.
pub fn create_router<R>(tile_service: TileService<R>, config: RouterConfig) -> Router
where
    R: TileStore + 'static,
{
    let app_state = AppState::new(tile_service)
        .with_cache_max_age(config.cache_max_age)
        .with_allow_any_origin(config.cors_origins.is_none())
        .with_storage_info(config.storage.clone());

    let cors = build_cors_layer(&config);

    // {filename} captures "{y}.png" so a bad suffix can be reported as 400
    let router = Router::new()
        .route("/health", get(health_handler::<R>))
        .route("/tiles/{layer}/{z}/{x}/{filename}", get(tile_handler::<R>))
        .route("/layers", get(layers_handler::<R>))
        .route("/layers/{layer}/info", get(layer_info_handler::<R>))
        .fallback(fallback_handler)
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        // No origins allowed; cross-origin requests get no CORS headers
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
