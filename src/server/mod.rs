//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /tiles/{layer}/{z}/{x}/{y}.png   /layers   /health        │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │           routes            │  │
//! │  │ (requests, error bodies) │  │   (router config, CORS)     │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    fallback_handler, health_handler, layer_info_handler, layers_handler, tile_handler, AppState,
    ErrorResponse, HealthResponse, LayerInfoResponse, LayerSummary, LayersResponse, StorageInfo,
    TilePathParams, EXPECTED_TILE_PATH,
};
pub use routes::{create_router, RouterConfig};
