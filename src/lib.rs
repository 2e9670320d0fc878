//! # Atlas Tiles
//!
//! An XYZ raster tile server for risk map layers, plus the client-side logic
//! a mapping application uses to decide which layers and zoom levels to
//! request.
//!
//! Tiles below a fixed zoom threshold are read from a local directory tree;
//! tiles at or above it are downloaded from an S3-compatible bucket (AWS S3,
//! MinIO, or Google Cloud Storage through its interoperability endpoint).
//! Tiles are served exactly as stored: no generation, reprojection or
//! transcoding happens here.
//!
//! ## Architecture
//!
//! - [`layer`] - Layer descriptors and the read-only layer registry
//! - [`store`] - Local and remote tile stores behind the `TileStore` trait
//! - [`tile`] - Tile router choosing a store by zoom level
//! - [`server`] - Axum-based HTTP server and routes
//! - [`client`] - Tile URL templates, coverage probe and layer validation
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use atlas_tiles::{
//!     create_router, create_s3_client, LayerRegistry, LocalTileStore, RouterConfig,
//!     S3TileStore, TileService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let client = create_s3_client(Some("https://storage.googleapis.com"), "auto", None).await;
//!
//!     let service = TileService::new(
//!         LayerRegistry::builtin("http://localhost:3333"),
//!         LocalTileStore::new("./layers"),
//!         S3TileStore::new(client, "risk-tiles"),
//!     );
//!
//!     let router = create_router(service, RouterConfig::new().with_storage_info("risk-tiles", None));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3333").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod layer;
pub mod server;
pub mod store;
pub mod tile;

// Re-export commonly used types
pub use client::{
    build_tile_url, offerable_layers, parse_tile_path, parse_tile_url, probe_coverage, validate,
    HttpTileProbe, ProbeResult, TileProbe, TileServerClient, ValidationResult,
};
pub use config::{Cli, Command, ProbeConfig, ServeConfig, ValidateConfig};
pub use error::{CatalogError, ClientError, IoError, LayerInfoError, TileError, UnknownLayer};
pub use layer::{Extent, LayerDescriptor, LayerRegistry, LegendEntry};
pub use server::{create_router, AppState, RouterConfig};
pub use store::{
    create_s3_client, LocalTileStore, S3TileStore, StorageTier, TileFetch, TileStore,
};
pub use tile::{TileCoord, TileResponse, TileService};
