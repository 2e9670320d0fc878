//! Tile routing layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileService                │
//! │  resolve layer → select tier → fetch    │
//! └──────────┬───────────────────┬──────────┘
//!            │ z < threshold     │ z ≥ threshold
//!            ▼                   ▼
//!   ┌────────────────┐   ┌────────────────┐
//!   │ LocalTileStore │   │  S3TileStore   │
//!   └────────────────┘   └────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileService`]: entry point; validates the layer, picks the tier and
//!   normalizes the outcome
//! - [`TileCoord`]: XYZ address of a tile
//! - [`TileResponse`]: bytes plus content type and serving tier

mod coord;
mod service;

pub use coord::TileCoord;
pub use service::{TileResponse, TileService, DEFAULT_LOW_ZOOM_THRESHOLD, TILE_CONTENT_TYPE};
