//! Tile Service: the request entry point of the tile router.
//!
//! Each request walks a small state machine:
//!
//! ```text
//! Received ──resolve layer──▶ LayerValidated ──compare z──▶ TierSelected
//!    │                                                          │
//!    └─▶ NotFound (UnknownLayer)        ┌────────────┬──────────┴─────┐
//!                                       ▼            ▼                ▼
//!                                    Served      NotFound          Errored
//!                                 (TileResponse) (TileAbsent)   (Backend)
//! ```
//!
//! Exactly one storage call is made per request. There is no retry, no
//! in-process cache and no shared mutable state, so requests are served
//! concurrently without coordination.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::error::TileError;
use crate::layer::LayerRegistry;
use crate::store::{LocalTileStore, StorageTier, TileFetch, TileStore};

use super::coord::TileCoord;

/// Content type of every served tile.
pub const TILE_CONTENT_TYPE: &str = "image/png";

/// Default zoom separating the local tier (below) from the remote tier.
pub const DEFAULT_LOW_ZOOM_THRESHOLD: u32 = 7;

// =============================================================================
// Tile Response
// =============================================================================

/// A served tile.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// PNG bytes exactly as stored
    pub data: Bytes,

    /// Always [`TILE_CONTENT_TYPE`]
    pub content_type: &'static str,

    /// Tier the bytes came from
    pub tier: StorageTier,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Routes tile requests to the local or remote tier by zoom level.
///
/// # Type Parameters
///
/// * `R` - The remote store (e.g. [`S3TileStore`](crate::store::S3TileStore))
///
/// # Example
///
/// ```ignore
/// use atlas_tiles::layer::LayerRegistry;
/// use atlas_tiles::store::{LocalTileStore, S3TileStore};
/// use atlas_tiles::tile::{TileCoord, TileService};
///
/// let service = TileService::new(
///     LayerRegistry::builtin("http://localhost:3333"),
///     LocalTileStore::new("./layers"),
///     S3TileStore::new(client, "risk-tiles"),
/// );
///
/// let tile = service.get_tile("annual_water_stress", TileCoord::new(3, 1, 1)).await?;
/// ```
pub struct TileService<R: TileStore> {
    registry: Arc<LayerRegistry>,
    local: LocalTileStore,
    remote: R,
    low_zoom_threshold: u32,
}

impl<R: TileStore> TileService<R> {
    /// Create a service with the default zoom threshold.
    pub fn new(registry: LayerRegistry, local: LocalTileStore, remote: R) -> Self {
        Self::with_shared_registry(Arc::new(registry), local, remote)
    }

    /// Create a service around an already shared registry.
    pub fn with_shared_registry(
        registry: Arc<LayerRegistry>,
        local: LocalTileStore,
        remote: R,
    ) -> Self {
        Self {
            registry,
            local,
            remote,
            low_zoom_threshold: DEFAULT_LOW_ZOOM_THRESHOLD,
        }
    }

    /// Set the zoom threshold; zooms below it are served locally.
    pub fn with_low_zoom_threshold(mut self, threshold: u32) -> Self {
        self.low_zoom_threshold = threshold;
        self
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<LayerRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn local(&self) -> &LocalTileStore {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn low_zoom_threshold(&self) -> u32 {
        self.low_zoom_threshold
    }

    /// Tier that serves zoom `z`.
    pub fn tier_for(&self, z: u32) -> StorageTier {
        StorageTier::select(z, self.low_zoom_threshold)
    }

    /// Serve one tile.
    ///
    /// # Errors
    ///
    /// - [`TileError::UnknownLayer`] if the layer is not registered
    /// - [`TileError::TileAbsent`] if the selected tier holds no tile there
    /// - [`TileError::Backend`] if the selected tier failed
    pub async fn get_tile(
        &self,
        layer_id: &str,
        coord: TileCoord,
    ) -> Result<TileResponse, TileError> {
        let layer = self.registry.resolve(layer_id)?;

        let tier = self.tier_for(coord.z);
        let store: &dyn TileStore = match tier {
            StorageTier::Local => &self.local,
            StorageTier::Remote => &self.remote,
        };

        debug!(layer = %layer.id, tile = %coord, tier = %tier, "Fetching tile");

        match store.fetch(layer, coord).await? {
            TileFetch::Found(data) => Ok(TileResponse {
                data,
                content_type: TILE_CONTENT_TYPE,
                tier,
            }),
            TileFetch::Absent { path } => Err(TileError::TileAbsent {
                layer: layer.id.clone(),
                z: coord.z,
                x: coord.x,
                y: coord.y,
                tier,
                path: path.map(|p| p.display().to_string()),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
