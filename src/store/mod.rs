//! Storage tiers for tile bytes.
//!
//! Tiles live in one of two tiers, chosen per request by zoom level:
//!
//! ```text
//!                 z < threshold            z ≥ threshold
//!          ┌──────────────────────┐  ┌──────────────────────────┐
//!          │    LocalTileStore    │  │       S3TileStore        │
//!          │ <root>/<local_path>/ │  │ <id>/<id>/<z>/<x>/<y>.png│
//!          │   <z>/<x>/<y>.png    │  │   in an object bucket    │
//!          └──────────────────────┘  └──────────────────────────┘
//! ```
//!
//! Both implement [`TileStore`]. A fetch either returns the bytes, reports the
//! tile as absent, or fails with an [`IoError`]; a backend failure is never
//! folded into "absent".

mod local;
mod remote;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::IoError;
use crate::layer::LayerDescriptor;
use crate::tile::TileCoord;

pub use local::{LocalTileStore, ZoomLevelInfo, TILE_SUFFIX};
pub use remote::{create_s3_client, object_key, S3TileStore};

// =============================================================================
// Storage Tier
// =============================================================================

/// The storage backend a tile request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Hierarchical directory tree next to the server
    Local,
    /// Object storage bucket
    Remote,
}

impl StorageTier {
    /// Pick the tier for zoom `z`: below the threshold is local, the rest remote.
    ///
    /// The threshold is shared by every layer.
    pub fn select(z: u32, threshold: u32) -> Self {
        if z < threshold {
            StorageTier::Local
        } else {
            StorageTier::Remote
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Local => "local",
            StorageTier::Remote => "remote",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TileStore Trait
// =============================================================================

/// Outcome of a successful storage lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileFetch {
    /// PNG bytes, returned unmodified
    Found(Bytes),

    /// Nothing stored at this coordinate.
    ///
    /// `path` is the attempted filesystem path for local misses.
    Absent { path: Option<PathBuf> },
}

impl TileFetch {
    pub fn is_found(&self) -> bool {
        matches!(self, TileFetch::Found(_))
    }
}

/// A tier that can fetch tiles by layer and coordinate.
///
/// Implementations hold no per-request state and are safe to call
/// concurrently.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Which tier this store represents.
    fn tier(&self) -> StorageTier;

    /// Fetch one tile.
    async fn fetch(&self, layer: &LayerDescriptor, coord: TileCoord)
        -> Result<TileFetch, IoError>;
}
