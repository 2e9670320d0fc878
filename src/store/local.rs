//! Local hierarchical tile store.
//!
//! Tiles are laid out as `<root>/<local_path>/<z>/<x>/<y>.png`, where
//! `local_path` is the layer's explicit directory mapping from the catalog.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::IoError;
use crate::layer::LayerDescriptor;
use crate::tile::TileCoord;

use super::{StorageTier, TileFetch, TileStore};

/// File suffix of stored tiles.
pub const TILE_SUFFIX: &str = ".png";

/// Tile counts for one zoom directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomLevelInfo {
    pub zoom: u32,
    /// Number of x-column directories
    pub x_directories: usize,
    /// Number of `*.png` files across all x-columns
    pub total_tiles: usize,
}

/// Filesystem-backed tile store.
///
/// Every fetch touches the filesystem; nothing is cached.
#[derive(Debug, Clone)]
pub struct LocalTileStore {
    root: PathBuf,
}

impl LocalTileStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all zoom levels of `layer`.
    pub fn layer_dir(&self, layer: &LayerDescriptor) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in layer.local_path.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        dir
    }

    /// Whether the layer's directory exists on disk.
    pub async fn layer_exists(&self, layer: &LayerDescriptor) -> bool {
        tokio::fs::metadata(self.layer_dir(layer))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Path of a single tile file.
    pub fn tile_path(&self, layer: &LayerDescriptor, coord: TileCoord) -> PathBuf {
        self.layer_dir(layer)
            .join(coord.z.to_string())
            .join(coord.x.to_string())
            .join(format!("{}{}", coord.y, TILE_SUFFIX))
    }

    /// Count zoom levels and tiles of a layer by walking its directory tree.
    ///
    /// This is an administrative operation: it is O(tiles) and runs on the
    /// blocking thread pool. It is never used when serving tiles.
    pub async fn scan_zoom_levels(
        &self,
        layer: &LayerDescriptor,
    ) -> Result<Vec<ZoomLevelInfo>, IoError> {
        let dir = self.layer_dir(layer);
        let dir_display = dir.display().to_string();

        tokio::task::spawn_blocking(move || scan_layer_dir(&dir))
            .await
            .map_err(|e| IoError::Filesystem {
                path: dir_display,
                message: format!("scan task failed: {}", e),
            })?
    }
}

#[async_trait]
impl TileStore for LocalTileStore {
    fn tier(&self) -> StorageTier {
        StorageTier::Local
    }

    async fn fetch(
        &self,
        layer: &LayerDescriptor,
        coord: TileCoord,
    ) -> Result<TileFetch, IoError> {
        let path = self.tile_path(layer, coord);
        trace!(path = %path.display(), "Reading local tile");

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(TileFetch::Found(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Local tile not found");
                Ok(TileFetch::Absent { path: Some(path) })
            }
            Err(e) => Err(IoError::Filesystem {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// =============================================================================
// Directory Walk
// =============================================================================

fn fs_error(path: &Path, err: std::io::Error) -> IoError {
    IoError::Filesystem {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Subdirectories of `dir` as `(name, path)` pairs.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, IoError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| fs_error(dir, e))? {
        let entry = entry.map_err(|e| fs_error(dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| fs_error(&entry.path(), e))?
            .is_dir();
        if is_dir {
            dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    Ok(dirs)
}

fn count_tiles(dir: &Path) -> Result<usize, IoError> {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).map_err(|e| fs_error(dir, e))? {
        let entry = entry.map_err(|e| fs_error(dir, e))?;
        if entry.file_name().to_string_lossy().ends_with(TILE_SUFFIX) {
            count += 1;
        }
    }
    Ok(count)
}

fn scan_layer_dir(layer_dir: &Path) -> Result<Vec<ZoomLevelInfo>, IoError> {
    // Non-numeric directories are not zoom levels
    let mut zooms: Vec<(u32, PathBuf)> = subdirectories(layer_dir)?
        .into_iter()
        .filter_map(|(name, path)| name.parse::<u32>().ok().map(|z| (z, path)))
        .collect();
    zooms.sort_by_key(|(z, _)| *z);

    let mut levels = Vec::with_capacity(zooms.len());
    for (zoom, zoom_dir) in zooms {
        let columns = subdirectories(&zoom_dir)?;
        let mut total_tiles = 0;
        for (_, column) in &columns {
            total_tiles += count_tiles(column)?;
        }
        levels.push(ZoomLevelInfo {
            zoom,
            x_directories: columns.len(),
            total_tiles,
        });
    }

    Ok(levels)
}

// =============================================================================
// Tests
// =============================================================================
