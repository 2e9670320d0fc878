//! Coverage discovery by sampling.
//!
//! Enumerating every tile of a layer is far too expensive for a client, so
//! coverage is estimated: at each zoom a handful of fixed coordinates is
//! tested and the zoom counts as available as soon as one of them exists.
//!
//! This is a heuristic. A zoom whose only tiles lie away from the sampled
//! corners and center is reported as unavailable, so "absent" from a probe
//! never proves the tiles are missing.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::layer::LayerDescriptor;
use crate::tile::TileCoord;

use super::url::build_tile_url;

/// Default per-request timeout for probe requests.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Outcome of probing one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Whether any sampled tile exists
    pub exists: bool,

    /// Ascending zoom levels with at least one confirmed tile
    pub available_zooms: Vec<u32>,

    /// URL of the first confirmed tile of each available zoom
    pub sample_tiles: Vec<String>,
}

/// Coordinates sampled at zoom `z`: the corners `(0,0)`, `(1,0)`, `(0,1)`
/// and the center tile `(2^z/2, 2^z/2)`.
///
/// Samples outside the `2^z × 2^z` grid and repeats are skipped, so zoom 0
/// yields only `(0,0)`.
pub fn sample_coords(z: u32) -> Vec<(u32, u32)> {
    let center = 1u64
        .checked_shl(z)
        .map(|size| size / 2)
        .and_then(|c| u32::try_from(c).ok());

    let mut candidates = vec![(0, 0), (1, 0), (0, 1)];
    if let Some(c) = center {
        candidates.push((c, c));
    }

    let mut samples = Vec::with_capacity(candidates.len());
    for (x, y) in candidates {
        if TileCoord::new(z, x, y).is_within_grid() && !samples.contains(&(x, y)) {
            samples.push((x, y));
        }
    }
    samples
}

/// Existence check for a tile URL.
///
/// Implementations never fail: a transport error counts as "not found" for
/// that sample so one flaky request cannot abort a whole probe.
#[async_trait]
pub trait TileProbe: Send + Sync {
    async fn tile_exists(&self, url: &str) -> bool;
}

/// [`TileProbe`] issuing HTTP `HEAD` requests.
#[derive(Clone)]
pub struct HttpTileProbe {
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTileProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTileProbe").finish()
    }
}

impl HttpTileProbe {
    /// Create a probe with the default timeout.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    /// Create a probe with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("atlas-tiles/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { client })
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl TileProbe for HttpTileProbe {
    async fn tile_exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!(url = url, status = resp.status().as_u16(), "Tile not available");
                false
            }
            Err(e) => {
                warn!(url = url, error = %e, "Tile probe request failed");
                false
            }
        }
    }
}

/// Estimate which zoom levels of `layer` have tiles.
///
/// Zooms `min_zoom..=max_zoom` are visited in order and their samples tested
/// one at a time; the first hit records the zoom and moves on. A layer whose
/// `min_zoom` exceeds its `max_zoom` is reported as having no coverage.
pub async fn probe_coverage<P>(layer: &LayerDescriptor, probe: &P) -> ProbeResult
where
    P: TileProbe + ?Sized,
{
    let mut result = ProbeResult::default();

    for z in u32::from(layer.min_zoom)..=u32::from(layer.max_zoom) {
        for (x, y) in sample_coords(z) {
            let url = build_tile_url(&layer.tile_url_template, z, x, y);
            if probe.tile_exists(&url).await {
                result.available_zooms.push(z);
                result.sample_tiles.push(url);
                break;
            }
        }
    }

    result.exists = !result.available_zooms.is_empty();
    debug!(
        layer = %layer.id,
        zooms = ?result.available_zooms,
        "Probed layer coverage"
    );
    result
}
