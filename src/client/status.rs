//! Tile server status checks.
//!
//! Used by operators and by map applications at startup to confirm the tile
//! server is reachable and that each catalog layer serves its coarsest tiles.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ClientError;
use crate::layer::LayerDescriptor;

use super::discovery::{sample_coords, HttpTileProbe, TileProbe};

/// Zoom levels tested per layer by [`TileServerClient::check_layers`].
const CHECKED_ZOOMS: [u32; 2] = [0, 1];

/// Health document returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,

    #[serde(default)]
    pub low_zoom_threshold: Option<u32>,
}

/// Result of checking one layer against the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCheck {
    pub layer: String,

    /// First tile URL that answered, if any
    pub found: Option<String>,

    /// Number of tile URLs requested
    pub tested: usize,
}

/// Client for a running tile server.
#[derive(Debug, Clone)]
pub struct TileServerClient {
    base_url: String,
    probe: HttpTileProbe,
}

impl TileServerClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3333`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::with_probe(base_url, HttpTileProbe::new()?))
    }

    /// Create a client reusing an existing probe.
    pub fn with_probe(base_url: impl Into<String>, probe: HttpTileProbe) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, probe }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a tile served by this server.
    pub fn tile_url(&self, layer_id: &str, z: u32, x: u32, y: u32) -> String {
        format!("{}/tiles/{}/{}/{}/{}.png", self.base_url, layer_id, z, x, y)
    }

    /// Fetch `GET /health`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, a non-success status, or an unexpected body.
    pub async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);

        let resp = self
            .probe
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ClientError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let health: HealthStatus = resp.json().await.map_err(|e| ClientError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

        debug!(url = %url, status = %health.status, "Tile server health");
        Ok(health)
    }

    /// Request the sample tiles of zooms 0 and 1 for each given layer.
    ///
    /// Each layer stops at its first tile that answers.
    pub async fn check_layers<'a, I>(&self, layers: I) -> Vec<LayerCheck>
    where
        I: IntoIterator<Item = &'a LayerDescriptor>,
    {
        let mut checks = Vec::new();

        for layer in layers {
            let mut check = LayerCheck {
                layer: layer.id.clone(),
                found: None,
                tested: 0,
            };

            'zooms: for z in CHECKED_ZOOMS {
                for (x, y) in sample_coords(z) {
                    let url = self.tile_url(&layer.id, z, x, y);
                    check.tested += 1;
                    if self.probe.tile_exists(&url).await {
                        check.found = Some(url);
                        break 'zooms;
                    }
                }
            }

            info!(
                layer = %check.layer,
                found = check.found.is_some(),
                tested = check.tested,
                "Layer check"
            );
            checks.push(check);
        }

        checks
    }
}
