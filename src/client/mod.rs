//! Client-side tile discovery and validation.
//!
//! These run in the consuming map application, not in the server:
//!
//! ```text
//! select layer ──▶ validate ──▶ probe_coverage ──▶ request tiles by URL
//!                  (pure)       (HEAD sampling)
//! ```
//!
//! - [`url`]: tile URL templates and parsing
//! - [`discovery`]: sampling probe estimating which zooms have tiles
//! - [`validate`](mod@validate): structural checks gating which layers are offered
//! - [`status`]: health and per-layer checks against a running server

pub mod discovery;
pub mod status;
pub mod url;
pub mod validate;

pub use discovery::{
    probe_coverage, sample_coords, HttpTileProbe, ProbeResult, TileProbe,
    DEFAULT_PROBE_TIMEOUT_SECS,
};
pub use status::{HealthStatus, LayerCheck, TileServerClient};
pub use url::{build_tile_url, parse_tile_path, parse_tile_url, ParsedTile, TEMPLATE_TOKENS};
pub use validate::{
    offerable_layers, validate, validate_catalog, ValidationResult, MAX_LAYER_ZOOM,
};
