//! Configuration management for the atlas tile server.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `ATLAS_` prefix
//! - Sensible defaults for all optional settings
//!
//! Configuration is read once at startup and fixed for the process lifetime.
//!
//! # Environment Variables
//!
//! - `ATLAS_HOST` - Server bind address (default: 0.0.0.0)
//! - `ATLAS_PORT` - Server port (default: 3333)
//! - `ATLAS_TILES_PATH` - Root of the local tile tree (default: ./layers)
//! - `ATLAS_LAYERS_FILE` - JSON layer catalog (default: built-in layers)
//! - `ATLAS_PUBLIC_URL` - Base URL written into built-in tile URL templates
//! - `ATLAS_BUCKET` - Bucket holding high-zoom tiles (required)
//! - `ATLAS_PROJECT_ID` - Cloud project owning the bucket
//! - `ATLAS_CREDENTIALS_FILE` - Shared-credentials file with the bucket keys
//! - `ATLAS_S3_ENDPOINT` - Custom S3 endpoint (GCS interop, MinIO)
//! - `ATLAS_S3_REGION` - Signing region (default: us-east-1)
//! - `ATLAS_LOW_ZOOM_THRESHOLD` - First zoom served from the bucket (default: 7)
//! - `ATLAS_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `ATLAS_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)
//! - `ATLAS_SERVER_URL` - Tile server queried by `probe` and `validate`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::{DEFAULT_PROBE_TIMEOUT_SECS, MAX_LAYER_ZOOM};
use crate::tile::DEFAULT_LOW_ZOOM_THRESHOLD;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3333;

/// Default root of the local tile tree.
pub const DEFAULT_TILES_PATH: &str = "./layers";

/// Default signing region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

/// Default tile server queried by the client commands.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3333";

/// Threshold at which every published zoom is served locally.
const MAX_LOW_ZOOM_THRESHOLD: u32 = MAX_LAYER_ZOOM as u32 + 1;

// =============================================================================
// CLI
// =============================================================================

/// Atlas tiles - XYZ tile server splitting zoom levels between local disk and
/// object storage.
#[derive(Parser, Debug, Clone)]
#[command(name = "atlas-tiles")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the tile server
    Serve(ServeConfig),

    /// Estimate which zoom levels of each layer have tiles
    Probe(ProbeConfig),

    /// Check the layer catalog for structural errors
    Validate(ValidateConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "ATLAS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "ATLAS_PORT")]
    pub port: u16,

    /// Public base URL of this server, used in built-in tile URL templates.
    ///
    /// Defaults to http://localhost:<port>.
    #[arg(long, env = "ATLAS_PUBLIC_URL")]
    pub public_url: Option<String>,

    // =========================================================================
    // Layer Configuration
    // =========================================================================
    /// Root directory of the local (low-zoom) tile tree.
    #[arg(long, default_value = DEFAULT_TILES_PATH, env = "ATLAS_TILES_PATH")]
    pub tiles_path: PathBuf,

    /// JSON array of layer descriptors replacing the built-in catalog.
    #[arg(long, env = "ATLAS_LAYERS_FILE")]
    pub layers_file: Option<PathBuf>,

    /// First zoom level served from object storage.
    #[arg(long, default_value_t = DEFAULT_LOW_ZOOM_THRESHOLD, env = "ATLAS_LOW_ZOOM_THRESHOLD")]
    pub low_zoom_threshold: u32,

    // =========================================================================
    // Object Storage Configuration
    // =========================================================================
    /// Bucket containing the high-zoom tiles.
    #[arg(long, env = "ATLAS_BUCKET")]
    pub bucket: String,

    /// Cloud project owning the bucket (reported by /health).
    #[arg(long, env = "ATLAS_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Shared-credentials file holding the bucket access keys.
    #[arg(long, env = "ATLAS_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Custom S3 endpoint URL for S3-compatible services.
    ///
    /// Use https://storage.googleapis.com for Google Cloud Storage.
    #[arg(long, env = "ATLAS_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Signing region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "ATLAS_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "ATLAS_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "ATLAS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("Bucket name is required. Set --bucket or ATLAS_BUCKET".to_string());
        }

        if self.tiles_path.as_os_str().is_empty() {
            return Err("tiles_path must not be empty".to_string());
        }

        if self.low_zoom_threshold > MAX_LOW_ZOOM_THRESHOLD {
            return Err(format!(
                "low_zoom_threshold must be between 0 and {}",
                MAX_LOW_ZOOM_THRESHOLD
            ));
        }

        if let Some(ref file) = self.credentials_file {
            if !file.is_file() {
                return Err(format!(
                    "Credentials file not found: {}",
                    file.display()
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL clients use to reach this server.
    pub fn public_base_url(&self) -> String {
        match self.public_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

// =============================================================================
// Probe
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ProbeConfig {
    /// Tile server base URL.
    #[arg(long, default_value = DEFAULT_SERVER_URL, env = "ATLAS_SERVER_URL")]
    pub server_url: String,

    /// Probe a single layer instead of the whole catalog.
    #[arg(long)]
    pub layer: Option<String>,

    /// JSON array of layer descriptors replacing the built-in catalog.
    #[arg(long, env = "ATLAS_LAYERS_FILE")]
    pub layers_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS, env = "ATLAS_PROBE_TIMEOUT")]
    pub timeout: u64,

    /// Only check server health and the zoom 0-1 tiles of each layer.
    #[arg(long, default_value_t = false)]
    pub status: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if url::Url::parse(&self.server_url).is_err() {
            return Err(format!("Invalid server URL: {}", self.server_url));
        }
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Validate
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ValidateConfig {
    /// JSON array of layer descriptors replacing the built-in catalog.
    #[arg(long, env = "ATLAS_LAYERS_FILE")]
    pub layers_file: Option<PathBuf>,

    /// Base URL written into built-in tile URL templates.
    #[arg(long, default_value = DEFAULT_SERVER_URL, env = "ATLAS_SERVER_URL")]
    pub server_url: String,

    /// Print warnings as well as errors.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
