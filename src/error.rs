use thiserror::Error;

use crate::store::StorageTier;

/// I/O errors raised by a storage tier.
///
/// These always mean the backend itself misbehaved. A tile that is simply not
/// there is reported as [`TileFetch::Absent`](crate::store::TileFetch), never
/// as an `IoError`.
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible object storage (GCS interop, MinIO)
    #[error("Object storage error: {0}")]
    ObjectStore(String),

    /// Network error while streaming an object body
    #[error("Connection error: {0}")]
    Connection(String),

    /// Filesystem error other than "file does not exist"
    #[error("Filesystem error at {path}: {message}")]
    Filesystem { path: String, message: String },
}

/// A layer id that is not in the registry.
///
/// Carries every registered id so clients can self-correct.
#[derive(Debug, Clone, Error)]
#[error("Unknown layer: {layer}")]
pub struct UnknownLayer {
    pub layer: String,
    pub available: Vec<String>,
}

/// Errors produced while serving a tile request.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Layer id is not in the registry (should map to HTTP 404)
    #[error(transparent)]
    UnknownLayer(#[from] UnknownLayer),

    /// The coordinate resolved to a storage location holding no tile (HTTP 404)
    #[error("Tile not found in {tier} storage: {layer}/{z}/{x}/{y}")]
    TileAbsent {
        layer: String,
        z: u32,
        x: u32,
        y: u32,
        tier: StorageTier,
        /// Attempted filesystem path, only set for local misses
        path: Option<String>,
    },

    /// Request path does not match `/tiles/{layer}/{z}/{x}/{y}.png` (HTTP 400)
    #[error("Malformed tile request: {received}")]
    MalformedRequest { received: String },

    /// Storage tier unreachable or refused the request (HTTP 500)
    #[error("Storage backend unavailable: {0}")]
    Backend(#[from] IoError),
}

/// Errors from the per-layer introspection endpoint.
#[derive(Debug, Clone, Error)]
pub enum LayerInfoError {
    #[error(transparent)]
    UnknownLayer(#[from] UnknownLayer),

    /// Layer is registered but its local directory is missing
    #[error("Layer directory not found: {expected_path}")]
    DirectoryMissing { expected_path: String },

    #[error("Could not read layer information: {0}")]
    Scan(IoError),
}

/// Errors raised while building the layer catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Metadata document could not be read
    #[error("Could not read layer metadata from {path}: {message}")]
    Read { path: String, message: String },

    /// Metadata document is not a JSON array of layer descriptors
    #[error("Invalid layer metadata: {0}")]
    Parse(String),

    #[error("Layer at position {index} has an empty id")]
    EmptyId { index: usize },

    /// Two descriptors share an id; ids drive storage paths and must be unique
    #[error("Duplicate layer id: {0}")]
    DuplicateId(String),

    /// A descriptor failed structural validation
    #[error("Layer {id} failed validation: {}", .errors.join("; "))]
    InvalidLayer { id: String, errors: Vec<String> },
}

/// Errors from the tile-server client.
///
/// Probing treats these as "tile not found"; only the health and layer
/// checks report them.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Build(String),

    /// Transport failure or timeout
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body is not the expected JSON document
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },
}
