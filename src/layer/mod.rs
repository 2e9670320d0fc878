//! Layer catalog.
//!
//! Every other component refers to layers by id and reads the descriptor from
//! the [`LayerRegistry`]; nothing copies and mutates descriptors, so the tile
//! server and its clients always agree on what exists.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              LayerRegistry               │
//! │  builtin() | from_json_file() → resolve  │
//! └───────┬───────────────┬──────────────────┘
//!         │               │
//!         ▼               ▼
//!   TileService     client::validate / probe_coverage
//! ```

mod descriptor;
mod registry;

pub use descriptor::{Extent, LayerDescriptor, LegendEntry};
pub use registry::LayerRegistry;
