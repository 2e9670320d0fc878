//! Layer registry: the canonical, read-only catalog of tile layers.
//!
//! The registry is built once at startup, either from the built-in catalog or
//! from an external JSON metadata document, and then shared behind an `Arc`.
//! There is no runtime registration API.
//!
//! # Example
//!
//! ```
//! use atlas_tiles::layer::LayerRegistry;
//!
//! let registry = LayerRegistry::builtin("http://localhost:3333");
//! let layer = registry.resolve("annual_water_stress").unwrap();
//! assert_eq!(layer.local_path, "Water Stress/Water Stress");
//!
//! let err = registry.resolve("nonexistent_layer").unwrap_err();
//! assert_eq!(err.available.len(), 3);
//! ```

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{CatalogError, UnknownLayer};

use super::descriptor::{Extent, LayerDescriptor, LegendEntry};

// =============================================================================
// Built-in Catalog
// =============================================================================

/// Bounding box shared by the built-in layers (Saudi Arabia).
const DEFAULT_EXTENT: Extent = Extent {
    xmin: 34.5,
    ymin: 16.0,
    xmax: 55.5,
    ymax: 32.5,
};

/// Default opacity for the built-in layers.
const DEFAULT_OPACITY: f64 = 0.7;

/// Highest zoom the built-in layers are published at.
const DEFAULT_MAX_ZOOM: u8 = 18;

struct BuiltinLayer {
    id: &'static str,
    name: &'static str,
    name_ar: &'static str,
    description: &'static str,
    description_ar: &'static str,
    local_path: &'static str,
}

const BUILTIN_LAYERS: &[BuiltinLayer] = &[
    BuiltinLayer {
        id: "annual_water_stress",
        name: "Annual Water Stress",
        name_ar: "الإجهاد المائي السنوي",
        description: "Annual water stress levels across Saudi Arabia",
        description_ar: "مستويات الإجهاد المائي السنوي في المملكة العربية السعودية",
        local_path: "Water Stress/Water Stress",
    },
    BuiltinLayer {
        id: "riverine_flood_risk",
        name: "Riverine Flood Risk",
        name_ar: "مخاطر الفيضانات النهرية",
        description: "Riverine flood risk assessment across Saudi Arabia",
        description_ar: "تقييم مخاطر الفيضانات النهرية في المملكة العربية السعودية",
        local_path: "Riverine flood risk/Riverine flood risk",
    },
    BuiltinLayer {
        id: "coastal_flood_risk",
        name: "Coastal Flood Risk",
        name_ar: "مخاطر الفيضانات الساحلية",
        description: "Coastal flood risk assessment across Saudi Arabia",
        description_ar: "تقييم مخاطر الفيضانات الساحلية في المملكة العربية السعودية",
        local_path: "Coastal flood risk/Coastal flood risk",
    },
];

fn risk_legend() -> Vec<LegendEntry> {
    vec![
        LegendEntry::new("#d73027", "High", "high"),
        LegendEntry::new("#fc8d59", "Medium", "medium"),
        LegendEntry::new("#fee08b", "Low", "low"),
    ]
}

// =============================================================================
// LayerRegistry
// =============================================================================

/// Ordered catalog of layer descriptors, keyed by layer id.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    layers: Vec<LayerDescriptor>,
}

impl LayerRegistry {
    /// The three built-in risk layers.
    ///
    /// `tile_server_url` is the public base URL of the tile server and is
    /// used to build each layer's client tile URL template.
    pub fn builtin(tile_server_url: &str) -> Self {
        let base = tile_server_url.trim_end_matches('/');
        let layers = BUILTIN_LAYERS
            .iter()
            .map(|b| LayerDescriptor {
                id: b.id.to_string(),
                name: b.name.to_string(),
                name_ar: b.name_ar.to_string(),
                description: b.description.to_string(),
                description_ar: b.description_ar.to_string(),
                tile_url_template: format!("{}/tiles/{}/{{z}}/{{x}}/{{y}}.png", base, b.id),
                local_path: b.local_path.to_string(),
                min_zoom: 0,
                max_zoom: DEFAULT_MAX_ZOOM,
                opacity: DEFAULT_OPACITY,
                visible: false,
                attribution: None,
                extent: Some(DEFAULT_EXTENT),
                legend: risk_legend(),
            })
            .collect();

        Self { layers }
    }

    /// Build a registry from explicit descriptors.
    ///
    /// Rejects empty and duplicate ids, since ids are the storage keys.
    pub fn from_layers(layers: Vec<LayerDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(layers.len());
        for (index, layer) in layers.iter().enumerate() {
            if layer.id.trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(CatalogError::DuplicateId(layer.id.clone()));
            }
        }

        Ok(Self { layers })
    }

    /// Parse a JSON array of descriptors.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let layers: Vec<LayerDescriptor> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_layers(layers)
    }

    /// Load the catalog from an external metadata document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let registry = Self::from_json_str(&json)?;
        debug!(
            path = %path.display(),
            layers = registry.len(),
            "Loaded layer catalog"
        );
        Ok(registry)
    }

    /// Load from `layers_file` when given, otherwise use the built-in catalog.
    ///
    /// A metadata file that cannot be read or parsed is an error; it never
    /// silently falls back to the built-in layers.
    pub fn load(layers_file: Option<&Path>, tile_server_url: &str) -> Result<Self, CatalogError> {
        match layers_file {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin(tile_server_url)),
        }
    }

    /// Look up a layer by id.
    ///
    /// This is the only place "unknown layer" errors originate; the error
    /// lists every registered id.
    pub fn resolve(&self, id: &str) -> Result<&LayerDescriptor, UnknownLayer> {
        self.layers
            .iter()
            .find(|layer| layer.id == id)
            .ok_or_else(|| UnknownLayer {
                layer: id.to_string(),
                available: self.ids(),
            })
    }

    /// All descriptors in catalog order.
    pub fn list(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// All layer ids in catalog order.
    pub fn ids(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
