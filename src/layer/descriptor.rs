use serde::{Deserialize, Serialize};

/// Geographic bounding box of a layer, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Create a new extent from min/max longitude and latitude.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Whether the minimums are strictly below the maximums on both axes.
    pub fn is_ordered(&self) -> bool {
        self.xmin < self.xmax && self.ymin < self.ymax
    }
}

/// One legend class: a swatch color, its label and the value it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
    pub value: String,
}

impl LegendEntry {
    pub fn new(
        color: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            color: color.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Descriptor of one tile layer.
///
/// Descriptors are built once when the catalog is loaded and are read-only
/// afterwards. The `id` is the only key used to derive storage locations:
/// the remote object key is `<id>/<id>/<z>/<x>/<y>.png`, while the local
/// directory comes from the explicit `local_path` mapping.
///
/// The JSON form uses camelCase keys and accepts both the `tilePath` /
/// `localPath` names and their `tileUrlTemplate` / `localPathTemplate`
/// aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    /// Stable slug, unique across the catalog
    pub id: String,

    /// English display name
    pub name: String,

    /// Arabic display name
    #[serde(default)]
    pub name_ar: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub description_ar: String,

    /// Client tile URL with `{z}`, `{x}`, `{y}` placeholders
    #[serde(rename = "tilePath", alias = "tileUrlTemplate")]
    pub tile_url_template: String,

    /// Directory segments of this layer below the local tiles root
    #[serde(rename = "localPath", alias = "localPathTemplate")]
    pub local_path: String,

    pub min_zoom: u8,
    pub max_zoom: u8,

    /// Default opacity in `[0, 1]`
    pub opacity: f64,

    /// Whether the layer is shown when first added to a map
    #[serde(default)]
    pub visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legend: Vec<LegendEntry>,
}
