//! Structural validation of layer descriptors.
//!
//! A layer with validation errors is withheld from users; warnings are
//! informational. Validation is pure: it never touches the network or the
//! filesystem and never modifies the descriptor.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::layer::LayerDescriptor;

use super::url::TEMPLATE_TOKENS;

/// Highest zoom level a layer may declare.
pub const MAX_LAYER_ZOOM: u8 = 20;

/// Outcome of validating one descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a descriptor's required fields, numeric ranges and extent.
pub fn validate(layer: &LayerDescriptor) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if layer.id.trim().is_empty() {
        errors.push("Layer ID is required".to_string());
    }

    if layer.tile_url_template.trim().is_empty() {
        errors.push("Tile path is required".to_string());
    } else {
        for token in TEMPLATE_TOKENS {
            if !layer.tile_url_template.contains(token) {
                warnings.push(format!("Tile path is missing the {} placeholder", token));
            }
        }
    }

    if layer.local_path.trim().is_empty() {
        errors.push("Local path is required".to_string());
    }

    if layer.min_zoom > MAX_LAYER_ZOOM {
        warnings.push(format!(
            "Min zoom level should be between 0 and {}",
            MAX_LAYER_ZOOM
        ));
    }

    if layer.max_zoom < layer.min_zoom || layer.max_zoom > MAX_LAYER_ZOOM {
        errors.push(format!(
            "Max zoom level should not be below min zoom or exceed {}",
            MAX_LAYER_ZOOM
        ));
    }

    // Written so that NaN fails too
    if !(0.0..=1.0).contains(&layer.opacity) {
        errors.push("Opacity should be between 0 and 1".to_string());
    }

    if let Some(extent) = &layer.extent {
        if !extent.is_ordered() {
            errors.push("Invalid extent coordinates".to_string());
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Layers that may be offered to users: those without validation errors.
///
/// Withheld layers and warnings are logged; nothing here fails.
pub fn offerable_layers(layers: &[LayerDescriptor]) -> Vec<&LayerDescriptor> {
    layers
        .iter()
        .filter(|layer| {
            let result = validate(layer);
            for warning in &result.warnings {
                debug!(layer = %layer.id, "Layer validation warning: {}", warning);
            }
            if !result.valid {
                warn!(
                    layer = %layer.id,
                    errors = ?result.errors,
                    "Layer failed validation and will not be offered"
                );
            }
            result.valid
        })
        .collect()
}

/// Reject a catalog in which any layer has validation errors.
///
/// Used before serving a loaded catalog. Warnings are logged and do not fail.
pub fn validate_catalog(layers: &[LayerDescriptor]) -> Result<(), CatalogError> {
    for layer in layers {
        let result = validate(layer);
        for warning in &result.warnings {
            warn!(layer = %layer.id, "Layer validation warning: {}", warning);
        }
        if !result.valid {
            return Err(CatalogError::InvalidLayer {
                id: layer.id.clone(),
                errors: result.errors,
            });
        }
    }
    Ok(())
}
