use std::fmt;

use serde::Serialize;

/// Highest zoom level whose grid width (`2^z`) still fits in a `u32`.
const MAX_GRID_ZOOM: u32 = 31;

/// An XYZ tile address.
///
/// The grid at zoom `z` has `2^z × 2^z` cells, so a coordinate is only
/// meaningful when `x, y < 2^z`. The router does not reject out-of-grid
/// coordinates; storage lookups for them simply miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TileCoord {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along each axis at this zoom, if representable.
    pub fn grid_size(z: u32) -> Option<u32> {
        if z > MAX_GRID_ZOOM {
            None
        } else {
            Some(1u32 << z)
        }
    }

    /// Whether `x` and `y` fall inside the `2^z × 2^z` grid.
    pub fn is_within_grid(&self) -> bool {
        match Self::grid_size(self.z) {
            Some(size) => self.x < size && self.y < size,
            // Grid wider than u32: every u32 x/y is inside it
            None => true,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
