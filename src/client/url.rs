//! Tile URL templates.
//!
//! Clients address tiles with a literal template such as
//! `http://localhost:3333/tiles/annual_water_stress/{z}/{x}/{y}.png`; the
//! `{z}`, `{x}` and `{y}` tokens are replaced by decimal integers.

use url::Url;

use crate::store::TILE_SUFFIX;
use crate::tile::TileCoord;

/// Placeholders substituted by [`build_tile_url`].
pub const TEMPLATE_TOKENS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// A tile address recovered from a URL or path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTile {
    /// Layer id, when the path has the `/tiles/<layer>/...` shape
    pub layer: Option<String>,
    pub coord: TileCoord,
}

/// Substitute a coordinate into a tile URL template.
///
/// Tokens missing from the template are simply not substituted.
pub fn build_tile_url(template: &str, z: u32, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

/// Recover the tile address from an absolute URL.
///
/// Returns `None` if `url` is not absolute or its path does not end with
/// `<z>/<x>/<y>.png`.
pub fn parse_tile_url(url: &str) -> Option<ParsedTile> {
    let url = Url::parse(url).ok()?;
    parse_tile_path(url.path())
}

/// Recover the tile address from a URL path.
///
/// Accepts `.../tiles/<layer>/<z>/<x>/<y>.png` (layer recovered) or any path
/// ending in `<z>/<x>/<y>.png` (layer unknown).
pub fn parse_tile_path(path: &str) -> Option<ParsedTile> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let n = segments.len();
    if n < 3 {
        return None;
    }

    let z = parse_decimal(segments[n - 3])?;
    let x = parse_decimal(segments[n - 2])?;
    let y = parse_decimal(segments[n - 1].strip_suffix(TILE_SUFFIX)?)?;

    let layer = if n >= 5 && segments[n - 5] == "tiles" {
        Some(segments[n - 4].to_string())
    } else {
        None
    };

    Some(ParsedTile {
        layer,
        coord: TileCoord::new(z, x, y),
    })
}

fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
