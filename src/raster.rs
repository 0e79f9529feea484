// SPDX-License-Identifier: MIT

use std::fmt;

use crate::BBox;

/// Fixed parameters of the tiled map: the root bounding box covered by the
/// tile pyramid, the pixel size of a single square tile and the deepest
/// available zoom level. Supplied by the caller; at depth `d` the root box is
/// subdivided into `2^d × 2^d` tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    pub root: BBox,
    pub tile_size: u32,
    pub max_depth: u8,
}

/// Identifies a single map tile: zoom depth plus column (`x`, growing east)
/// and row (`y`, growing south) within the `2^depth × 2^depth` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub depth: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    /// The image file name this tile resolves to.
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}_x{}_y{}.png", self.depth, self.x, self.y)
    }
}

/// The result of a tile-selection query: a row-major grid of [Tiles](Tile),
/// all at the same depth, together with the exact geographic bounds of the
/// area the grid covers.
///
/// `bounds` is recomputed from the tile indices, so it is always aligned to
/// the tile grid and contains the query box that produced it (clipped to the
/// root box).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderGrid {
    pub tiles: Vec<Vec<Tile>>,
    pub bounds: BBox,
    pub depth: u8,
}

impl RenderGrid {
    /// Number of tile rows in the grid.
    pub fn rows(&self) -> usize {
        self.tiles.len()
    }

    /// Number of tile columns in the grid.
    pub fn cols(&self) -> usize {
        self.tiles.first().map(Vec::len).unwrap_or_default()
    }
}

/// Error conditions which may occur during [select_tiles].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    /// The query box is degenerate (flipped or empty along an axis),
    /// or lies entirely outside the root bounding box.
    #[error("degenerate or out-of-range query box")]
    InvalidQuery,
}

/// Selects the grid of tiles covering `query` at the coarsest depth whose
/// resolution still meets the viewport's, i.e. whose longitudinal distance
/// per pixel does not exceed the query's `query.width() / width`.
///
/// A query box partially outside the root box is clipped to it; a box with
/// no positive-area overlap fails with [RasterError::InvalidQuery]. The
/// viewport height is accepted for interface completeness, but resolution is
/// governed by longitude alone.
pub fn select_tiles(
    config: &RasterConfig,
    query: BBox,
    width: f64,
    _height: f64,
) -> Result<RenderGrid, RasterError> {
    if query.is_degenerate() || !query.overlaps(&config.root) {
        return Err(RasterError::InvalidQuery);
    }

    let depth = choose_depth(config, &query, width);
    let per_axis = 1u32 << depth;
    let tile_width = config.root.width() / f64::from(per_axis);
    let tile_height = config.root.height() / f64::from(per_axis);

    // Whole tiles between each edge of the query box and the matching edge
    // of the root box. Edges hanging outside the root clamp to the grid.
    let left = edge_offset(query.ul_lon - config.root.ul_lon, tile_width, per_axis);
    let right = edge_offset(config.root.lr_lon - query.lr_lon, tile_width, per_axis);
    let top = edge_offset(config.root.ul_lat - query.ul_lat, tile_height, per_axis);
    let bottom = edge_offset(query.lr_lat - config.root.lr_lat, tile_height, per_axis);

    let x_max = (per_axis - 1 - right).max(left);
    let y_max = (per_axis - 1 - bottom).max(top);

    let bounds = BBox {
        ul_lon: config.root.ul_lon + f64::from(left) * tile_width,
        ul_lat: config.root.ul_lat - f64::from(top) * tile_height,
        lr_lon: config.root.ul_lon + f64::from(x_max + 1) * tile_width,
        lr_lat: config.root.ul_lat - f64::from(y_max + 1) * tile_height,
    };

    let mut tiles = Vec::with_capacity((y_max - top + 1) as usize);
    for y in top..=y_max {
        let mut row = Vec::with_capacity((x_max - left + 1) as usize);
        for x in left..=x_max {
            row.push(Tile { depth, x, y });
        }
        tiles.push(row);
    }

    log::debug!(
        "rastering at depth {}: {}x{} tiles",
        depth,
        tiles.len(),
        tiles[0].len()
    );

    Ok(RenderGrid {
        tiles,
        bounds,
        depth,
    })
}

/// Picks the smallest depth whose tiles meet the resolution the viewport
/// asks for, clamped into `[0, max_depth]`. Finer depths halve the
/// longitudinal span of a tile, so the exponent comes straight out of a
/// base-2 logarithm.
fn choose_depth(config: &RasterConfig, query: &BBox, width: f64) -> u8 {
    // Longitudinal span one tile may cover at the requested resolution.
    let required = query.width() / width * f64::from(config.tile_size);
    let depth = (config.root.width() / required).log2().ceil();

    if depth.is_nan() || depth <= 0.0 {
        0
    } else if depth >= f64::from(config.max_depth) {
        config.max_depth
    } else {
        depth as u8
    }
}

/// Counts whole `span`-sized tiles between a root edge and a query edge
/// `distance` degrees inwards from it, clamped into the `per_axis` grid.
/// Negative distances mean the query edge hangs outside the root box.
fn edge_offset(distance: f64, span: f64, per_axis: u32) -> u32 {
    let count = (distance / span).floor();
    if count <= 0.0 {
        0
    } else if count >= f64::from(per_axis - 1) {
        per_axis - 1
    } else {
        count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    fn config() -> RasterConfig {
        RasterConfig {
            root: BBox {
                ul_lon: -122.30,
                ul_lat: 37.88,
                lr_lon: -122.20,
                lr_lat: 37.83,
            },
            tile_size: 256,
            max_depth: 7,
        }
    }

    fn filenames(grid: &RenderGrid) -> Vec<Vec<String>> {
        grid.tiles
            .iter()
            .map(|row| row.iter().map(Tile::filename).collect())
            .collect()
    }

    #[test]
    fn full_map_in_one_tile() {
        let cfg = config();
        let grid = select_tiles(&cfg, cfg.root, 256.0, 256.0).unwrap();

        assert_eq!(grid.depth, 0);
        assert_eq!(filenames(&grid), vec![vec!["d0_x0_y0.png".to_string()]]);
        assert_eq!(grid.bounds, cfg.root);
    }

    #[test]
    fn doubling_the_viewport_doubles_the_grid() {
        let cfg = config();
        let grid = select_tiles(&cfg, cfg.root, 512.0, 512.0).unwrap();

        assert_eq!(grid.depth, 1);
        assert_eq!(
            filenames(&grid),
            vec![
                vec!["d1_x0_y0.png".to_string(), "d1_x1_y0.png".to_string()],
                vec!["d1_x0_y1.png".to_string(), "d1_x1_y1.png".to_string()],
            ]
        );
        assert_eq!(grid.bounds, cfg.root);
    }

    #[test]
    fn depth_grows_monotonically_with_viewport_width() {
        let cfg = config();
        let mut last = 0;
        for width in [64.0, 128.0, 256.0, 512.0, 1024.0, 2048.0] {
            let grid = select_tiles(&cfg, cfg.root, width, width).unwrap();
            assert!(grid.depth >= last, "depth shrank at width {}", width);
            last = grid.depth;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn depth_is_capped() {
        let cfg = config();
        let sliver = BBox {
            ul_lon: -122.2500,
            ul_lat: 37.852,
            lr_lon: -122.2499,
            lr_lat: 37.851,
        };
        let grid = select_tiles(&cfg, sliver, 1024.0, 1024.0).unwrap();
        assert_eq!(grid.depth, cfg.max_depth);
    }

    #[test]
    fn grid_bounds_contain_an_inner_query() {
        let cfg = config();
        let query = BBox {
            ul_lon: -122.26,
            ul_lat: 37.87,
            lr_lon: -122.21,
            lr_lat: 37.84,
        };
        let grid = select_tiles(&cfg, query, 512.0, 512.0).unwrap();

        assert_eq!(grid.depth, 2);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.tiles[0][0], Tile { depth: 2, x: 1, y: 0 });
        assert_eq!(grid.tiles[3][2], Tile { depth: 2, x: 3, y: 3 });
        assert!(grid.bounds.contains(&query));
        assert!(cfg.root.contains(&grid.bounds));
    }

    #[test]
    fn query_hanging_off_the_west_edge_is_clipped() {
        let cfg = config();
        let query = BBox {
            ul_lon: -122.35,
            ul_lat: 37.88,
            lr_lon: -122.25,
            lr_lat: 37.83,
        };
        let grid = select_tiles(&cfg, query, 512.0, 512.0).unwrap();

        assert_eq!(grid.depth, 1);
        assert_eq!(
            filenames(&grid),
            vec![
                vec!["d1_x0_y0.png".to_string()],
                vec!["d1_x0_y1.png".to_string()],
            ]
        );
        assert_almost_eq!(grid.bounds.ul_lon, -122.30);
        assert_almost_eq!(grid.bounds.lr_lon, -122.25);
    }

    #[test]
    fn tile_aligned_query_excludes_zero_width_neighbors() {
        let cfg = RasterConfig {
            root: BBox {
                ul_lon: 0.0,
                ul_lat: 1.0,
                lr_lon: 1.0,
                lr_lat: 0.0,
            },
            tile_size: 256,
            max_depth: 7,
        };
        let query = BBox {
            ul_lon: 0.25,
            ul_lat: 1.0,
            lr_lon: 0.5,
            lr_lat: 0.5,
        };
        let grid = select_tiles(&cfg, query, 256.0, 256.0).unwrap();

        assert_eq!(grid.depth, 2);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 1);
        assert_eq!(grid.tiles[0][0], Tile { depth: 2, x: 1, y: 0 });
        assert_eq!(grid.tiles[1][0], Tile { depth: 2, x: 1, y: 1 });
        assert_eq!(
            grid.bounds,
            BBox {
                ul_lon: 0.25,
                ul_lat: 1.0,
                lr_lon: 0.5,
                lr_lat: 0.5,
            }
        );
    }

    #[test]
    fn query_entirely_west_of_the_root_fails() {
        let cfg = config();
        let query = BBox {
            ul_lon: -122.50,
            ul_lat: 37.88,
            lr_lon: -122.40,
            lr_lat: 37.83,
        };
        assert_eq!(
            select_tiles(&cfg, query, 256.0, 256.0),
            Err(RasterError::InvalidQuery)
        );
    }

    #[test]
    fn query_touching_only_the_root_edge_fails() {
        let cfg = config();
        let query = BBox {
            ul_lon: -122.40,
            ul_lat: 37.88,
            lr_lon: -122.30,
            lr_lat: 37.83,
        };
        assert_eq!(
            select_tiles(&cfg, query, 256.0, 256.0),
            Err(RasterError::InvalidQuery)
        );
    }

    #[test]
    fn degenerate_query_fails() {
        let cfg = config();
        let flipped = BBox {
            ul_lon: -122.20,
            ul_lat: 37.88,
            lr_lon: -122.30,
            lr_lat: 37.83,
        };
        assert_eq!(
            select_tiles(&cfg, flipped, 256.0, 256.0),
            Err(RasterError::InvalidQuery)
        );
    }

    #[test]
    fn query_wider_than_the_root_clamps_to_depth_zero() {
        let cfg = config();
        let huge = BBox {
            ul_lon: -123.0,
            ul_lat: 38.0,
            lr_lon: -121.0,
            lr_lat: 37.0,
        };
        let grid = select_tiles(&cfg, huge, 1024.0, 1024.0).unwrap();
        assert_eq!(grid.depth, 0);
        assert_eq!(filenames(&grid), vec![vec!["d0_x0_y0.png".to_string()]]);
        assert_eq!(grid.bounds, cfg.root);
    }
}
