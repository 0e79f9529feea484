// SPDX-License-Identifier: MIT

//! Map tile selection and street routing over a fixed region.
//!
//! The crate answers two kinds of queries against an immutable street map.
//! Given a geographic bounding box and a pixel viewport, [select_tiles] picks
//! the coarsest grid of fixed-size map tiles that still meets the viewport's
//! resolution. Given two coordinates, a [KDTree] snaps them to the nearest
//! [Graph] vertices, [find_route] runs A* between them, and [describe_route]
//! turns the resulting path into turn-by-turn instructions.
//!
//! Street data is supplied by the caller as plain nodes and edges; serving
//! tile images and parsing map extracts stay outside this crate.
//!
//! # Example
//!
//! ```
//! use cartex::{BBox, Graph, KDTree, Node, RasterConfig};
//!
//! // Two streets meeting at a corner.
//! let mut g = Graph::default();
//! g.set_node(Node { id: 1, lat: 37.875, lon: -122.260 });
//! g.set_node(Node { id: 2, lat: 37.875, lon: -122.255 });
//! g.set_node(Node { id: 3, lat: 37.870, lon: -122.255 });
//! let hearst = g.intern_street("Hearst Ave");
//! let oxford = g.intern_street("Oxford St");
//! g.connect(1, 2, cartex::earth_distance(37.875, -122.260, 37.875, -122.255), hearst);
//! g.connect(2, 3, cartex::earth_distance(37.875, -122.255, 37.870, -122.255), oxford);
//!
//! // Snap free-form coordinates to graph vertices.
//! let tree = KDTree::from_iter(g.iter().copied()).expect("graph is not empty");
//! let start = tree.find_nearest_node(37.876, -122.261);
//! let end = tree.find_nearest_node(37.869, -122.254);
//!
//! // Shortest path and directions.
//! let route = cartex::find_route(&g, start.id, end.id, cartex::DEFAULT_STEP_LIMIT)
//!     .expect("route exists");
//! assert_eq!(route, vec![1, 2, 3]);
//! let steps = cartex::describe_route(&g, &route).expect("path is connected");
//! assert_eq!(steps.len(), 2);
//!
//! // Tile grid for a map viewport.
//! let config = RasterConfig {
//!     root: BBox {
//!         ul_lon: -122.30,
//!         ul_lat: 37.88,
//!         lr_lon: -122.20,
//!         lr_lat: 37.83,
//!     },
//!     tile_size: 256,
//!     max_depth: 7,
//! };
//! let grid = cartex::select_tiles(&config, config.root, 256.0, 256.0)
//!     .expect("query overlaps the root box");
//! assert_eq!(grid.depth, 0);
//! assert_eq!(grid.tiles[0][0].filename(), "d0_x0_y0.png");
//! ```

mod astar;
mod directions;
mod geo;
mod graph;
mod kd;
mod raster;

pub use astar::{find_route, AStarError, DEFAULT_STEP_LIMIT};
pub use directions::{
    describe_route, DirectionsError, Instruction, Turn, REVERSE_MIN_DEG, SHARP_MIN_DEG,
    SLIGHT_MAX_DEG, STRAIGHT_MAX_DEG,
};
pub use geo::{bearing, earth_distance, BBox};
pub use graph::Graph;
pub use kd::KDTree;
pub use raster::{select_tiles, RasterConfig, RasterError, RenderGrid, Tile};

/// Represents a vertex of the [Graph]: a stable identifier plus a position.
///
/// Coordinates are degrees, with `lon` in [-180, 180] and `lat` in [-90, 90].
/// An optional human-readable name can be attached through
/// [Graph::set_node_name]; it is kept out of this struct so that nodes stay
/// cheap to copy into the [KDTree] and the routing frontier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// Represents an outgoing connection from a specific [Node].
///
/// `cost` is the physical length of the road segment in kilometers and must
/// not be smaller than the crow-flies distance between the two endpoints,
/// otherwise route finding may return non-optimal paths.
///
/// `street` is an interned street-name id owned by the [Graph]
/// (see [Graph::intern_street]).
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub cost: f64,
    pub street: u32,
}
