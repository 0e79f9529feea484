// SPDX-License-Identifier: MIT

use crate::{earth_distance, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large datasets. Practice shows
/// that [crate::Graph::find_nearest_node] takes significantly more time than
/// [crate::find_route] when snapping the endpoints of multiple routes. A k-d tree
/// can help with that, trading memory usage for CPU time.
///
/// This implementation assumes euclidean geometry, even though the default distance function
/// used is [earth_distance]. This results in undefined behavior when points
/// are close to the ante meridian (180°/-180° longitude) or poles (90°/-90° latitude),
/// or when the data spans multiple continents.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    ///
    /// Ties are broken in favor of the first candidate encountered, which is
    /// deterministic for a fixed build order.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        self.find_nearest_node_impl(lat, lon, false).0
    }

    fn find_nearest_node_impl(&self, lat: f64, lon: f64, lon_divides: bool) -> (Node, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = earth_distance(lat, lon, best.lat, best.lon);

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < best.lon
        } else {
            lat < best.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(ref branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let (axis_lat, axis_lon) = if lon_divides {
                (lat, self.pivot.lon)
            } else {
                (self.pivot.lat, lon)
            };
            let dist_to_axis = earth_distance(lat, lon, axis_lat, axis_lon);

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    /// Returns [None] if the iterable yields no nodes.
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    ///
    /// Returns [None] for an empty slice; a tree that can be queried is
    /// therefore never empty.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], lon_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    nodes.sort_by(|a, b| a.lon.partial_cmp(&b.lon).unwrap());
                } else {
                    nodes.sort_by(|a, b| a.lat.partial_cmp(&b.lat).unwrap());
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: box_option(Self::build_impl(left, !lon_divides)),
                    right: box_option(Self::build_impl(right, !lon_divides)),
                })
            }
        }
    }
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(|thing| Box::new(thing))
}
