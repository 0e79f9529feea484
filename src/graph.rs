// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

/// Represents a street network as a set of [Nodes](Node) and
/// [Edges](Edge) between them, plus the street-name table referenced
/// by edges and optional display names for individual nodes.
///
/// The graph is meant to be built once at startup and then shared
/// read-only between queries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<i64, (Node, Vec<Edge>)>,
    node_names: BTreeMap<i64, String>,
    streets: Vec<String>,
    street_ids: HashMap<String, u32>,
}

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().map(|(_, (node, _))| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved.
    /// Updating a [Node] position might result in violation of the
    /// [Edge] cost invariant (and thus break route finding) and
    /// is therefore disallowed.
    pub fn set_node(&mut self, node: Node) {
        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Attaches a human-readable name to a node, e.g. for a named place.
    pub fn set_node_name(&mut self, id: i64, name: impl Into<String>) {
        self.node_names.insert(id, name.into());
    }

    /// Gets the name attached to a node, if any.
    pub fn get_node_name(&self, id: i64) -> Option<&str> {
        self.node_names.get(&id).map(String::as_str)
    }

    /// Interns a street name and returns its id, reusing the id of an
    /// already-interned equal name. The returned id is what [Edge::street]
    /// refers to.
    pub fn intern_street(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.street_ids.get(name) {
            return id;
        }
        let id = self.streets.len() as u32;
        self.streets.push(name.to_string());
        self.street_ids.insert(name.to_string(), id);
        id
    }

    /// Resolves an interned street id back to its name.
    /// Unknown ids resolve to the empty string.
    pub fn street_name(&self, street: u32) -> &str {
        self.streets
            .get(street as usize)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Finds the closest [Node] to the given position by exhaustively
    /// scanning the whole graph.
    ///
    /// This takes time linear in the graph size; use a
    /// [KDTree](crate::KDTree) when snapping many coordinates.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.nodes
            .iter()
            .map(|(_, &(nd, _))| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.partial_cmp(b_dist).unwrap())
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.nodes
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the cost of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.find_edge(from_id, to_id)
            .map(|e| e.cost)
            .unwrap_or(f64::INFINITY)
    }

    /// Gets the full [Edge] from one node to another, if it exists.
    pub fn find_edge(&self, from_id: i64, to_id: i64) -> Option<Edge> {
        self.nodes
            .get(&from_id)
            .and_then(|(_, e)| e.iter().find(|edge| edge.to == to_id))
            .copied()
    }

    /// Creates or updates a one-way [Edge] from a node with a given id.
    pub fn set_edge(&mut self, from_id: i64, edge: Edge) {
        if let Some((_, edges)) = self.nodes.get_mut(&from_id) {
            if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                *candidate = edge;
            } else {
                edges.push(edge);
            }
        }
    }

    /// Connects two nodes with a road segment traversable in either
    /// direction, with the given cost and interned street id.
    pub fn connect(&mut self, a: i64, b: i64, cost: f64, street: u32) {
        self.set_edge(a, Edge { to: b, cost, street });
        self.set_edge(b, Edge { to: a, cost, street });
    }
}
