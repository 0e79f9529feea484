// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{earth_distance, AStarError, Edge, Graph};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.at == other.at
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        // Equal scores pop the lower node id first, keeping results
        // reproducible across runs.
        other
            .score
            .partial_cmp(&self.score)
            .unwrap()
            .then_with(|| other.at.cmp(&self.at))
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// The crow-flies distance to the end node serves as the heuristic; it never
/// overestimates the remaining road distance (see the [Edge] cost invariant),
/// so the returned path has minimal total cost. When several paths share the
/// minimal cost, the returned one is stable: a recorded predecessor is only
/// replaced by a strictly cheaper one, and queue ties are broken by node id.
///
/// Returns [AStarError::NoPathFound] if the end node cannot be reached from
/// the start node at all, and a single-node path when `from_id == to_id`.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [AStarError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start, which is usually very time-consuming,
/// especially on large datasets. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, AStarError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    let to_node = g
        .get_node(to_id)
        .ok_or(AStarError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(AStarError::InvalidReference(from_id))?;

        let initial_distance =
            earth_distance(from_node.lat, from_node.lon, to_node.lat, to_node.lon);

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            score: initial_distance,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            log::debug!("route found after {} expansions", steps);
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(AStarError::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
            ..
        } in g.get_edges(item.at)
        {
            // Check if the referred node exists
            if let Some(neighbor) = g.get_node(neighbor_id) {
                // Check if this is a strictly cheaper way to the neighbor
                let neighbor_cost = item.cost + edge_cost;
                if neighbor_cost
                    >= known_costs
                        .get(&neighbor_id)
                        .cloned()
                        .unwrap_or(f64::INFINITY)
                {
                    continue;
                }

                // Push the new item into the queue
                came_from.insert(neighbor_id, item.at);
                known_costs.insert(neighbor_id, neighbor_cost);
                queue.push(QueueItem {
                    at: neighbor_id,
                    cost: neighbor_cost,
                    score: neighbor_cost
                        + earth_distance(neighbor.lat, neighbor.lon, to_node.lat, to_node.lon),
                });
            }
        }
    }

    Err(AStarError::NoPathFound)
}
