// SPDX-License-Identifier: MIT

use std::fmt;

use crate::{bearing, Graph};

/// Bearing changes smaller than this (in degrees, either side) read as
/// continuing straight ahead.
pub const STRAIGHT_MAX_DEG: f64 = 15.0;

/// Upper bound (exclusive) on the bearing change of a slight turn.
pub const SLIGHT_MAX_DEG: f64 = 45.0;

/// Lower bound (inclusive) on the bearing change of a sharp turn.
pub const SHARP_MIN_DEG: f64 = 120.0;

/// Bearing changes at or beyond this read as turning around.
pub const REVERSE_MIN_DEG: f64 = 165.0;

/// How a route leg begins, relative to the direction of travel at the end
/// of the previous leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The first leg of a route; there is no previous direction.
    Start,
    Straight,
    SlightLeft,
    SlightRight,
    Left,
    Right,
    SharpLeft,
    SharpRight,
    Reverse,
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Start => "start",
            Self::Straight => "continue straight",
            Self::SlightLeft => "slight left",
            Self::SlightRight => "slight right",
            Self::Left => "turn left",
            Self::Right => "turn right",
            Self::SharpLeft => "sharp left",
            Self::SharpRight => "sharp right",
            Self::Reverse => "turn around",
        };
        f.write_str(text)
    }
}

/// A single entry of a route description: how to enter the street, its
/// name, and how far to travel along it (in kilometers) before the next
/// instruction applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub turn: Turn,
    pub street: String,
    pub distance: f64,
}

/// Error conditions which may occur during [describe_route](crate::describe_route).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DirectionsError {
    /// A node referenced by the path doesn't exist in the graph.
    #[error("invalid node: {0}")]
    InvalidReference(i64),

    /// Two consecutive path nodes are not joined by an edge.
    #[error("no edge between nodes {0} and {1}")]
    NoSuchEdge(i64, i64),
}

/// Compiles a route, as returned by [find_route](crate::find_route), into
/// an ordered list of [Instructions](Instruction).
///
/// Consecutive legs along the same street collapse into one instruction
/// with their summed distance; a street change emits a new instruction,
/// classified by the change of bearing at the transition node. The first
/// instruction is always [Turn::Start]; the last one describes the street
/// the route arrives on. Paths with fewer than two nodes produce no
/// instructions.
pub fn describe_route(g: &Graph, path: &[i64]) -> Result<Vec<Instruction>, DirectionsError> {
    let mut instructions = Vec::new();
    if path.len() < 2 {
        return Ok(instructions);
    }

    let mut run_turn = Turn::Start;
    let mut run_street = 0u32;
    let mut run_distance = 0.0f64;
    let mut prev_bearing = 0.0f64;
    let mut started = false;

    for pair in path.windows(2) {
        let (from_id, to_id) = (pair[0], pair[1]);
        let from = g
            .get_node(from_id)
            .ok_or(DirectionsError::InvalidReference(from_id))?;
        let to = g
            .get_node(to_id)
            .ok_or(DirectionsError::InvalidReference(to_id))?;
        let edge = g
            .find_edge(from_id, to_id)
            .ok_or(DirectionsError::NoSuchEdge(from_id, to_id))?;
        let leg_bearing = bearing(from.lat, from.lon, to.lat, to.lon);

        if !started {
            run_street = edge.street;
            run_distance = edge.cost;
            started = true;
        } else if edge.street == run_street {
            run_distance += edge.cost;
        } else {
            instructions.push(Instruction {
                turn: run_turn,
                street: g.street_name(run_street).to_string(),
                distance: run_distance,
            });
            run_turn = classify(bearing_delta(prev_bearing, leg_bearing));
            run_street = edge.street;
            run_distance = edge.cost;
        }
        prev_bearing = leg_bearing;
    }

    instructions.push(Instruction {
        turn: run_turn,
        street: g.street_name(run_street).to_string(),
        distance: run_distance,
    });
    Ok(instructions)
}

/// Signed change of direction between two bearings, normalized into
/// (-180, 180]. Positive values turn clockwise (to the right).
fn bearing_delta(incoming: f64, outgoing: f64) -> f64 {
    let mut delta = outgoing - incoming;
    if delta <= -180.0 {
        delta += 360.0;
    } else if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

fn classify(delta: f64) -> Turn {
    let magnitude = delta.abs();
    if magnitude < STRAIGHT_MAX_DEG {
        Turn::Straight
    } else if magnitude >= REVERSE_MIN_DEG {
        Turn::Reverse
    } else if delta < 0.0 {
        if magnitude < SLIGHT_MAX_DEG {
            Turn::SlightLeft
        } else if magnitude < SHARP_MIN_DEG {
            Turn::Left
        } else {
            Turn::SharpLeft
        }
    } else if magnitude < SLIGHT_MAX_DEG {
        Turn::SlightRight
    } else if magnitude < SHARP_MIN_DEG {
        Turn::Right
    } else {
        Turn::SharpRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

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

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node { id, lat, lon }
    }

    /// A path heading due east along the equator: 1 -> 2 -> 3, with a
    /// branch node 4 south of 2 and node 5 north of 2.
    fn crossroads() -> Graph {
        let mut g = Graph::default();
        g.set_node(node(1, 0.0, 0.0));
        g.set_node(node(2, 0.0, 0.001));
        g.set_node(node(3, 0.0, 0.002));
        g.set_node(node(4, -0.001, 0.001));
        g.set_node(node(5, 0.001, 0.001));
        g
    }

    #[test]
    fn same_street_legs_collapse_into_one_instruction() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        g.connect(1, 2, 0.12, main);
        g.connect(2, 3, 0.13, main);

        let steps = describe_route(&g, &[1, 2, 3]).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].turn, Turn::Start);
        assert_eq!(steps[0].street, "Main St");
        assert_almost_eq!(steps[0].distance, 0.25);
    }

    #[test]
    fn street_change_without_turning_reads_as_straight() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let cont = g.intern_street("Main St Extension");
        g.connect(1, 2, 0.12, main);
        g.connect(2, 3, 0.13, cont);

        let steps = describe_route(&g, &[1, 2, 3]).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].turn, Turn::Start);
        assert_almost_eq!(steps[0].distance, 0.12);
        assert_eq!(steps[1].turn, Turn::Straight);
        assert_eq!(steps[1].street, "Main St Extension");
        assert_almost_eq!(steps[1].distance, 0.13);
    }

    #[test]
    fn turning_south_after_heading_east_is_a_right_turn() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let side = g.intern_street("South Rd");
        g.connect(1, 2, 0.12, main);
        g.connect(2, 4, 0.12, side);

        let steps = describe_route(&g, &[1, 2, 4]).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].turn, Turn::Right);
        assert_eq!(steps[1].street, "South Rd");
    }

    #[test]
    fn turning_north_after_heading_east_is_a_left_turn() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let side = g.intern_street("North Rd");
        g.connect(1, 2, 0.12, main);
        g.connect(2, 5, 0.12, side);

        let steps = describe_route(&g, &[1, 2, 5]).unwrap();
        assert_eq!(steps[1].turn, Turn::Left);
    }

    #[test]
    fn heading_back_reads_as_turning_around() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let back = g.intern_street("Main St Back");
        g.connect(1, 2, 0.12, main);
        g.set_edge(
            2,
            crate::Edge {
                to: 1,
                cost: 0.12,
                street: back,
            },
        );

        let steps = describe_route(&g, &[1, 2, 1]).unwrap();
        assert_eq!(steps[1].turn, Turn::Reverse);
    }

    #[test]
    fn shallow_turns_are_slight() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let side = g.intern_street("Diagonal Ave");
        // Heading about 120° from north after travelling east: a 30° change.
        g.set_node(node(6, -0.0005, 0.001866));
        g.connect(1, 2, 0.12, main);
        g.connect(2, 6, 0.12, side);

        let steps = describe_route(&g, &[1, 2, 6]).unwrap();
        assert_eq!(steps[1].turn, Turn::SlightRight);
    }

    #[test]
    fn tight_turns_are_sharp() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        let side = g.intern_street("Hairpin Way");
        // Heading about 320° from north after travelling east: a -130° change.
        g.set_node(node(7, 0.000766, 0.000357));
        g.connect(1, 2, 0.12, main);
        g.connect(2, 7, 0.12, side);

        let steps = describe_route(&g, &[1, 2, 7]).unwrap();
        assert_eq!(steps[1].turn, Turn::SharpLeft);
    }

    #[test]
    fn classification_band_boundaries() {
        assert_eq!(classify(0.0), Turn::Straight);
        assert_eq!(classify(14.999), Turn::Straight);
        assert_eq!(classify(-14.999), Turn::Straight);
        assert_eq!(classify(15.0), Turn::SlightRight);
        assert_eq!(classify(-15.0), Turn::SlightLeft);
        assert_eq!(classify(44.999), Turn::SlightRight);
        assert_eq!(classify(45.0), Turn::Right);
        assert_eq!(classify(-45.0), Turn::Left);
        assert_eq!(classify(119.999), Turn::Right);
        assert_eq!(classify(120.0), Turn::SharpRight);
        assert_eq!(classify(-120.0), Turn::SharpLeft);
        assert_eq!(classify(164.999), Turn::SharpRight);
        assert_eq!(classify(165.0), Turn::Reverse);
        assert_eq!(classify(-165.0), Turn::Reverse);
        assert_eq!(classify(180.0), Turn::Reverse);
    }

    #[test]
    fn bearing_delta_wraps_around_north() {
        assert_almost_eq!(bearing_delta(350.0, 10.0), 20.0);
        assert_almost_eq!(bearing_delta(10.0, 350.0), -20.0);
        assert_almost_eq!(bearing_delta(90.0, 270.0), 180.0);
    }

    #[test]
    fn short_paths_produce_no_instructions() {
        let g = crossroads();
        assert_eq!(describe_route(&g, &[]).unwrap(), vec![]);
        assert_eq!(describe_route(&g, &[1]).unwrap(), vec![]);
    }

    #[test]
    fn unknown_nodes_and_missing_edges_are_rejected() {
        let mut g = crossroads();
        let main = g.intern_street("Main St");
        g.connect(1, 2, 0.12, main);

        assert_eq!(
            describe_route(&g, &[1, 99]),
            Err(DirectionsError::InvalidReference(99))
        );
        assert_eq!(
            describe_route(&g, &[1, 2, 3]),
            Err(DirectionsError::NoSuchEdge(2, 3))
        );
    }
}
