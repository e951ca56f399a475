use thiserror::Error;
use tracing::debug;

use crate::{
    cost_matrix::CostMatrix,
    exhaustive::exhaustive_search,
    nearest_neighbor::nearest_neighbor_order,
    two_opt::{TWO_OPT_MAX_PASSES, two_opt_passes},
};

/// Maximum total waypoint count (start + stops + end) for which every
/// permutation of the free stops is evaluated. Beyond this the search space
/// grows factorially and the heuristic branch takes over.
pub const EXACT_SEARCH_MAX: usize = 8;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("an end waypoint is required unless the route is a round trip")]
    MissingEnd,
}

/// Stop visiting order chosen by the search, as indices into the caller's
/// stop slice, plus the proxy cost of that order and of the order the stops
/// were given in. The caller re-attaches its own metadata by index.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedOrder {
    pub stop_order: Vec<usize>,
    pub optimized_cost: f64,
    pub input_order_cost: f64,
}

/// Node layout shared by the search strategies: node 0 is the start, node
/// `k + 1` is stop `k`, and `terminal` is the node every order must end on
/// (the explicit end, or the start again for a round trip).
pub(crate) struct PathEndpoints {
    pub terminal: usize,
}

pub(crate) const START_NODE: usize = 0;

#[inline]
pub(crate) fn stop_node(stop: usize) -> usize {
    stop + 1
}

/// Cost of visiting the stops in `order`, walking start -> stops -> terminal.
pub(crate) fn path_cost(matrix: &CostMatrix, endpoints: &PathEndpoints, order: &[usize]) -> f64 {
    let mut cost = 0.0;
    let mut from = START_NODE;

    for &stop in order {
        let to = stop_node(stop);
        cost += matrix.cost(from, to);
        from = to;
    }

    cost + matrix.cost(from, endpoints.terminal)
}

/// Picks the stop visiting order minimizing summed great-circle cost over
/// consecutive legs. The start is always first; the terminal (explicit end,
/// or the start for a round trip) is never part of the permutation space.
pub fn optimize(
    start: geo_types::Point,
    end: Option<geo_types::Point>,
    stops: &[geo_types::Point],
    round_trip: bool,
) -> Result<OptimizedOrder, OptimizeError> {
    if !round_trip && end.is_none() {
        return Err(OptimizeError::MissingEnd);
    }

    // Node layout: [start, stops..., end?]. A round trip terminates back on
    // the start node and carries no separate end node.
    let mut points = Vec::with_capacity(stops.len() + 2);
    points.push(start);
    points.extend_from_slice(stops);

    let endpoints = if round_trip {
        PathEndpoints {
            terminal: START_NODE,
        }
    } else {
        points.push(end.unwrap_or(start));
        PathEndpoints {
            terminal: points.len() - 1,
        }
    };

    let matrix = CostMatrix::from_points(&points);

    let input_order: Vec<usize> = (0..stops.len()).collect();
    let input_order_cost = path_cost(&matrix, &endpoints, &input_order);

    if stops.len() <= 1 {
        return Ok(OptimizedOrder {
            stop_order: input_order,
            optimized_cost: input_order_cost,
            input_order_cost,
        });
    }

    let total_waypoints = stops.len() + 2;
    let stop_order = if total_waypoints <= EXACT_SEARCH_MAX {
        debug!(stops = stops.len(), "optimizer: exhaustive search");
        exhaustive_search(&matrix, &endpoints, stops.len())
    } else {
        debug!(stops = stops.len(), "optimizer: nearest-neighbor + 2-opt");
        let mut order = nearest_neighbor_order(&matrix, stops.len());
        two_opt_passes(&matrix, &endpoints, &mut order, TWO_OPT_MAX_PASSES);
        order
    };

    let optimized_cost = path_cost(&matrix, &endpoints, &stop_order);

    Ok(OptimizedOrder {
        stop_order,
        optimized_cost,
        input_order_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    fn point(lon: f64, lat: f64) -> Point {
        Point::new(lon, lat)
    }

    #[test]
    fn test_missing_end_rejected() {
        let result = optimize(point(0.0, 0.0), None, &[point(1.0, 0.0)], false);
        assert!(matches!(result, Err(OptimizeError::MissingEnd)));
    }

    #[test]
    fn test_zero_stops_is_trivial() {
        let order = optimize(point(0.0, 0.0), Some(point(1.0, 0.0)), &[], false).unwrap();

        assert!(order.stop_order.is_empty());
        assert!(order.optimized_cost > 0.0);
        assert_eq!(order.optimized_cost, order.input_order_cost);
    }

    #[test]
    fn test_two_stops_picks_cheaper_order() {
        // Start and end on a west-east line; B sits near the start, C near
        // the end, so [B, C] beats [C, B].
        let start = point(0.0, 0.0);
        let end = point(3.0, 0.0);
        let b = point(1.0, 0.0);
        let c = point(2.0, 0.0);

        let order = optimize(start, Some(end), &[b, c], false).unwrap();
        assert_eq!(order.stop_order, vec![0, 1]);

        // Same stops handed over in the opposite order still yield the same
        // geographic sequence.
        let order = optimize(start, Some(end), &[c, b], false).unwrap();
        assert_eq!(order.stop_order, vec![1, 0]);
        assert!(order.optimized_cost < order.input_order_cost);
    }

    #[test]
    fn test_output_is_permutation() {
        let start = point(0.0, 0.0);
        let end = point(10.0, 10.0);
        let stops: Vec<Point> = (0..6).map(|i| point(i as f64, (i % 3) as f64)).collect();

        for count in 0..=stops.len() {
            let order = optimize(start, Some(end), &stops[..count], false).unwrap();

            let mut seen = order.stop_order.clone();
            seen.sort_unstable();
            let expected: Vec<usize> = (0..count).collect();
            assert_eq!(seen, expected, "lost or duplicated a stop at n={count}");
        }
    }

    #[test]
    fn test_exhaustive_is_optimal() {
        // Compare against a brute-force walk over all permutations.
        let start = point(2.0, 4.0);
        let end = point(7.0, 1.0);
        let stops = vec![
            point(5.0, 5.0),
            point(1.0, 1.0),
            point(6.0, 2.0),
            point(3.0, 0.5),
            point(4.5, 3.0),
        ];

        let order = optimize(start, Some(end), &stops, false).unwrap();

        let mut points = vec![start];
        points.extend_from_slice(&stops);
        points.push(end);
        let matrix = CostMatrix::from_points(&points);
        let endpoints = PathEndpoints {
            terminal: points.len() - 1,
        };

        let mut perm: Vec<usize> = (0..stops.len()).collect();
        let mut best = f64::INFINITY;
        loop {
            best = best.min(path_cost(&matrix, &endpoints, &perm));
            if !crate::exhaustive::next_permutation(&mut perm) {
                break;
            }
        }

        assert!((order.optimized_cost - best).abs() < 1e-9);
    }

    #[test]
    fn test_exhaustive_is_optimal_at_threshold() {
        // Six stops plus start and end is exactly EXACT_SEARCH_MAX total
        // waypoints, the largest input still handled exhaustively.
        let start = point(0.0, 3.0);
        let end = point(8.0, 3.0);
        let stops = vec![
            point(1.5, 5.0),
            point(6.0, 0.5),
            point(2.5, 1.0),
            point(7.0, 4.5),
            point(4.0, 6.0),
            point(5.5, 2.5),
        ];
        assert_eq!(stops.len() + 2, EXACT_SEARCH_MAX);

        let order = optimize(start, Some(end), &stops, false).unwrap();

        let mut points = vec![start];
        points.extend_from_slice(&stops);
        points.push(end);
        let matrix = CostMatrix::from_points(&points);
        let endpoints = PathEndpoints {
            terminal: points.len() - 1,
        };

        let mut perm: Vec<usize> = (0..stops.len()).collect();
        let mut best = f64::INFINITY;
        loop {
            best = best.min(path_cost(&matrix, &endpoints, &perm));
            if !crate::exhaustive::next_permutation(&mut perm) {
                break;
            }
        }

        assert!((order.optimized_cost - best).abs() < 1e-9);
        assert!(order.optimized_cost <= order.input_order_cost);
    }

    #[test]
    fn test_duplicate_stops_do_not_break_search() {
        let start = point(0.0, 0.0);
        let dup = point(1.0, 1.0);
        let stops = vec![dup, dup, point(2.0, 0.0)];

        let order = optimize(start, None, &stops, true).unwrap();

        let mut seen = order.stop_order.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(order.optimized_cost.is_finite());
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // Two stops at the exact same coordinates: both orders cost the
        // same, so the lexicographically first permutation must win.
        let start = point(0.0, 0.0);
        let dup = point(1.0, 0.0);

        let order = optimize(start, None, &[dup, dup], true).unwrap();
        assert_eq!(order.stop_order, vec![0, 1]);
    }

    #[test]
    fn test_round_trip_cost_closes_on_start() {
        let start = point(0.0, 0.0);
        let b = point(1.0, 0.0);

        let order = optimize(start, None, &[b], true).unwrap();

        // Out and back: twice the single-leg cost.
        let matrix = CostMatrix::from_points(&[start, b]);
        let one_way = matrix.cost(0, 1);
        assert!((order.optimized_cost - 2.0 * one_way).abs() < 1e-9);
    }

    #[test]
    fn test_heuristic_branch_beats_input_order() {
        // 9 stops pushes the total waypoint count past the exhaustive
        // threshold. Feed the stops in a deliberately bad zig-zag order and
        // expect nearest-neighbor + 2-opt to improve on it.
        let start = point(0.0, 0.0);
        let end = point(10.0, 0.0);
        let mut stops: Vec<Point> = (1..=9).map(|i| point(i as f64, 0.0)).collect();
        stops.reverse();
        stops.swap(0, 4);

        let order = optimize(start, Some(end), &stops, false).unwrap();

        assert!(order.optimized_cost < order.input_order_cost);

        let mut seen = order.stop_order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..9).collect::<Vec<_>>());

        // Collinear points have a known optimum: straight west to east.
        let straight: f64 = {
            let mut points = vec![start];
            points.extend_from_slice(&stops);
            points.push(end);
            let matrix = CostMatrix::from_points(&points);
            matrix.cost(0, points.len() - 1)
        };
        assert!((order.optimized_cost - straight).abs() < 1.0);
    }
}
