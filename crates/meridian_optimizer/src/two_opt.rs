use tracing::debug;

use crate::{
    cost_matrix::CostMatrix,
    optimizer::{PathEndpoints, START_NODE, stop_node},
};

/// Upper bound on full improvement passes; each pass scans all segment
/// reversals once, so the refinement finishes in bounded time regardless of
/// input size.
pub(crate) const TWO_OPT_MAX_PASSES: usize = 32;

/// Reversals below this cost delta are ignored to keep float noise from
/// cycling the search.
const MIN_IMPROVEMENT: f64 = 1e-9;

/// **2-opt** refinement of a stop order with fixed endpoints.
///
/// Reversing the segment `order[i..=j]` replaces the edges into `order[i]`
/// and out of `order[j]`:
///
/// ```text
/// BEFORE:  start .. (prev) --x--> [i] -> ... -> [j] --x--> (next) .. end
/// AFTER:   start .. (prev) -----> [j] -> ... -> [i] -----> (next) .. end
/// ```
///
/// Interior edges are symmetric under the great-circle proxy, so only the
/// two boundary edges change cost. Runs first-improvement passes until a
/// pass finds nothing or the pass cap is hit.
pub(crate) fn two_opt_passes(
    matrix: &CostMatrix,
    endpoints: &PathEndpoints,
    order: &mut [usize],
    max_passes: usize,
) {
    if order.len() < 2 {
        return;
    }

    for pass in 0..max_passes {
        let mut improved = false;

        for i in 0..order.len() - 1 {
            for j in i + 1..order.len() {
                if reversal_delta(matrix, endpoints, order, i, j) < -MIN_IMPROVEMENT {
                    order[i..=j].reverse();
                    improved = true;
                }
            }
        }

        if !improved {
            debug!(passes = pass + 1, "2-opt converged");
            return;
        }
    }
}

fn reversal_delta(
    matrix: &CostMatrix,
    endpoints: &PathEndpoints,
    order: &[usize],
    i: usize,
    j: usize,
) -> f64 {
    let prev = if i == 0 {
        START_NODE
    } else {
        stop_node(order[i - 1])
    };
    let next = if j == order.len() - 1 {
        endpoints.terminal
    } else {
        stop_node(order[j + 1])
    };

    let first = stop_node(order[i]);
    let last = stop_node(order[j]);

    let current = matrix.cost(prev, first) + matrix.cost(last, next);
    let reversed = matrix.cost(prev, last) + matrix.cost(first, next);

    reversed - current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::path_cost;
    use geo_types::Point;

    fn line_matrix() -> (CostMatrix, PathEndpoints) {
        // start, five stops on a line, end
        let mut points = vec![Point::new(0.0, 0.0)];
        points.extend((1..=5).map(|i| Point::new(i as f64, 0.0)));
        points.push(Point::new(6.0, 0.0));

        let endpoints = PathEndpoints {
            terminal: points.len() - 1,
        };
        (CostMatrix::from_points(&points), endpoints)
    }

    #[test]
    fn test_unscrambles_a_line() {
        let (matrix, endpoints) = line_matrix();

        let mut order = vec![2, 0, 4, 1, 3];
        two_opt_passes(&matrix, &endpoints, &mut order, TWO_OPT_MAX_PASSES);

        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_never_increases_cost() {
        let (matrix, endpoints) = line_matrix();

        let initial = vec![4, 2, 0, 3, 1];
        let before = path_cost(&matrix, &endpoints, &initial);

        let mut order = initial.clone();
        two_opt_passes(&matrix, &endpoints, &mut order, 1);
        let after = path_cost(&matrix, &endpoints, &order);

        assert!(after <= before);
    }

    #[test]
    fn test_optimal_order_is_stable() {
        let (matrix, endpoints) = line_matrix();

        let mut order = vec![0, 1, 2, 3, 4];
        two_opt_passes(&matrix, &endpoints, &mut order, TWO_OPT_MAX_PASSES);

        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }
}
