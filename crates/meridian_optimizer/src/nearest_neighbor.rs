use crate::{
    cost_matrix::CostMatrix,
    optimizer::{START_NODE, stop_node},
};

/// Builds an initial stop order greedily: from the start, repeatedly visit
/// the cheapest unvisited stop. Index order breaks cost ties.
pub(crate) fn nearest_neighbor_order(matrix: &CostMatrix, stop_count: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(stop_count);
    let mut visited = vec![false; stop_count];
    let mut current = START_NODE;

    for _ in 0..stop_count {
        let mut nearest = None;
        let mut nearest_cost = f64::INFINITY;

        for stop in 0..stop_count {
            if visited[stop] {
                continue;
            }
            let cost = matrix.cost(current, stop_node(stop));
            if cost < nearest_cost {
                nearest_cost = cost;
                nearest = Some(stop);
            }
        }

        let stop = nearest.unwrap();
        visited[stop] = true;
        order.push(stop);
        current = stop_node(stop);
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn test_greedy_follows_a_line() {
        // Start at the western end of a west-east line of stops given in
        // shuffled order; greedy selection must walk them west to east.
        let points = vec![
            Point::new(0.0, 0.0), // start
            Point::new(3.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let matrix = CostMatrix::from_points(&points);

        let order = nearest_neighbor_order(&matrix, 3);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_duplicate_stops_all_visited() {
        let points = vec![
            Point::new(0.0, 0.0), // start
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        let matrix = CostMatrix::from_points(&points);

        let mut order = nearest_neighbor_order(&matrix, 2);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1]);
    }
}
