use crate::{
    cost_matrix::CostMatrix,
    optimizer::{PathEndpoints, path_cost},
};

/// Evaluates every permutation of the free stops and returns the cheapest.
///
/// Permutations are generated in lexicographic order and only a strictly
/// lower cost replaces the incumbent, so ties resolve to the
/// lexicographically first minimal order and the result is reproducible.
pub(crate) fn exhaustive_search(
    matrix: &CostMatrix,
    endpoints: &PathEndpoints,
    stop_count: usize,
) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..stop_count).collect();
    let mut best = perm.clone();
    let mut best_cost = path_cost(matrix, endpoints, &perm);

    while next_permutation(&mut perm) {
        let cost = path_cost(matrix, endpoints, &perm);
        if cost < best_cost {
            best_cost = cost;
            best.copy_from_slice(&perm);
        }
    }

    best
}

/// Advances `items` to its lexicographic successor, returning false once the
/// last permutation has been reached.
pub(crate) fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    // Rightmost ascent.
    let Some(pivot) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        return false;
    };

    // Rightmost element larger than the pivot.
    let successor = (pivot + 1..items.len())
        .rev()
        .find(|&i| items[i] > items[pivot])
        .unwrap();

    items.swap(pivot, successor);
    items[pivot + 1..].reverse();

    true
}
