use geo::{Distance, Haversine};

/// Pairwise great-circle costs between waypoints, stored as a flat vector.
///
/// The matrix is a cheap ordering proxy only; authoritative distances and
/// durations come from the directions provider after the order is fixed.
pub struct CostMatrix {
    costs: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    pub fn from_points(points: &[geo_types::Point]) -> Self {
        let size = points.len();
        let haversine = Haversine;

        let mut costs = vec![0.0; size * size];
        for (i, from) in points.iter().enumerate() {
            for (j, to) in points.iter().enumerate() {
                if i != j {
                    costs[i * size + j] = haversine.distance(*from, *to);
                }
            }
        }

        Self { costs, size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.size + to]
    }
}
