pub mod cost_matrix;
pub mod optimizer;

mod exhaustive;
mod nearest_neighbor;
mod two_opt;

pub use cost_matrix::CostMatrix;
pub use optimizer::{EXACT_SEARCH_MAX, OptimizeError, OptimizedOrder, optimize};
