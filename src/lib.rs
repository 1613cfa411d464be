//! # grid_astar
//!
//! Shortest routes on square grids using
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with a
//! [Euclidean](https://en.wikipedia.org/wiki/Euclidean_distance) straight-line heuristic.
//! Movement is 8-directional: straight moves cost 1 and diagonal moves cost √2.
//!
//! A [GridMap] classifies every cell as free, wall, start or end. [find_path] searches it and
//! returns the route from start to end, both inclusive.
//!
//! ```
//! use grid_astar::{find_path, GridMap};
//!
//! let map: GridMap = "S..\n...\n..E".parse().unwrap();
//! let path = find_path(&map).unwrap();
//! assert_eq!(path.len(), 3);
//! ```
pub mod astar;
pub mod error;
pub mod frontier;
pub mod grid_map;
pub mod search_state;

pub use crate::astar::{AstarEngine, Route, Step};
pub use crate::error::{Result, SearchError};
pub use crate::grid_map::{CellKind, GridMap};
pub use crate::search_state::SearchState;

use grid_util::point::Point;
use itertools::Itertools;

/// Cost of a horizontal or vertical move.
pub const STRAIGHT_COST: f64 = 1.0;
/// Cost of a diagonal move.
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;
/// Upper bound on the number of neighbours of a cell, used to size [smallvec::SmallVec]s.
pub const N_SMALLVEC_SIZE: usize = 8;

/// Straight-line distance between two cells.
pub fn euclidean_distance(a: &Point, b: &Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// Cost of moving between two adjacent cells: [DIAGONAL_COST] if both coordinates change,
/// [STRAIGHT_COST] otherwise.
pub fn step_cost(a: &Point, b: &Point) -> f64 {
    if a.x != b.x && a.y != b.y {
        DIAGONAL_COST
    } else {
        STRAIGHT_COST
    }
}

/// Sums the step costs along a path. Consecutive points are assumed to be adjacent.
pub fn path_cost(path: &[Point]) -> f64 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| step_cost(a, b))
        .sum()
}

/// Computes the shortest route from the start to the end of `map`, both inclusive.
///
/// Fails with [SearchError::PathNotFound] if the end cannot be reached. Each call runs on fresh
/// search state, so repeated calls are independent.
pub fn find_path(map: &GridMap) -> Result<Vec<Point>> {
    AstarEngine::new(map).search().map(|route| route.path)
}
