//! Error types returned by map construction and search.

use grid_util::point::Point;
use thiserror::Error;

/// Everything that can go wrong while building a [GridMap](crate::grid_map::GridMap) or searching it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Missing or duplicated Start/End markers, an empty or non-square grid, or an unknown glyph.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// A coordinate outside `[0, N) x [0, N)` was queried.
    #[error("coordinate ({x}, {y}) is out of bounds")]
    OutOfBounds { x: i32, y: i32 },

    /// The end cell cannot be reached from the start cell.
    #[error("no path from {start} to {end}")]
    PathNotFound { start: Point, end: Point },
}

pub type Result<T> = std::result::Result<T, SearchError>;
