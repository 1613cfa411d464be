use crate::error::{Result, SearchError};
use crate::{step_cost, N_SMALLVEC_SIZE};
use core::fmt;
use grid_util::grid::Grid;
use grid_util::point::Point;
use grid_util::BoolGrid;
use itertools::iproduct;
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use std::str::FromStr;

/// Pixel colour marking the start cell in RGB map images.
pub const START_RGB: u32 = 0xff0000;
/// Pixel colour marking the end cell in RGB map images.
pub const END_RGB: u32 = 0x0000ff;
/// Pixel colour marking a wall in RGB map images.
pub const WALL_RGB: u32 = 0xff00ff;

/// Classification of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free,
    Wall,
    Start,
    End,
}

impl CellKind {
    /// Parses a map glyph: `.` or space is free, `#` or `X` a wall, `S` the start and `E` the end.
    pub fn from_glyph(glyph: char) -> Option<CellKind> {
        match glyph {
            '.' | ' ' => Some(CellKind::Free),
            '#' | 'X' => Some(CellKind::Wall),
            'S' => Some(CellKind::Start),
            'E' => Some(CellKind::End),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            CellKind::Free => '.',
            CellKind::Wall => '#',
            CellKind::Start => 'S',
            CellKind::End => 'E',
        }
    }

    /// Classifies a packed `0xRRGGBB` colour. Colours other than the three markers are free.
    pub fn from_rgb(rgb: u32) -> CellKind {
        match rgb & 0xffffff {
            START_RGB => CellKind::Start,
            END_RGB => CellKind::End,
            WALL_RGB => CellKind::Wall,
            _ => CellKind::Free,
        }
    }
}

/// Immutable N×N map with exactly one start and one end cell. Walls are kept in a [BoolGrid]
/// ([true] is blocked) and connected components of the passable cells are pre-computed in a
/// [UnionFind] so reachability can be answered without searching.
#[derive(Clone, Debug)]
pub struct GridMap {
    size: usize,
    walls: BoolGrid,
    start: Point,
    end: Point,
    components: UnionFind<usize>,
}

impl GridMap {
    /// Builds a map from `size * size` cells in row-major order.
    pub fn from_cells(size: usize, cells: Vec<CellKind>) -> Result<GridMap> {
        if size == 0 {
            return Err(SearchError::InvalidMap("grid is empty".to_owned()));
        }
        // Coordinates are i32, so every index has to fit
        let n_cells = match size.checked_mul(size) {
            Some(n_cells) if size <= i32::MAX as usize => n_cells,
            _ => {
                return Err(SearchError::InvalidMap(format!(
                    "a {size}x{size} grid is too large"
                )))
            }
        };
        if cells.len() != n_cells {
            return Err(SearchError::InvalidMap(format!(
                "expected {n_cells} cells for a {size}x{size} grid, got {}",
                cells.len()
            )));
        }
        let mut walls = BoolGrid::new(size, size, false);
        let mut starts: Vec<Point> = Vec::new();
        let mut ends: Vec<Point> = Vec::new();
        for (ix, kind) in cells.into_iter().enumerate() {
            let point = Point::new((ix % size) as i32, (ix / size) as i32);
            match kind {
                CellKind::Wall => walls.set(point.x as usize, point.y as usize, true),
                CellKind::Start => starts.push(point),
                CellKind::End => ends.push(point),
                CellKind::Free => {}
            }
        }
        let start = unique_marker("start", &starts)?;
        let end = unique_marker("end", &ends)?;
        let mut map = GridMap {
            size,
            walls,
            start,
            end,
            components: UnionFind::new(n_cells),
        };
        map.generate_components();
        debug!(
            "Built {size}x{size} map with start {} and end {}",
            map.start, map.end
        );
        Ok(map)
    }

    /// Builds a map from rows of cells. Every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<GridMap> {
        let size = rows.len();
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(SearchError::InvalidMap(format!(
                "row {y} has {} cells but the grid has {size} rows",
                row.len()
            )));
        }
        GridMap::from_cells(size, rows.into_iter().flatten().collect())
    }

    /// Builds a map from rows of packed `0xRRGGBB` pixels, see [CellKind::from_rgb].
    pub fn from_rgb_rows(rows: &[Vec<u32>]) -> Result<GridMap> {
        GridMap::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&rgb| CellKind::from_rgb(rgb)).collect())
                .collect(),
        )
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn in_bounds(&self, point: &Point) -> bool {
        let n = self.size as i32;
        point.x >= 0 && point.y >= 0 && point.x < n && point.y < n
    }

    /// In bounds and not a wall.
    pub fn is_passable(&self, point: &Point) -> bool {
        self.in_bounds(point) && !self.walls.get(point.x as usize, point.y as usize)
    }

    pub fn cell_kind(&self, x: i32, y: i32) -> Result<CellKind> {
        let point = Point::new(x, y);
        if !self.in_bounds(&point) {
            return Err(SearchError::OutOfBounds { x, y });
        }
        Ok(if point == self.start {
            CellKind::Start
        } else if point == self.end {
            CellKind::End
        } else if self.walls.get(x as usize, y as usize) {
            CellKind::Wall
        } else {
            CellKind::Free
        })
    }

    pub fn is_wall(&self, x: i32, y: i32) -> Result<bool> {
        self.cell_kind(x, y).map(|kind| kind == CellKind::Wall)
    }

    /// The passable neighbours of `point` with the cost of stepping onto them. Neighbours are
    /// enumerated row by row from `(-1, -1)` to `(1, 1)`, which is the order tie-breaks rely on.
    pub fn neighbours(&self, point: &Point) -> SmallVec<[(Point, f64); N_SMALLVEC_SIZE]> {
        iproduct!(-1..=1, -1..=1)
            .filter(|&(dy, dx)| dy != 0 || dx != 0)
            .map(|(dy, dx)| Point::new(point.x + dx, point.y + dy))
            .filter(|p| self.is_passable(p))
            .map(|p| (p, step_cost(point, &p)))
            .collect()
    }

    /// Checks whether `a` and `b` are passable and on the same connected component.
    pub fn reachable(&self, a: &Point, b: &Point) -> bool {
        self.is_passable(a)
            && self.is_passable(b)
            && self.components.equiv(self.get_ix(a), self.get_ix(b))
    }

    /// Renders the map with the cells of `path` drawn as `O`. Start and end keep their glyphs.
    pub fn display_with_path<'a>(&'a self, path: &'a [Point]) -> PathOverlay<'a> {
        PathOverlay { map: self, path }
    }

    fn get_ix(&self, point: &Point) -> usize {
        point.y as usize * self.size + point.x as usize
    }

    /// Links up every passable cell with its passable 8-neighbours. Only the neighbours further
    /// along in raster order are visited since union is symmetric.
    fn generate_components(&mut self) {
        let n = self.size as i32;
        for y in 0..n {
            for x in 0..n {
                let point = Point::new(x, y);
                if !self.is_passable(&point) {
                    continue;
                }
                let parent_ix = self.get_ix(&point);
                let forward = [
                    Point::new(x + 1, y),
                    Point::new(x - 1, y + 1),
                    Point::new(x, y + 1),
                    Point::new(x + 1, y + 1),
                ];
                for p in forward {
                    if self.is_passable(&p) {
                        let ix = self.get_ix(&p);
                        self.components.union(parent_ix, ix);
                    }
                }
            }
        }
    }

    fn fmt_cells(&self, f: &mut fmt::Formatter, path: &[Point]) -> fmt::Result {
        let n = self.size as i32;
        for y in 0..n {
            let row = (0..n)
                .map(|x| {
                    let point = Point::new(x, y);
                    let kind = self.cell_kind(x, y).unwrap_or(CellKind::Wall);
                    if kind == CellKind::Free && path.contains(&point) {
                        'O'
                    } else {
                        kind.glyph()
                    }
                })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

fn unique_marker(name: &str, found: &[Point]) -> Result<Point> {
    match found {
        [point] => Ok(*point),
        [] => Err(SearchError::InvalidMap(format!("no {name} cell"))),
        _ => Err(SearchError::InvalidMap(format!(
            "{} {name} cells, expected exactly one",
            found.len()
        ))),
    }
}

impl FromStr for GridMap {
    type Err = SearchError;

    /// Parses one row per line using the glyphs of [CellKind::from_glyph]. Trailing empty lines
    /// are ignored; lines of spaces are rows of free cells.
    fn from_str(s: &str) -> Result<GridMap> {
        let mut lines: Vec<&str> = s.lines().collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        let rows = lines
            .iter()
            .enumerate()
            .map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .map(|(x, glyph)| {
                        CellKind::from_glyph(glyph).ok_or_else(|| {
                            SearchError::InvalidMap(format!(
                                "unknown glyph {glyph:?} at ({x}, {y})"
                            ))
                        })
                    })
                    .collect::<Result<Vec<CellKind>>>()
            })
            .collect::<Result<Vec<Vec<CellKind>>>>()?;
        GridMap::from_rows(rows)
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_cells(f, &[])
    }
}

/// [fmt::Display] adapter returned by [GridMap::display_with_path].
pub struct PathOverlay<'a> {
    map: &'a GridMap,
    path: &'a [Point],
}

impl fmt::Display for PathOverlay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.map.fmt_cells(f, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_map() {
        let map: GridMap = "S.#\n.#.\n..E\n".parse().unwrap();
        assert_eq!(map.size(), 3);
        assert_eq!(map.start(), Point::new(0, 0));
        assert_eq!(map.end(), Point::new(2, 2));
        assert_eq!(map.cell_kind(2, 0), Ok(CellKind::Wall));
        assert_eq!(map.cell_kind(1, 1), Ok(CellKind::Wall));
        assert_eq!(map.cell_kind(1, 0), Ok(CellKind::Free));
        assert_eq!(map.is_wall(0, 0), Ok(false));
        assert_eq!(map.to_string(), "S.#\n.#.\n..E\n");
    }

    #[test]
    fn out_of_bounds_queries_fail() {
        let map: GridMap = "SE\n..".parse().unwrap();
        assert_eq!(
            map.cell_kind(2, 0),
            Err(SearchError::OutOfBounds { x: 2, y: 0 })
        );
        assert_eq!(
            map.is_wall(0, -1),
            Err(SearchError::OutOfBounds { x: 0, y: -1 })
        );
    }

    #[test]
    fn rejects_invalid_maps() {
        let cases = [
            "SS.\n...\n..E",
            "S..\n...\n...",
            "...\n...\n..E",
            "S.E\n..E\n...",
            "S..\n..\n..E",
            "S..\n...",
            "S.?\n...\n..E",
            "",
        ];
        for case in cases {
            let parsed = case.parse::<GridMap>();
            assert!(
                matches!(parsed, Err(SearchError::InvalidMap(_))),
                "{case:?} should be rejected, got {parsed:?}"
            );
        }
    }

    #[test]
    fn from_cells_checks_length() {
        let cells = vec![CellKind::Start, CellKind::End, CellKind::Free];
        assert!(matches!(
            GridMap::from_cells(2, cells),
            Err(SearchError::InvalidMap(_))
        ));
        assert!(matches!(
            GridMap::from_cells(0, vec![]),
            Err(SearchError::InvalidMap(_))
        ));
    }

    #[test]
    fn space_rows_are_free_cells() {
        let map: GridMap = "S E\n   \n   ".parse().unwrap();
        assert_eq!(map.size(), 3);
        assert_eq!(map.start(), Point::new(0, 0));
        assert_eq!(map.end(), Point::new(2, 0));
        assert_eq!(map.cell_kind(1, 2), Ok(CellKind::Free));
        assert_eq!(map.to_string(), "S.E\n...\n...\n");

        let trailing: GridMap = "S.E\n...\n   \n\n".parse().unwrap();
        assert_eq!(trailing.size(), 3);
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let cells = vec![CellKind::Start, CellKind::End];
        assert!(matches!(
            GridMap::from_cells(1 << 33, cells.clone()),
            Err(SearchError::InvalidMap(_))
        ));
        assert!(matches!(
            GridMap::from_cells(usize::MAX, cells),
            Err(SearchError::InvalidMap(_))
        ));
    }

    #[test]
    fn classifies_pixels() {
        let rows = vec![
            vec![START_RGB, 0xffffff, WALL_RGB],
            vec![0xffffff, WALL_RGB, 0x123456],
            vec![0xffffff, 0xffffff, END_RGB],
        ];
        let map = GridMap::from_rgb_rows(&rows).unwrap();
        assert_eq!(map.to_string(), "S.#\n.#.\n..E\n");
    }

    #[test]
    fn neighbour_order_and_costs() {
        let map: GridMap = "S..\n.#.\n..E".parse().unwrap();
        let neighbours = map.neighbours(&Point::new(1, 0));
        let points: Vec<Point> = neighbours.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            points,
            vec![Point::new(0, 0), Point::new(2, 0), Point::new(0, 1), Point::new(2, 1)]
        );
        let costs: Vec<f64> = neighbours.iter().map(|(_, c)| *c).collect();
        assert_eq!(costs, vec![1.0, 1.0, crate::DIAGONAL_COST, crate::DIAGONAL_COST]);
        assert_eq!(map.neighbours(&Point::new(1, 1)).len(), 8);
    }

    /// Tests whether cells are mapped to the right connected components, including diagonal links.
    #[test]
    fn component_generation() {
        // |S#.|
        // |#..|
        // |##E|
        let map: GridMap = "S#.\n#..\n##E".parse().unwrap();
        assert!(map.reachable(&Point::new(0, 0), &Point::new(2, 2)));
        assert!(map.reachable(&Point::new(2, 0), &Point::new(1, 1)));
        assert!(!map.reachable(&Point::new(0, 0), &Point::new(1, 0)));

        let closed: GridMap = "S.#.\n..#.\n###.\n...E".parse().unwrap();
        assert!(!closed.reachable(&closed.start(), &closed.end()));
        assert!(closed.reachable(&Point::new(3, 0), &closed.end()));
    }

    #[test]
    fn overlay_marks_free_path_cells() {
        let map: GridMap = "S..\n...\n..E".parse().unwrap();
        let path = vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)];
        assert_eq!(
            map.display_with_path(&path).to_string(),
            "S..\n.O.\n..E\n"
        );
    }
}
