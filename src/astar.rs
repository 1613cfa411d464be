//! The A* search itself. An [AstarEngine] owns all mutable state of one search: the
//! [StateStore] with a [SearchState] per discovered cell and the [Frontier] of cells still to
//! expand. The [GridMap] is only borrowed, so any number of engines can search the same map.
use crate::error::{Result, SearchError};
use crate::euclidean_distance;
use crate::frontier::Frontier;
use crate::grid_map::GridMap;
use crate::search_state::{SearchState, StateStore};
use grid_util::point::Point;
use log::{info, trace, warn};

/// Outcome of a single [AstarEngine::step].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The given cell was selected and its neighbours relaxed.
    Expanded(Point),
    /// The end cell was selected.
    Found,
    /// No unevaluated cells are left.
    Exhausted,
}

/// A route found by [AstarEngine::search].
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Cells from start to end, both inclusive.
    pub path: Vec<Point>,
    /// Final `g` of the end cell, the length of a shortest route. `path` descends greedily
    /// through the smallest `g` values and can occasionally sum to more than this, see
    /// [path_cost](crate::path_cost).
    pub cost: f64,
    /// Number of cells that were expanded.
    pub expanded: usize,
}

pub struct AstarEngine<'a> {
    map: &'a GridMap,
    store: StateStore,
    frontier: Frontier,
    expanded: usize,
    found: bool,
    /// Multiplies the Euclidean heuristic. Must be finite and non-negative. Values above 1 may
    /// expand fewer cells at the cost of optimality.
    pub heuristic_factor: f64,
    /// Answers unreachable goals from the map's connected components instead of exhausting the
    /// frontier.
    pub component_precheck: bool,
}

impl<'a> AstarEngine<'a> {
    pub fn new(map: &'a GridMap) -> AstarEngine<'a> {
        AstarEngine {
            map,
            store: StateStore::new(),
            frontier: Frontier::new(),
            expanded: 0,
            found: false,
            heuristic_factor: 1.0,
            component_precheck: true,
        }
    }

    pub fn with_heuristic_factor(mut self, heuristic_factor: f64) -> Self {
        debug_assert!(
            heuristic_factor.is_finite() && heuristic_factor >= 0.0,
            "heuristic factor must be finite and non-negative, got {heuristic_factor}"
        );
        self.heuristic_factor = heuristic_factor;
        self
    }

    pub fn with_component_precheck(mut self, component_precheck: bool) -> Self {
        self.component_precheck = component_precheck;
        self
    }

    /// Runs the search and reconstructs the route to the end cell.
    pub fn search(mut self) -> Result<Route> {
        self.run()?;
        let path = self.reconstruct()?;
        let cost = self.state(&self.map.end()).map_or(0.0, |s| s.g());
        Ok(Route {
            path,
            cost,
            expanded: self.expanded,
        })
    }

    /// Expands cells until the end cell is selected. Fails with [SearchError::PathNotFound] if the
    /// frontier runs dry first. The engine keeps its state afterwards so it can be inspected.
    pub fn run(&mut self) -> Result<()> {
        let start = self.map.start();
        let end = self.map.end();
        if self.component_precheck && !self.map.reachable(&start, &end) {
            info!("{} is not reachable from {}", end, start);
            return Err(SearchError::PathNotFound { start, end });
        }
        loop {
            match self.step()? {
                Step::Expanded(_) => {}
                Step::Found => {
                    info!(
                        "Found path from {} to {} after expanding {} cells",
                        start, end, self.expanded
                    );
                    return Ok(());
                }
                Step::Exhausted => {
                    if self.component_precheck {
                        warn!("Reachable goal could not be pathed to, are the components correct?");
                    } else {
                        info!("Frontier exhausted, {} is not reachable from {}", end, start);
                    }
                    return Err(SearchError::PathNotFound { start, end });
                }
            }
        }
    }

    /// Selects the best frontier cell and expands it, seeding the start cell on the first call.
    pub fn step(&mut self) -> Result<Step> {
        if self.found {
            return Ok(Step::Found);
        }
        if self.store.is_empty() {
            let start = self.map.start();
            let seed = SearchState::new(0.0, self.heuristic(&start));
            let seed = *self.store.discover(start, seed);
            self.frontier.push(start, &seed);
        }
        match self.frontier.pop(&self.store) {
            None => Ok(Step::Exhausted),
            Some(current) if current == self.map.end() => {
                self.found = true;
                Ok(Step::Found)
            }
            Some(current) => {
                self.expand(current)?;
                Ok(Step::Expanded(current))
            }
        }
    }

    /// Marks `current` as evaluated and relaxes its passable neighbours.
    fn expand(&mut self, current: Point) -> Result<()> {
        let current_g = {
            let state = self
                .store
                .get_mut(&current)
                .ok_or(SearchError::OutOfBounds {
                    x: current.x,
                    y: current.y,
                })?;
            state.evaluated = true;
            state.g()
        };
        self.expanded += 1;
        trace!("Expanding {} with g = {}", current, current_g);

        for (neighbour, step) in self.map.neighbours(&current) {
            let tentative_g = current_g + step;
            let updated = match self.store.get_mut(&neighbour) {
                Some(state) => {
                    if state.relax(tentative_g) {
                        Some(*state)
                    } else {
                        None
                    }
                }
                None => {
                    let h = self.heuristic(&neighbour);
                    Some(*self.store.discover(neighbour, SearchState::new(tentative_g, h)))
                }
            };
            if let Some(state) = updated {
                if !state.evaluated {
                    self.frontier.push(neighbour, &state);
                }
            }
        }
        Ok(())
    }

    /// Walks from the end cell back to the start, each time stepping to the discovered
    /// neighbour with the smallest `g`. Ties go to the first neighbour in
    /// [GridMap::neighbours] order.
    pub fn reconstruct(&self) -> Result<Vec<Point>> {
        let start = self.map.start();
        let end = self.map.end();
        if !self.found {
            return Err(SearchError::PathNotFound { start, end });
        }
        let mut path = vec![end];
        let mut cursor = end;
        while cursor != start {
            let next = self
                .map
                .neighbours(&cursor)
                .into_iter()
                .filter_map(|(p, _)| self.store.get(&p).map(|s| (p, s.g())))
                .fold(None, |best: Option<(Point, f64)>, (p, g)| match best {
                    Some((_, best_g)) if best_g <= g => best,
                    _ => Some((p, g)),
                });
            match next {
                Some((p, _)) => {
                    cursor = p;
                    path.push(p);
                }
                None => {
                    return Err(SearchError::OutOfBounds {
                        x: cursor.x,
                        y: cursor.y,
                    })
                }
            }
        }
        path.reverse();
        Ok(path)
    }

    pub fn state(&self, point: &Point) -> Option<&SearchState> {
        self.store.get(point)
    }

    /// Every discovered cell with its state.
    pub fn states(&self) -> impl Iterator<Item = (&Point, &SearchState)> {
        self.store.iter()
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    fn heuristic(&self, point: &Point) -> f64 {
        euclidean_distance(point, &self.map.end()) * self.heuristic_factor
    }
}
