use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexMap;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Per-cell bookkeeping of a search. Created when a cell is first discovered and only ever
/// relaxed afterwards, so `g` never increases and `f` always equals `g + h`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchState {
    g: f64,
    h: f64,
    f: f64,
    pub evaluated: bool,
}

impl SearchState {
    pub fn new(g: f64, h: f64) -> SearchState {
        SearchState {
            g,
            h,
            f: g + h,
            evaluated: false,
        }
    }

    /// Best known cost from the start.
    pub fn g(&self) -> f64 {
        self.g
    }

    /// Heuristic estimate of the remaining cost, fixed at creation.
    pub fn h(&self) -> f64 {
        self.h
    }

    /// `g + h`.
    pub fn f(&self) -> f64 {
        self.f
    }

    /// Lowers `g` to `g` if it is strictly cheaper. Returns whether anything changed.
    pub fn relax(&mut self, g: f64) -> bool {
        if g < self.g {
            self.g = g;
            self.f = g + self.h;
            true
        } else {
            false
        }
    }
}

/// Sparse storage of [SearchState]s keyed by cell. Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    states: FxIndexMap<Point, SearchState>,
}

impl StateStore {
    pub fn new() -> StateStore {
        StateStore::default()
    }

    pub fn get(&self, point: &Point) -> Option<&SearchState> {
        self.states.get(point)
    }

    pub fn get_mut(&mut self, point: &Point) -> Option<&mut SearchState> {
        self.states.get_mut(point)
    }

    /// Creates the state of a newly discovered cell. A cell that already has a state keeps it.
    pub fn discover(&mut self, point: Point, state: SearchState) -> &mut SearchState {
        self.states.entry(point).or_insert(state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All discovered cells with their state, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &SearchState)> {
        self.states.iter()
    }
}
