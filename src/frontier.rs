//! Selection of the next cell to expand. A [BinaryHeap] replaces scanning every discovered cell,
//! while selecting the same cell that scan would: smallest `f`, then smallest `h`, then the
//! first cell in row-major order.
use crate::search_state::{SearchState, StateStore};
use grid_util::point::Point;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct FrontierEntry {
    f: f64,
    h: f64,
    g: f64,
    point: Point,
}

impl FrontierEntry {
    fn key(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.h.total_cmp(&other.h))
            .then_with(|| self.point.y.cmp(&other.point.y))
            .then_with(|| self.point.x.cmp(&other.point.x))
    }
}

impl Eq for FrontierEntry {}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key(other) == Ordering::Equal
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the smallest key first
        other.key(self)
    }
}

/// Open set of discovered, unevaluated cells. A cell is pushed again whenever its `g` drops;
/// outdated entries are skipped when popped.
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Frontier {
        Frontier::default()
    }

    /// Records the current state of `point`. Call after creating or relaxing its state.
    pub fn push(&mut self, point: Point, state: &SearchState) {
        self.heap.push(FrontierEntry {
            f: state.f(),
            h: state.h(),
            g: state.g(),
            point,
        });
    }

    /// Removes and returns the best unevaluated cell, or [None] once the frontier is exhausted.
    pub fn pop(&mut self, store: &StateStore) -> Option<Point> {
        while let Some(entry) = self.heap.pop() {
            match store.get(&entry.point) {
                Some(state) if !state.evaluated && state.g() == entry.g => {
                    return Some(entry.point)
                }
                _ => continue,
            }
        }
        None
    }

    /// Number of queued entries, outdated ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(cells: &[(Point, f64, f64)]) -> (StateStore, Frontier) {
        let mut store = StateStore::new();
        let mut frontier = Frontier::new();
        for &(p, g, h) in cells {
            let state = store.discover(p, SearchState::new(g, h));
            frontier.push(p, state);
        }
        (store, frontier)
    }

    #[test]
    fn orders_by_f_then_h() {
        let (store, mut frontier) = seeded(&[
            (Point::new(0, 0), 3.0, 2.0),
            (Point::new(1, 0), 1.0, 3.0),
            (Point::new(2, 0), 2.0, 1.0),
            (Point::new(3, 0), 0.5, 0.5),
        ]);
        let order: Vec<Point> = std::iter::from_fn(|| frontier.pop(&store)).collect();
        assert_eq!(
            order,
            vec![
                Point::new(3, 0),
                Point::new(2, 0),
                Point::new(1, 0),
                Point::new(0, 0)
            ]
        );
    }

    #[test]
    fn equal_f_prefers_smaller_h() {
        let (store, mut frontier) = seeded(&[
            (Point::new(0, 0), 1.0, 3.0),
            (Point::new(1, 0), 2.5, 1.5),
            (Point::new(0, 2), 3.0, 1.0),
        ]);
        assert_eq!(frontier.pop(&store), Some(Point::new(0, 2)));
        assert_eq!(frontier.pop(&store), Some(Point::new(1, 0)));
        assert_eq!(frontier.pop(&store), Some(Point::new(0, 0)));
    }

    #[test]
    fn full_ties_follow_raster_order() {
        let (store, mut frontier) = seeded(&[
            (Point::new(2, 1), 1.0, 1.0),
            (Point::new(0, 1), 1.0, 1.0),
            (Point::new(3, 0), 1.0, 1.0),
        ]);
        assert_eq!(frontier.pop(&store), Some(Point::new(3, 0)));
        assert_eq!(frontier.pop(&store), Some(Point::new(0, 1)));
        assert_eq!(frontier.pop(&store), Some(Point::new(2, 1)));
        assert_eq!(frontier.pop(&store), None);
    }

    #[test]
    fn skips_outdated_and_evaluated_entries() {
        let a = Point::new(0, 0);
        let b = Point::new(1, 0);
        let (mut store, mut frontier) = seeded(&[(a, 4.0, 1.0), (b, 2.0, 1.0)]);
        let state = store.get_mut(&a).unwrap();
        assert!(state.relax(1.0));
        let state = *state;
        frontier.push(a, &state);
        store.get_mut(&b).unwrap().evaluated = true;

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.pop(&store), Some(a));
        store.get_mut(&a).unwrap().evaluated = true;
        assert_eq!(frontier.pop(&store), None);
        assert!(frontier.is_empty());
    }
}
