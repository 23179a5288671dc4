// A* pathfinding over the unbounded integer grid.
//
// Standard A* using a `BinaryHeap` (min-heap via reversed ordering). Movement
// is 8-connected with unit cost per step (diagonals are not penalized), and
// the heuristic is Chebyshev distance, which is exact on an empty grid and
// never overestimates, so returned paths have the minimum number of steps.
//
// The grid has no edges, so an unreachable goal would keep the open set
// growing forever. Every search therefore carries a node budget: once that
// many cells have been expanded the search gives up and reports "no path".
//
// Paths are returned *excluding* the start and *including* the goal, in
// traversal order. An empty vec means "no path" (or start == goal); it is a
// normal result, not an error.
//
// See also: `map.rs` which plans move queues with footprint-aware
// passability, `config.rs` for `MapConfig::max_search_nodes`.
//
// **Critical constraint: determinism.** Open-set ties are broken on larger
// g, then on coordinate order, so the same inputs always yield the same path.
// The scratch tables are hash maps, but they are only probed, never iterated.

use crate::types::Coordinate;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

/// Node budget used when the caller does not supply one.
pub const DEFAULT_MAX_SEARCH_NODES: usize = 4096;

/// Entry in the A* open set (min-heap via reversed ordering).
#[derive(PartialEq, Eq)]
struct OpenEntry {
    coordinate: Coordinate,
    f_score: u32,
    g_score: u32,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f is "greatest". Among equal f,
        // prefer the entry closer to the goal (larger g).
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| other.coordinate.cmp(&self.coordinate))
    }
}

/// Find a shortest path from `start` to `goal`.
///
/// `passable` decides whether a cell may be entered; the start cell is never
/// asked. At most `max_nodes` cells are expanded.
pub fn astar(
    start: Coordinate,
    goal: Coordinate,
    passable: impl Fn(Coordinate) -> bool,
    max_nodes: usize,
) -> Vec<Coordinate> {
    if start == goal || !passable(goal) {
        return Vec::new();
    }

    let mut g_score: FxHashMap<Coordinate, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<Coordinate, Coordinate> = FxHashMap::default();
    let mut closed: FxHashSet<Coordinate> = FxHashSet::default();

    g_score.insert(start, 0);
    let mut open = BinaryHeap::new();
    open.push(OpenEntry {
        coordinate: start,
        f_score: start.chebyshev_distance(goal),
        g_score: 0,
    });

    while let Some(current) = open.pop() {
        if current.coordinate == goal {
            return reconstruct_path(&came_from, start, goal);
        }
        if !closed.insert(current.coordinate) {
            continue;
        }
        if closed.len() > max_nodes {
            break;
        }

        let tentative_g = current.g_score + 1;
        for neighbor in current.coordinate.neighbors() {
            if closed.contains(&neighbor) || !passable(neighbor) {
                continue;
            }
            if g_score.get(&neighbor).is_some_and(|&g| g <= tentative_g) {
                continue;
            }
            g_score.insert(neighbor, tentative_g);
            came_from.insert(neighbor, current.coordinate);
            open.push(OpenEntry {
                coordinate: neighbor,
                f_score: tentative_g.saturating_add(neighbor.chebyshev_distance(goal)),
                g_score: tentative_g,
            });
        }
    }

    Vec::new() // No path found (or budget exhausted).
}

/// Point search around a plain set of blocked cells, with the default
/// node budget.
pub fn astar_search(
    start: Coordinate,
    goal: Coordinate,
    blocked: &BTreeSet<Coordinate>,
) -> Vec<Coordinate> {
    astar(start, goal, |c| !blocked.contains(&c), DEFAULT_MAX_SEARCH_NODES)
}

/// Walk `came_from` back from the goal. The start is not included.
fn reconstruct_path(
    came_from: &FxHashMap<Coordinate, Coordinate>,
    start: Coordinate,
    goal: Coordinate,
) -> Vec<Coordinate> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        if previous == start {
            break;
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
