use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use uuid::Uuid;

use crate::domains::world::{Cell, GridModel};

/// Fixed 4-neighborhood expansion order; no diagonal movement.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(PartialEq, Eq)]
struct FrontierNode {
    f: u32,
    seq: u64,
    g: u32,
    cell: Cell,
}

// Min-heap on f, then on discovery order, so equal-cost nodes expand
// first-discovered-first.
impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest 4-connected route from `start` to `target`, excluding `start`.
///
/// Expects a private snapshot of the grid (`GridModel::snapshot`) so the
/// search never observes occupancy changes that arrive mid-plan. The
/// destination is made walkable inside the snapshot before searching: arrival
/// at the target is legal even where the raw occupancy rules would refuse it,
/// but intermediate cells get no such pass. Callers short-circuit the
/// same-cell, obstacle-target and occupied-target cases before planning;
/// invoked directly with those inputs the search simply yields an empty path.
///
/// When several shortest paths exist, equal-cost frontier ties break by
/// insertion order; which path is returned is unspecified but stable for a
/// given grid.
pub fn plan_path(
    start: Cell,
    target: Cell,
    mut planning_grid: GridModel,
    moving_avatar: Uuid,
) -> Vec<Cell> {
    if start == target {
        return Vec::new();
    }
    if !planning_grid.in_bounds(start)
        || !planning_grid.in_bounds(target)
        || planning_grid.is_obstacle(target)
    {
        return Vec::new();
    }

    planning_grid.vacate(target);

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut seq: u64 = 0;

    let _ = g_score.insert(start, 0);
    open.push(FrontierNode {
        f: start.manhattan_distance(&target),
        seq,
        g: 0,
        cell: start,
    });

    while let Some(FrontierNode { g, cell, .. }) = open.pop() {
        if cell == target {
            return reconstruct(&came_from, start, target);
        }
        // A popped entry whose cost improved after insertion is stale.
        if g > g_score[&cell] {
            continue;
        }

        for (dx, dz) in NEIGHBOR_OFFSETS {
            let next = Cell::new(cell.x + dx, cell.z + dz);
            if !planning_grid.is_walkable(next, moving_avatar) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&next).map_or(true, |known| tentative < *known) {
                let _ = g_score.insert(next, tentative);
                let _ = came_from.insert(next, cell);
                seq += 1;
                open.push(FrontierNode {
                    f: tentative + next.manhattan_distance(&target),
                    seq,
                    g: tentative,
                    cell: next,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, target: Cell) -> Vec<Cell> {
    let mut path = vec![target];
    let mut cursor = target;
    while let Some(previous) = came_from.get(&cursor) {
        if *previous == start {
            break;
        }
        path.push(*previous);
        cursor = *previous;
    }
    path.reverse();
    path
}
