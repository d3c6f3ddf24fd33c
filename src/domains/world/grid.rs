use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer grid coordinate. `x` runs across columns, `z` across rows; the
/// vertical axis belongs to the rendering layer and never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Center of the cell in world space; avatars stand at cell centers.
    pub fn to_world(&self) -> WorldPosition {
        WorldPosition {
            x: self.x as f64 + 0.5,
            y: 0.5,
            z: self.z as f64 + 0.5,
        }
    }

    pub fn from_world(position: &WorldPosition) -> Self {
        Self {
            x: position.x.floor() as i32,
            z: position.z.floor() as i32,
        }
    }

    pub fn manhattan_distance(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// World-space position as carried on the wire and consumed by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Static world geometry, fixed at creation and never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub obstacles: HashSet<Cell>,
}

impl GridConfig {
    pub fn new(width: i32, height: i32, obstacles: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            width,
            height,
            obstacles: obstacles.into_iter().collect(),
        }
    }
}

/// Single source of truth for "can avatar A occupy cell C right now".
///
/// Static obstacles come from [`GridConfig`]; dynamic occupancy maps each held
/// cell to the avatar holding it. All mutators are infallible: invalid
/// operations are silent no-ops, never errors.
#[derive(Debug, Clone)]
pub struct GridModel {
    config: GridConfig,
    occupancy: HashMap<Cell, Uuid>,
}

impl GridModel {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            occupancy: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.config.width && cell.z >= 0 && cell.z < self.config.height
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.config.obstacles.contains(&cell)
    }

    /// False when out of bounds, an obstacle, or held by a different avatar.
    pub fn is_walkable(&self, cell: Cell, asking: Uuid) -> bool {
        if !self.in_bounds(cell) || self.is_obstacle(cell) {
            return false;
        }
        match self.occupancy.get(&cell) {
            Some(owner) => *owner == asking,
            None => true,
        }
    }

    /// Claims `cell` for `avatar`, overwriting any previous claim of the cell.
    ///
    /// The local movement path checks `is_walkable` before calling; the
    /// presence reconciler applies remote claims as-is, so the last `place`
    /// executed wins a contested cell.
    pub fn place(&mut self, avatar: Uuid, cell: Cell) {
        let _ = self.occupancy.insert(cell, avatar);
    }

    /// Removes the occupancy entry for `cell` iff `avatar` holds it. Obstacle
    /// cells are never released; they were never owned by an avatar.
    pub fn release(&mut self, avatar: Uuid, cell: Cell) {
        if self.is_obstacle(cell) {
            return;
        }
        if self.occupancy.get(&cell) == Some(&avatar) {
            let _ = self.occupancy.remove(&cell);
        }
    }

    /// Drops any occupancy claim on `cell` regardless of owner. Used by the
    /// planner on its private snapshot to make the destination reachable.
    pub fn vacate(&mut self, cell: Cell) {
        let _ = self.occupancy.remove(&cell);
    }

    pub fn occupant(&self, cell: Cell) -> Option<Uuid> {
        self.occupancy.get(&cell).copied()
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = (Cell, Uuid)> + '_ {
        self.occupancy.iter().map(|(cell, id)| (*cell, *id))
    }

    /// Deep copy for the planner, so a search in progress never observes
    /// occupancy changes arriving from peers between suspension points.
    pub fn snapshot(&self) -> GridModel {
        self.clone()
    }
}
