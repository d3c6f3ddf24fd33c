use std::collections::VecDeque;

use chrono::Utc;
use uuid::Uuid;

use crate::domains::path_planning::plan_path;
use crate::domains::world::{Cell, GridModel};

use super::events::MovementEvent;

/// Directional key input, mapped the way the arrow keys map on screen:
/// north decreases `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementMode {
    Idle,
    Moving,
}

/// State machine consuming a planned path one cell per tick, or a single
/// directional step while idle. Owns the local avatar's cell; every accepted
/// move mutates the grid with an atomic release-then-place pair.
#[derive(Debug)]
pub struct MovementController {
    avatar_id: Uuid,
    cell: Cell,
    mode: MovementMode,
    path: VecDeque<Cell>,
    target: Option<Cell>,
}

impl MovementController {
    pub fn new(avatar_id: Uuid, start: Cell) -> Self {
        Self {
            avatar_id,
            cell: start,
            mode: MovementMode::Idle,
            path: VecDeque::new(),
            target: None,
        }
    }

    pub fn avatar_id(&self) -> Uuid {
        self.avatar_id
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn is_moving(&self) -> bool {
        self.mode == MovementMode::Moving
    }

    pub fn target(&self) -> Option<Cell> {
        self.target
    }

    pub fn remaining_steps(&self) -> usize {
        self.path.len()
    }

    /// Click request. Silent no-op while moving, on the avatar's own cell, on
    /// an obstacle, on a cell held by another avatar, and when no route
    /// exists; otherwise plans against a snapshot and transitions to Moving.
    pub fn request_path(&mut self, target: Cell, grid: &GridModel) -> Option<MovementEvent> {
        if self.is_moving() || target == self.cell {
            return None;
        }
        if !grid.in_bounds(target) || grid.is_obstacle(target) {
            return None;
        }
        if let Some(owner) = grid.occupant(target) {
            if owner != self.avatar_id {
                return None;
            }
        }

        let path = plan_path(self.cell, target, grid.snapshot(), self.avatar_id);
        if path.is_empty() {
            return None;
        }

        let steps = path.len();
        self.path = path.into();
        self.target = Some(target);
        self.mode = MovementMode::Moving;
        Some(MovementEvent::PathStarted {
            avatar_id: self.avatar_id,
            from: self.cell,
            target,
            steps,
            timestamp: Utc::now(),
        })
    }

    /// Directional key request. Ignored while moving; otherwise the single
    /// adjacent cell is checked against the live grid and stepped onto if
    /// walkable.
    pub fn step(&mut self, direction: Direction, grid: &mut GridModel) -> Option<MovementEvent> {
        if self.is_moving() {
            return None;
        }
        let (dx, dz) = direction.offset();
        let next = Cell::new(self.cell.x + dx, self.cell.z + dz);
        if !grid.is_walkable(next, self.avatar_id) {
            return None;
        }

        let from = self.cell;
        grid.release(self.avatar_id, from);
        grid.place(self.avatar_id, next);
        self.cell = next;
        Some(MovementEvent::Stepped {
            avatar_id: self.avatar_id,
            from,
            to: next,
            timestamp: Utc::now(),
        })
    }

    /// Consumes the front cell of the active path. The path was planned
    /// against a snapshot and is not re-validated here, so a cell claimed by
    /// a peer mid-path is stepped onto anyway and contested by occupancy
    /// overwrite.
    pub fn tick(&mut self, grid: &mut GridModel) -> Option<MovementEvent> {
        if !self.is_moving() {
            return None;
        }
        let next = self.path.pop_front()?;

        let from = self.cell;
        grid.release(self.avatar_id, from);
        grid.place(self.avatar_id, next);
        self.cell = next;

        if self.path.is_empty() {
            self.mode = MovementMode::Idle;
            self.target = None;
            return Some(MovementEvent::PathCompleted {
                avatar_id: self.avatar_id,
                from,
                to: next,
                timestamp: Utc::now(),
            });
        }
        Some(MovementEvent::Stepped {
            avatar_id: self.avatar_id,
            from,
            to: next,
            timestamp: Utc::now(),
        })
    }
}
