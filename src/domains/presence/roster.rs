use std::collections::HashMap;

use uuid::Uuid;

use crate::domains::world::{Avatar, Cell};

/// Known avatars (self + peers), each with its last-known cell.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    avatars: HashMap<Uuid, Avatar>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces, returning the previous entry for the id.
    pub fn insert(&mut self, avatar: Avatar) -> Option<Avatar> {
        self.avatars.insert(avatar.id, avatar)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Avatar> {
        self.avatars.remove(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Avatar> {
        self.avatars.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.avatars.contains_key(&id)
    }

    /// Moves an avatar's last-known cell, returning the previous one.
    pub fn set_cell(&mut self, id: Uuid, cell: Cell) -> Option<Cell> {
        let avatar = self.avatars.get_mut(&id)?;
        let previous = avatar.cell;
        avatar.cell = cell;
        Some(previous)
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Avatar> {
        self.avatars.values()
    }
}
