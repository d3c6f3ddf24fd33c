use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::domains::world::{Avatar, AvatarColor, Cell, GridModel};

use super::events::{PositionPayload, PresenceEvent};
use super::roster::Roster;

/// Reconciles joins, leaves and position broadcasts into the roster and the
/// grid, and gates outbound broadcasts on actual position change. Pure state;
/// all transport I/O stays in the application layer.
#[derive(Debug)]
pub struct PresenceSync {
    local_id: Uuid,
    roster: Roster,
    last_broadcast: Option<Cell>,
}

impl PresenceSync {
    pub fn new(local_id: Uuid) -> Self {
        Self {
            local_id,
            roster: Roster::new(),
            last_broadcast: None,
        }
    }

    pub fn local_id(&self) -> Uuid {
        self.local_id
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn local_avatar(&self) -> Option<&Avatar> {
        self.roster.get(self.local_id)
    }

    /// Self-join: claims a uniformly random free cell by rejection sampling
    /// and enters the local avatar into the roster.
    pub fn spawn_local(
        &mut self,
        display_name: &str,
        color: AvatarColor,
        grid: &mut GridModel,
        rng: &mut impl Rng,
    ) -> Avatar {
        // TODO: bound the sampling and surface a capacity error; a fully
        // saturated grid currently spins forever.
        let cell = loop {
            let candidate = Cell::new(
                rng.gen_range(0..grid.config().width),
                rng.gen_range(0..grid.config().height),
            );
            if !grid.is_obstacle(candidate) && grid.occupant(candidate).is_none() {
                break candidate;
            }
        };

        grid.place(self.local_id, cell);
        let avatar = Avatar::new(self.local_id, display_name, cell, color);
        let _ = self.roster.insert(avatar.clone());
        avatar
    }

    /// Keeps the roster's own entry aligned after a local move.
    pub fn update_local_cell(&mut self, cell: Cell) {
        let _ = self.roster.set_cell(self.local_id, cell);
    }

    /// Outbound dedup gate: yields a payload only when the local cell differs
    /// from the last value actually broadcast. Comparison is by value, so
    /// re-deriving the same coordinates never re-announces.
    pub fn position_to_announce(&self) -> Option<PositionPayload> {
        let avatar = self.roster.get(self.local_id)?;
        if self.last_broadcast == Some(avatar.cell) {
            return None;
        }
        Some(PositionPayload::from_avatar(avatar))
    }

    /// Records a successful broadcast of `cell`.
    pub fn mark_broadcast(&mut self, cell: Cell) {
        self.last_broadcast = Some(cell);
    }

    /// Reconciles a peer's position broadcast. The local id is ignored
    /// (exclude-self also holds at the transport). Remote claims are applied
    /// as-is; the last write to a cell wins.
    pub fn apply_position(
        &mut self,
        payload: &PositionPayload,
        grid: &mut GridModel,
    ) -> Option<PresenceEvent> {
        if payload.id == self.local_id {
            return None;
        }
        let cell = payload.cell();

        let previous = if self.roster.contains(payload.id) {
            let previous = self.roster.set_cell(payload.id, cell);
            if let Some(previous) = previous {
                if previous != cell {
                    grid.release(payload.id, previous);
                }
            }
            previous
        } else {
            let _ = self.roster.insert(Avatar::new(
                payload.id,
                payload.display_name.clone(),
                cell,
                payload.color,
            ));
            None
        };

        grid.place(payload.id, cell);
        Some(PresenceEvent::PeerUpserted {
            avatar_id: payload.id,
            previous,
            cell,
            timestamp: Utc::now(),
        })
    }

    /// A peer joined the room. The roster entry arrives with the newcomer's
    /// first broadcast; what joins require locally is a re-announcement of
    /// our own position, since no snapshot handshake exists.
    pub fn should_reannounce_on_join(&self, key: Uuid) -> bool {
        key != self.local_id
    }

    /// Removes a departing peer and releases its last-known cell.
    pub fn apply_leave(&mut self, key: Uuid, grid: &mut GridModel) -> Option<PresenceEvent> {
        if key == self.local_id {
            return None;
        }
        let avatar = self.roster.remove(key)?;
        grid.release(key, avatar.cell);
        Some(PresenceEvent::PeerDeparted {
            avatar_id: key,
            cell: avatar.cell,
            timestamp: Utc::now(),
        })
    }
}
