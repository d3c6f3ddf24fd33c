use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::DomainEvent;
use crate::domains::world::{Avatar, AvatarColor, Cell, WorldPosition};

/// Payload of the "position" broadcast, the only broadcast the room carries.
/// Field names match the JSON the web clients exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPayload {
    pub id: Uuid,
    pub display_name: String,
    pub position: WorldPosition,
    pub color: AvatarColor,
}

impl PositionPayload {
    pub fn from_avatar(avatar: &Avatar) -> Self {
        Self {
            id: avatar.id,
            display_name: avatar.display_name.clone(),
            position: avatar.cell.to_world(),
            color: avatar.color,
        }
    }

    /// The grid cell this position resolves to.
    pub fn cell(&self) -> Cell {
        Cell::from_world(&self.position)
    }
}

/// Presence data announced via `track`, visible to the room in the presence
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub display_name: String,
    pub position: WorldPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PresenceEvent {
    /// A peer broadcast was reconciled: inserted when `previous` is None,
    /// moved otherwise.
    PeerUpserted {
        avatar_id: Uuid,
        previous: Option<Cell>,
        cell: Cell,
        timestamp: DateTime<Utc>,
    },
    PeerDeparted {
        avatar_id: Uuid,
        cell: Cell,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for PresenceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PresenceEvent::PeerUpserted { .. } => "PeerUpserted",
            PresenceEvent::PeerDeparted { .. } => "PeerDeparted",
        }
    }

    fn avatar_id(&self) -> Uuid {
        match self {
            PresenceEvent::PeerUpserted { avatar_id, .. } => *avatar_id,
            PresenceEvent::PeerDeparted { avatar_id, .. } => *avatar_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PresenceEvent::PeerUpserted { timestamp, .. } => *timestamp,
            PresenceEvent::PeerDeparted { timestamp, .. } => *timestamp,
        }
    }
}
