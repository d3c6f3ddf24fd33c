use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::DomainEvent;
use crate::domains::world::Cell;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MovementEvent {
    PathStarted {
        avatar_id: Uuid,
        from: Cell,
        target: Cell,
        steps: usize,
        timestamp: DateTime<Utc>,
    },
    Stepped {
        avatar_id: Uuid,
        from: Cell,
        to: Cell,
        timestamp: DateTime<Utc>,
    },
    /// The final step of a planned path; `to` is the clicked target.
    PathCompleted {
        avatar_id: Uuid,
        from: Cell,
        to: Cell,
        timestamp: DateTime<Utc>,
    },
}

impl MovementEvent {
    /// The cell the local avatar stands on after this event, if it moved.
    pub fn arrived_at(&self) -> Option<Cell> {
        match self {
            MovementEvent::PathStarted { .. } => None,
            MovementEvent::Stepped { to, .. } => Some(*to),
            MovementEvent::PathCompleted { to, .. } => Some(*to),
        }
    }
}

impl DomainEvent for MovementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MovementEvent::PathStarted { .. } => "PathStarted",
            MovementEvent::Stepped { .. } => "Stepped",
            MovementEvent::PathCompleted { .. } => "PathCompleted",
        }
    }

    fn avatar_id(&self) -> Uuid {
        match self {
            MovementEvent::PathStarted { avatar_id, .. } => *avatar_id,
            MovementEvent::Stepped { avatar_id, .. } => *avatar_id,
            MovementEvent::PathCompleted { avatar_id, .. } => *avatar_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MovementEvent::PathStarted { timestamp, .. } => *timestamp,
            MovementEvent::Stepped { timestamp, .. } => *timestamp,
            MovementEvent::PathCompleted { timestamp, .. } => *timestamp,
        }
    }
}
