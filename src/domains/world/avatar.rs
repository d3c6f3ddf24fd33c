use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::grid::Cell;

/// Render color assigned to an avatar. Carried on the wire so every client
/// draws a peer the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarColor {
    Blue,
    Red,
    Green,
    Orange,
    Purple,
}

impl AvatarColor {
    pub fn hex(&self) -> &'static str {
        match self {
            AvatarColor::Blue => "#3498db",
            AvatarColor::Red => "#e74c3c",
            AvatarColor::Green => "#2ecc71",
            AvatarColor::Orange => "#e67e22",
            AvatarColor::Purple => "#9b59b6",
        }
    }
}

impl Default for AvatarColor {
    fn default() -> Self {
        AvatarColor::Blue
    }
}

/// A user's represented entity, local or remote. Remote avatars carry only
/// their last-known cell; movement state exists for the local avatar alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub id: Uuid,
    pub display_name: String,
    pub cell: Cell,
    pub color: AvatarColor,
}

impl Avatar {
    pub fn new(id: Uuid, display_name: impl Into<String>, cell: Cell, color: AvatarColor) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            cell,
            color,
        }
    }
}
