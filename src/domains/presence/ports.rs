use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::DomainResult;

use super::events::{PositionPayload, PresencePayload};

/// Connection states reported by the realtime transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Subscribed,
    TimedOut,
    Closed,
    ChannelError,
}

/// Everything a subscribed client can observe on the room channel.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Status(ChannelStatus),
    /// A peer's "position" broadcast.
    Position(PositionPayload),
    PeerJoined { key: Uuid },
    PeerLeft { key: Uuid },
    /// Full presence state, delivered after our own presence is tracked.
    PresenceState { keys: Vec<Uuid> },
}

/// Port for the shared-room realtime transport (Hexagonal port).
/// Implementations (adapters) provide the actual pub/sub plumbing; the
/// in-process hub adapter backs tests and the demo binary.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Opens the subscription. Events, including the initial status, arrive
    /// on the returned receiver.
    async fn subscribe(&self) -> DomainResult<mpsc::Receiver<ChannelEvent>>;

    /// Fire-and-forget broadcast to every other subscriber of the room.
    async fn send(&self, payload: &PositionPayload) -> DomainResult<()>;

    /// Announces or updates this client's presence data.
    async fn track(&self, presence: &PresencePayload) -> DomainResult<()>;

    /// Releases the subscription. Idempotent.
    async fn unsubscribe(&self);
}

/// Client-local storage for the persisted display name.
pub trait ProfileStore: Send + Sync {
    fn load_display_name(&self) -> DomainResult<Option<String>>;
    fn save_display_name(&self, name: &str) -> DomainResult<()>;
}
