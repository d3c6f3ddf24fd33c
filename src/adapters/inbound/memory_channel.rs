use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::{DomainError, DomainResult};
use crate::domains::presence::{
    ChannelEvent, ChannelStatus, PositionPayload, PresencePayload, RealtimeChannel,
};

/// Mailbox depth per subscriber. A subscriber that stops draining is dropped
/// like a lost connection.
const MAILBOX_CAPACITY: usize = 64;

struct HubState {
    subscribers: HashMap<Uuid, mpsc::Sender<ChannelEvent>>,
    tracked: HashSet<Uuid>,
    failing_subscribes: u32,
}

impl HubState {
    /// Delivers to every subscriber except `sender`; broadcast is
    /// exclude-self. Dead mailboxes are pruned and their departure announced,
    /// so an abnormally dropped client still surfaces a leave.
    fn broadcast_from(&mut self, sender: Uuid, event: ChannelEvent) {
        let mut dead = Vec::new();
        for (id, tx) in &self.subscribers {
            if *id == sender {
                continue;
            }
            if tx.try_send(event.clone()).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            self.drop_subscriber(id);
        }
    }

    fn drop_subscriber(&mut self, id: Uuid) {
        if self.subscribers.remove(&id).is_some() && self.tracked.remove(&id) {
            self.broadcast_from(id, ChannelEvent::PeerLeft { key: id });
        }
    }
}

/// In-process pub/sub room shared by every [`MemoryChannel`] it hands out.
/// Stands in for the realtime transport in tests and the demo binary.
pub struct MemoryHub {
    room: String,
    state: Arc<Mutex<HubState>>,
}

impl MemoryHub {
    pub fn new(room: &str) -> Self {
        Self {
            room: room.to_string(),
            state: Arc::new(Mutex::new(HubState {
                subscribers: HashMap::new(),
                tracked: HashSet::new(),
                failing_subscribes: 0,
            })),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// A channel handle for one client. All handles share the hub's room.
    pub fn channel(&self, client_id: Uuid) -> MemoryChannel {
        MemoryChannel {
            client_id,
            state: Arc::clone(&self.state),
        }
    }

    /// Fault hook: refuse the next `n` subscribe calls, for exercising the
    /// bounded-retry path.
    pub fn fail_next_subscribes(&self, n: u32) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_subscribes = n;
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().map(|s| s.subscribers.len()).unwrap_or(0)
    }
}

pub struct MemoryChannel {
    client_id: Uuid,
    state: Arc<Mutex<HubState>>,
}

impl MemoryChannel {
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, HubState>> {
        self.state
            .lock()
            .map_err(|_| DomainError::InfrastructureError("hub state poisoned".to_string()))
    }
}

#[async_trait]
impl RealtimeChannel for MemoryChannel {
    async fn subscribe(&self) -> DomainResult<mpsc::Receiver<ChannelEvent>> {
        let mut state = self.lock()?;
        if state.failing_subscribes > 0 {
            state.failing_subscribes -= 1;
            return Err(DomainError::ChannelError(
                "subscribe refused by hub".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let _ = tx.try_send(ChannelEvent::Status(ChannelStatus::Subscribed));
        let _ = state.subscribers.insert(self.client_id, tx);
        Ok(rx)
    }

    async fn send(&self, payload: &PositionPayload) -> DomainResult<()> {
        let mut state = self.lock()?;
        if !state.subscribers.contains_key(&self.client_id) {
            return Err(DomainError::ChannelError("not subscribed".to_string()));
        }
        state.broadcast_from(self.client_id, ChannelEvent::Position(payload.clone()));
        Ok(())
    }

    async fn track(&self, _presence: &PresencePayload) -> DomainResult<()> {
        let mut state = self.lock()?;
        if !state.subscribers.contains_key(&self.client_id) {
            return Err(DomainError::ChannelError("not subscribed".to_string()));
        }
        // The first track announces the join and answers with the room state;
        // later tracks refresh presence data the hub does not store.
        if state.tracked.insert(self.client_id) {
            state.broadcast_from(
                self.client_id,
                ChannelEvent::PeerJoined {
                    key: self.client_id,
                },
            );
            let keys: Vec<Uuid> = state.tracked.iter().copied().collect();
            if let Some(tx) = state.subscribers.get(&self.client_id) {
                let _ = tx.try_send(ChannelEvent::PresenceState { keys });
            }
        }
        Ok(())
    }

    async fn unsubscribe(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.drop_subscriber(self.client_id);
        }
    }
}
