use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;

use crate::common::DomainEvent;
use crate::config::Config;
use crate::domains::logger::DynLogger;
use crate::domains::movement::{Direction, MovementController, MovementEvent};
use crate::domains::presence::{
    ChannelEvent, ChannelStatus, PositionPayload, PresencePayload, PresenceSync, RealtimeChannel,
    Roster,
};
use crate::domains::world::{AvatarColor, Cell, GridModel};

pub enum SessionCommand {
    Click(Cell),
    Step(Direction),
    Shutdown,
}

enum Wake {
    Tick,
    Event(ChannelEvent),
    EventsClosed,
    Command(Option<SessionCommand>),
}

/// One client's engine: grid, planner-backed movement and presence sync wired
/// over a realtime channel. Everything runs on one task; grid and roster
/// mutation is atomic between awaits.
pub struct ClientSession {
    grid: GridModel,
    controller: MovementController,
    presence: PresenceSync,
    channel: Arc<dyn RealtimeChannel>,
    logger: DynLogger,
    events: Option<mpsc::Receiver<ChannelEvent>>,
    online: bool,
    tick_interval: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ClientSession {
    /// Builds the session and spawns the local avatar onto a random free
    /// cell. The channel stays closed until [`join`](Self::join).
    pub fn new(
        config: &Config,
        local_id: Uuid,
        display_name: &str,
        color: AvatarColor,
        channel: Arc<dyn RealtimeChannel>,
        logger: DynLogger,
    ) -> Self {
        let mut grid = GridModel::new(config.world.to_grid_config());
        let mut presence = PresenceSync::new(local_id);
        let avatar =
            presence.spawn_local(display_name, color, &mut grid, &mut rand::thread_rng());
        let controller = MovementController::new(local_id, avatar.cell);

        Self {
            grid,
            controller,
            presence,
            channel,
            logger,
            events: None,
            online: false,
            tick_interval: Duration::from_millis(config.movement.tick_interval_ms),
            retry_attempts: config.channel.retry_attempts,
            retry_delay: Duration::from_millis(config.channel.retry_delay_ms),
        }
    }

    pub fn local_id(&self) -> Uuid {
        self.presence.local_id()
    }

    pub fn position(&self) -> Cell {
        self.controller.cell()
    }

    pub fn is_moving(&self) -> bool {
        self.controller.is_moving()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn roster(&self) -> &Roster {
        self.presence.roster()
    }

    /// Opens the subscription with bounded retry, then announces presence and
    /// the initial position. Giving up leaves the session offline but still
    /// locally playable.
    pub async fn join(&mut self) {
        if self.try_subscribe().await {
            self.online = true;
            self.announce().await;
        } else {
            self.logger.warn(&format!(
                "Giving up on channel after {} attempts, continuing offline",
                self.retry_attempts
            ));
        }
    }

    async fn try_subscribe(&mut self) -> bool {
        for attempt in 1..=self.retry_attempts {
            match self.channel.subscribe().await {
                Ok(mut rx) => match rx.recv().await {
                    Some(ChannelEvent::Status(ChannelStatus::Subscribed)) => {
                        self.events = Some(rx);
                        return true;
                    }
                    other => {
                        self.logger
                            .warn(&format!("Unexpected subscribe outcome: {:?}", other));
                        self.channel.unsubscribe().await;
                    }
                },
                Err(e) => {
                    self.logger
                        .warn(&format!("Subscribe attempt {} failed: {}", attempt, e));
                }
            }
            if attempt < self.retry_attempts {
                time::sleep(self.retry_delay).await;
            }
        }
        false
    }

    /// Unconditional announcement of the current position: presence track
    /// plus a "position" broadcast. The dedup gate only applies to
    /// move-triggered broadcasts.
    async fn announce(&mut self) {
        let Some(avatar) = self.presence.local_avatar() else {
            return;
        };
        let payload = PositionPayload::from_avatar(avatar);
        let presence_data = PresencePayload {
            display_name: payload.display_name.clone(),
            position: payload.position,
        };
        if let Err(e) = self.channel.track(&presence_data).await {
            self.logger.error(&format!("Failed to track presence: {}", e));
        }
        match self.channel.send(&payload).await {
            Ok(()) => self.presence.mark_broadcast(payload.cell()),
            Err(e) => self
                .logger
                .error(&format!("Failed to send position update: {}", e)),
        }
    }

    /// Click request: path to the target begins on the next tick.
    pub async fn click(&mut self, target: Cell) {
        if let Some(event) = self.controller.request_path(target, &self.grid) {
            debug!(event = event.event_type(), "movement event");
        }
    }

    /// Directional key request; a successful step broadcasts immediately.
    pub async fn step(&mut self, direction: Direction) {
        if let Some(event) = self.controller.step(direction, &mut self.grid) {
            self.after_local_move(&event).await;
        }
    }

    /// One movement tick; consumes a planned path one cell at a time.
    pub async fn tick(&mut self) {
        if let Some(event) = self.controller.tick(&mut self.grid) {
            self.after_local_move(&event).await;
        }
    }

    async fn after_local_move(&mut self, event: &MovementEvent) {
        debug!(event = event.event_type(), "movement event");
        if let Some(cell) = event.arrived_at() {
            self.presence.update_local_cell(cell);
        }
        if !self.online {
            return;
        }
        let Some(payload) = self.presence.position_to_announce() else {
            return;
        };
        let presence_data = PresencePayload {
            display_name: payload.display_name.clone(),
            position: payload.position,
        };
        if let Err(e) = self.channel.track(&presence_data).await {
            self.logger
                .error(&format!("Failed to update presence: {}", e));
        }
        match self.channel.send(&payload).await {
            // Only a broadcast that actually went out updates the dedup
            // state; a failed one is retried by the next local move.
            Ok(()) => self.presence.mark_broadcast(payload.cell()),
            Err(e) => self
                .logger
                .error(&format!("Failed to send position update: {}", e)),
        }
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Position(payload) => {
                if let Some(applied) = self.presence.apply_position(&payload, &mut self.grid) {
                    debug!(event = applied.event_type(), "presence event");
                }
            }
            ChannelEvent::PeerJoined { key } => {
                // No snapshot handshake exists; the newcomer learns the room
                // from everyone re-announcing.
                if self.presence.should_reannounce_on_join(key) {
                    self.reannounce().await;
                }
            }
            ChannelEvent::PeerLeft { key } => {
                if let Some(applied) = self.presence.apply_leave(key, &mut self.grid) {
                    debug!(event = applied.event_type(), "presence event");
                }
            }
            ChannelEvent::PresenceState { keys } => {
                debug!(peers = keys.len(), "presence state synced");
            }
            ChannelEvent::Status(ChannelStatus::Subscribed) => {}
            ChannelEvent::Status(status) => {
                self.logger
                    .warn(&format!("Channel reported {:?}, resubscribing", status));
                self.events = None;
                self.online = false;
                if self.try_subscribe().await {
                    self.online = true;
                    self.announce().await;
                } else {
                    self.logger.warn(&format!(
                        "Giving up on channel after {} attempts, continuing offline",
                        self.retry_attempts
                    ));
                }
            }
        }
    }

    async fn reannounce(&mut self) {
        let Some(avatar) = self.presence.local_avatar() else {
            return;
        };
        let payload = PositionPayload::from_avatar(avatar);
        if let Err(e) = self.channel.send(&payload).await {
            self.logger
                .error(&format!("Failed to send position to new peer: {}", e));
        }
    }

    /// Drains and applies every channel event already delivered. Tests drive
    /// this directly; [`run`](Self::run) awaits instead.
    pub async fn pump(&mut self) {
        loop {
            let event = match self.events.as_mut() {
                Some(rx) => match rx.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
                None => break,
            };
            self.handle_channel_event(event).await;
        }
    }

    /// Cooperative event loop over the movement tick, inbound channel events
    /// and user commands. Returns when commanded to shut down or when the
    /// command sender goes away; every exit path releases the subscription.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = {
                let events = &mut self.events;
                tokio::select! {
                    _ = ticker.tick() => Wake::Tick,
                    cmd = commands.recv() => Wake::Command(cmd),
                    event = async {
                        match events.as_mut() {
                            Some(rx) => rx.recv().await,
                            // Offline: only ticks and commands can wake us.
                            None => std::future::pending().await,
                        }
                    } => match event {
                        Some(event) => Wake::Event(event),
                        None => Wake::EventsClosed,
                    },
                }
            };

            match wake {
                Wake::Tick => self.tick().await,
                Wake::Event(event) => self.handle_channel_event(event).await,
                Wake::EventsClosed => {
                    self.events = None;
                    self.handle_channel_event(ChannelEvent::Status(ChannelStatus::Closed))
                        .await;
                }
                Wake::Command(Some(SessionCommand::Click(cell))) => self.click(cell).await,
                Wake::Command(Some(SessionCommand::Step(direction))) => {
                    self.step(direction).await
                }
                Wake::Command(Some(SessionCommand::Shutdown)) | Wake::Command(None) => break,
            }
        }

        self.leave().await;
    }

    /// Releases the channel subscription; safe to call more than once.
    pub async fn leave(&mut self) {
        self.channel.unsubscribe().await;
        self.events = None;
        self.online = false;
    }
}
