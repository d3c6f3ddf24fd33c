use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use plaza_app::adapters::inbound::MemoryHub;
use plaza_app::adapters::outbound::init_noop_logger;
use plaza_app::application::{ClientSession, SessionCommand};
use plaza_app::domains::movement::Direction;
use plaza_app::domains::world::{AvatarColor, Cell};
use plaza_app::Config;

const DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

fn fast_config() -> Config {
    let mut config = Config::default();
    config.movement.tick_interval_ms = 10;
    config.channel.retry_delay_ms = 5;
    config
}

fn session_on(hub: &MemoryHub, config: &Config, name: &str) -> ClientSession {
    let id = Uuid::new_v4();
    ClientSession::new(
        config,
        id,
        name,
        AvatarColor::Blue,
        Arc::new(hub.channel(id)),
        init_noop_logger(),
    )
}

/// First direction whose neighbor cell the session could actually step onto.
fn free_direction(session: &ClientSession) -> Direction {
    let position = session.position();
    *DIRECTIONS
        .iter()
        .find(|direction| {
            let (dx, dz) = direction.offset();
            let neighbor = Cell::new(position.x + dx, position.z + dz);
            session.grid().is_walkable(neighbor, session.local_id())
        })
        .expect("avatar has at least one free neighbor")
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_clients_converge_on_a_shared_view() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        let mut b = session_on(&hub, &config, "bo");

        a.join().await;
        b.join().await;
        // a hears b's join and re-announces; b then hears a's position
        a.pump().await;
        b.pump().await;

        assert!(a.is_online() && b.is_online());
        assert_eq!(a.roster().len(), 2);
        assert_eq!(b.roster().len(), 2);
        assert_eq!(
            a.roster().get(b.local_id()).unwrap().cell,
            b.position()
        );
        assert_eq!(
            b.roster().get(a.local_id()).unwrap().cell,
            a.position()
        );
        assert_eq!(a.grid().occupant(b.position()), Some(b.local_id()));
        assert_eq!(b.grid().occupant(a.position()), Some(a.local_id()));
    }

    #[tokio::test]
    async fn test_local_step_propagates_to_the_peer() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        let mut b = session_on(&hub, &config, "bo");
        a.join().await;
        b.join().await;
        a.pump().await;
        b.pump().await;

        let before = a.position();
        let direction = free_direction(&a);
        a.step(direction).await;
        assert_ne!(a.position(), before);

        b.pump().await;
        assert_eq!(
            b.roster().get(a.local_id()).unwrap().cell,
            a.position()
        );
        assert_eq!(b.grid().occupant(a.position()), Some(a.local_id()));
        assert_ne!(b.grid().occupant(before), Some(a.local_id()));
    }

    #[tokio::test]
    async fn test_click_walks_to_the_target_one_tick_at_a_time() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        let mut b = session_on(&hub, &config, "bo");
        a.join().await;
        b.join().await;
        a.pump().await;
        b.pump().await;

        let direction = free_direction(&a);
        let (dx, dz) = direction.offset();
        let start = a.position();
        let target = Cell::new(start.x + dx, start.z + dz);

        a.click(target).await;
        assert!(a.is_moving());
        assert_eq!(a.position(), start);

        a.tick().await;
        assert!(!a.is_moving());
        assert_eq!(a.position(), target);

        b.pump().await;
        assert_eq!(b.roster().get(a.local_id()).unwrap().cell, target);
    }

    #[tokio::test]
    async fn test_idle_ticks_do_not_rebroadcast() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        let mut b = session_on(&hub, &config, "bo");
        a.join().await;
        b.join().await;
        a.pump().await;
        b.pump().await;

        // Nothing moved, so repeated ticks must stay silent on the wire
        a.tick().await;
        a.tick().await;
        a.tick().await;

        let before = b.roster().get(a.local_id()).unwrap().cell;
        b.pump().await;
        assert_eq!(b.roster().get(a.local_id()).unwrap().cell, before);
    }

    #[tokio::test]
    async fn test_peer_leave_clears_its_claim() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        let mut b = session_on(&hub, &config, "bo");
        a.join().await;
        b.join().await;
        a.pump().await;
        b.pump().await;

        let b_id = b.local_id();
        let b_cell = b.position();
        b.leave().await;

        a.pump().await;
        assert_eq!(a.roster().len(), 1);
        assert!(a.roster().get(b_id).is_none());
        assert_ne!(a.grid().occupant(b_cell), Some(b_id));
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_gives_up_into_offline_mode() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        hub.fail_next_subscribes(config.channel.retry_attempts);
        let mut a = session_on(&hub, &config, "ana");

        a.join().await;

        assert!(!a.is_online());
        assert_eq!(hub.subscriber_count(), 0);

        // Movement still works against the local grid
        let before = a.position();
        let direction = free_direction(&a);
        a.step(direction).await;
        assert_ne!(a.position(), before);
        assert_eq!(a.grid().occupant(a.position()), Some(a.local_id()));
    }

    #[tokio::test]
    async fn test_run_loop_releases_the_subscription_on_shutdown() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        a.join().await;
        assert_eq!(hub.subscriber_count(), 1);

        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(async move {
            a.run(rx).await;
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_run_loop_releases_the_subscription_when_commands_drop() {
        let config = fast_config();
        let hub = MemoryHub::new(&config.channel.room);
        let mut a = session_on(&hub, &config, "ana");
        a.join().await;

        let (tx, rx) = mpsc::channel::<SessionCommand>(4);
        let handle = tokio::spawn(async move {
            a.run(rx).await;
        });

        drop(tx);
        handle.await.unwrap();

        assert_eq!(hub.subscriber_count(), 0);
    }
}
