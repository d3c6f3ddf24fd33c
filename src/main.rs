use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use plaza_app::adapters::inbound::MemoryHub;
use plaza_app::adapters::outbound::{init_console_logger, FilesystemProfileStore};
use plaza_app::application::{ClientSession, SessionCommand};
use plaza_app::domains::presence::ProfileStore;
use plaza_app::domains::world::{AvatarColor, Cell};
use plaza_app::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Plaza");

    // Load configuration
    let config = match Config::from_file("config.toml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Could not load config.toml ({}), using defaults", e);
            Config::default()
        }
    };

    info!("World: {}x{}", config.world.width, config.world.height);
    info!("Channel room: {}", config.channel.room);

    let logger = init_console_logger();
    let hub = MemoryHub::new(&config.channel.room);

    // Display name persisted in client-local storage, read at session start
    let profile_store = FilesystemProfileStore::new(config.profile.data_dir.clone());
    let display_name = match profile_store.load_display_name()? {
        Some(name) => name,
        None => {
            let name = "wanderer".to_string();
            profile_store.save_display_name(&name)?;
            name
        }
    };

    // Local session plus two simulated peers sharing the in-process room
    let peers = [
        (display_name.clone(), AvatarColor::Blue),
        ("echo".to_string(), AvatarColor::Red),
        ("sable".to_string(), AvatarColor::Green),
    ];

    let mut handles = Vec::new();
    let mut command_senders = Vec::new();
    for (name, color) in peers {
        let id = Uuid::new_v4();
        let channel = Arc::new(hub.channel(id));
        let mut session =
            ClientSession::new(&config, id, &name, color, channel, logger.clone());
        let (tx, rx) = mpsc::channel(16);
        command_senders.push(tx);
        handles.push(tokio::spawn(async move {
            session.join().await;
            session.run(rx).await;
        }));
    }

    // Drive the peers with random clicks until interrupted
    let width = config.world.width;
    let height = config.world.height;
    let driver_senders = command_senders.clone();
    let driver = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(700));
        loop {
            interval.tick().await;
            for tx in &driver_senders {
                let target = {
                    let mut rng = rand::thread_rng();
                    Cell::new(rng.gen_range(0..width), rng.gen_range(0..height))
                };
                if tx.send(SessionCommand::Click(target)).await.is_err() {
                    return;
                }
            }
        }
    });

    // Give the sessions a moment to join before reporting
    tokio::time::sleep(Duration::from_millis(50)).await;
    info!("Plaza started, {} clients in the room", hub.subscriber_count());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down Plaza");

    driver.abort();
    for tx in &command_senders {
        let _ = tx.send(SessionCommand::Shutdown).await;
    }
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
