use anyhow::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domains::world::{Cell, GridConfig};

/// The obstacle layout every client must agree on for occupancy to line up.
static DEFAULT_OBSTACLES: Lazy<Vec<Cell>> = Lazy::new(|| {
    vec![
        Cell::new(2, 3),
        Cell::new(5, 5),
        Cell::new(7, 2),
        Cell::new(3, 7),
        Cell::new(8, 8),
    ]
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub movement: MovementConfig,
    pub channel: ChannelConfig,
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    pub obstacles: Vec<Cell>,
}

impl WorldConfig {
    pub fn to_grid_config(&self) -> GridConfig {
        GridConfig::new(self.width, self.height, self.obstacles.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub room: String,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig {
                width: 10,
                height: 10,
                obstacles: DEFAULT_OBSTACLES.clone(),
            },
            movement: MovementConfig {
                tick_interval_ms: 200,
            },
            channel: ChannelConfig {
                room: "virtual-world".to_string(),
                retry_attempts: 3,
                retry_delay_ms: 1000,
            },
            profile: ProfileConfig { data_dir: None },
        }
    }
}
