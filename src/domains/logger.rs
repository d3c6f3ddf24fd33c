use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Domain-level logging port (Hexagonal port).
/// Kept intentionally small and non-fallible from the domain perspective.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// File-based adapter using `fast_log` for writing and rotation.
pub struct FileLogger;

impl FileLogger {
    /// Initialize the fast_log appender writing to `path`. Call once per
    /// process; fast_log owns the global `log` dispatcher afterwards.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .console()
                .file(path)
                .level(log::LevelFilter::Info),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} {}", Utc::now().to_rfc3339(), msg);
    }
}
