use crate::domains::logger::DomainLogger;
use std::sync::Arc;

struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }
    fn warn(&self, msg: &str) {
        println!("warning: {}", msg);
    }
    fn error(&self, msg: &str) {
        eprintln!("error: {}", msg);
    }
}

/// Console-backed DomainLogger, the demo binary's default.
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleLogger)
}
