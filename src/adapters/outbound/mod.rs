pub mod console_logger;
pub mod noop_logger;
pub mod profile_store;

pub use console_logger::*;
pub use noop_logger::*;
pub use profile_store::*;
