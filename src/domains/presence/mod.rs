pub mod events;
pub mod ports;
pub mod roster;
pub mod sync;

pub use events::*;
pub use ports::*;
pub use roster::*;
pub use sync::*;
