pub mod controller;
pub mod events;

pub use controller::*;
pub use events::*;
