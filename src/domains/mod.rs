pub mod logger;
pub mod movement;
pub mod path_planning;
pub mod presence;
pub mod world;

pub use logger::*;
pub use movement::*;
pub use path_planning::*;
pub use presence::*;
pub use world::*;
