pub mod avatar;
pub mod grid;

pub use avatar::*;
pub use grid::*;
