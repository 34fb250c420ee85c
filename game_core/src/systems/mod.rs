pub mod collision;
pub mod input;
pub mod movement;
pub mod phase;
pub mod scoring;

pub use collision::*;
pub use input::*;
pub use movement::*;
pub use phase::*;
pub use scoring::*;
