//! Data-file loading for the assembly simulation: machine catalog, resource
//! nodes, overlay icons and runtime configuration.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};
