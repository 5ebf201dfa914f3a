//! Race persistence
//!
//! The engine only talks to [`RaceStore`]. [`TomlRaceStore`] keeps one
//! `race-<id>.toml` per race in the data directory.

mod error;
mod toml_store;

pub use error::StorageError;
pub use toml_store::TomlRaceStore;

use crate::race::Race;

/// Load/save hooks for races
pub trait RaceStore: Send + Sync {
    fn load_race(&self, id: &str) -> Result<Race, StorageError>;

    fn save_race(&self, race: &Race) -> Result<(), StorageError>;

    /// Ids of every stored race, sorted
    fn list_races(&self) -> Result<Vec<String>, StorageError>;
}
