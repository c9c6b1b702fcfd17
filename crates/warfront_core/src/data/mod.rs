//! Data structures for scenario configuration.
//!
//! This module contains pure data structures that define terrain tables,
//! weapons, unit profiles, the map and the initial roster. All structs are
//! designed to be deserialized from RON documents.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `warfront_tools`.

mod map_data;
mod scenario_data;
mod unit_data;

pub use map_data::MapData;
pub use scenario_data::ScenarioData;
pub use unit_data::{UnitPlacement, UnitProfileData, WeaponSlotData};
