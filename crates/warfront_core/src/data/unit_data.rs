//! Unit profile and placement data.

use serde::{Deserialize, Serialize};

use crate::hex::Cell;
use crate::units::{TeamId, UnitStats, UnitType};

/// A weapon mounted on a unit profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSlotData {
    /// Name of a weapon in the scenario's weapon table.
    pub weapon: String,

    /// Starting ammunition ("squad attacks").
    pub ammo: u32,

    /// Minimum range in hexes.
    #[serde(default = "default_range")]
    pub min_range: u32,

    /// Maximum range in hexes.
    #[serde(default = "default_range")]
    pub max_range: u32,
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitProfileData(
///     id: "rifle_squad",
///     name: "Rifle Squad",
///     unit_type: Infantry,
///     move_range: 3,
///     weapons: [
///         WeaponSlotData(weapon: "rifle", ammo: 6),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitProfileData {
    /// Unique identifier referenced by placements.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unit type.
    pub unit_type: UnitType,

    /// Movement points per turn.
    pub move_range: u32,

    /// Starting squad size.
    #[serde(default = "default_max_health")]
    pub max_health: u32,

    /// Squad defense before terrain.
    #[serde(default = "default_defense")]
    pub defense: i32,

    /// Fuel tank size.
    #[serde(default = "default_max_fuel")]
    pub max_fuel: u32,

    /// Ordered weapons; the first is the primary weapon.
    #[serde(default)]
    pub weapons: Vec<WeaponSlotData>,
}

const fn default_range() -> u32 {
    1
}

const fn default_max_health() -> u32 {
    10
}

const fn default_defense() -> i32 {
    8
}

const fn default_max_fuel() -> u32 {
    70
}

impl UnitProfileData {
    /// Static statistics of this profile.
    #[must_use]
    pub const fn stats(&self) -> UnitStats {
        UnitStats {
            unit_type: self.unit_type,
            move_range: self.move_range,
            max_health: self.max_health,
            base_defense: self.defense,
            max_fuel: self.max_fuel,
        }
    }
}

/// Initial placement of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit profile identifier.
    pub profile: String,

    /// Owning team.
    pub team: TeamId,

    /// Starting cell.
    pub cell: Cell,

    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
