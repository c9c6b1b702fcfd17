//! Complete scenario document.

use serde::{Deserialize, Serialize};

use super::map_data::MapData;
use super::unit_data::{UnitPlacement, UnitProfileData};
use crate::error::{GameError, Result};
use crate::terrain::TerrainProfile;
use crate::units::WeaponProfile;

/// Everything needed to build a [`crate::world::World`].
///
/// # Example RON
///
/// ```ron
/// ScenarioData(
///     name: "Skirmish",
///     terrain: [...],
///     weapons: [...],
///     units: [...],
///     map: MapData(...),
///     placements: [...],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario name.
    pub name: String,

    /// Terrain profile table.
    pub terrain: Vec<TerrainProfile>,

    /// Weapon table.
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,

    /// Unit profiles.
    #[serde(default)]
    pub units: Vec<UnitProfileData>,

    /// Board layout.
    pub map: MapData,

    /// Initial roster.
    #[serde(default)]
    pub placements: Vec<UnitPlacement>,
}

impl ScenarioData {
    /// Parse a scenario from RON text. `source` names the text in errors.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` if the text is not a valid
    /// scenario document.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Look up a weapon by name.
    #[must_use]
    pub fn weapon(&self, name: &str) -> Option<&WeaponProfile> {
        self.weapons.iter().find(|w| w.name == name)
    }

    /// Look up a unit profile by identifier.
    #[must_use]
    pub fn unit_profile(&self, id: &str) -> Option<&UnitProfileData> {
        self.units.iter().find(|u| u.id == id)
    }
}
