//! Terrain categories, position quality (DPQ) and the per-cell terrain index.
//!
//! The [`TerrainIndex`] is built once from a terrain-profile table before any
//! turn processing begins and is read-only afterwards. It answers three
//! questions per cell: how much does it cost a given mobility class to enter,
//! what defense bonus does it grant, and how many quality points is it worth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::Cell;

/// Movement cost reported for terrain no unit of a class may enter.
pub const COST_IMPASSABLE: u32 = 99;

/// Movement cost reported for cells outside the board or without a tile.
pub const COST_OFF_MAP: u32 = 999;

/// Legend character for a cell with no tile (a hole in the board).
pub const VOID_TILE: char = ' ';

/// Broad terrain category that drives default movement costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainCategory {
    /// Open ground, roads.
    #[default]
    Plain,
    /// Woods: slows ground vehicles.
    Forest,
    /// Mountains: very slow for vehicles, closed to ships.
    Mountain,
    /// Beaches: open ground at the water line.
    Beach,
    /// Sea: closed to ground units.
    Water,
    /// Walls and similar: closed to everyone.
    Obstacle,
}

/// Terrain-cost class of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MobilityClass {
    /// Foot soldiers.
    #[default]
    Infantry,
    /// Wheeled and tracked vehicles.
    GroundVehicle,
    /// Aircraft.
    Air,
    /// Ships and submarines.
    Sea,
}

impl TerrainCategory {
    /// Default cost for a unit of `mobility` to enter a cell of this category.
    #[must_use]
    pub const fn movement_cost(self, mobility: MobilityClass) -> u32 {
        use MobilityClass::{Air, GroundVehicle, Infantry, Sea};

        match (self, mobility) {
            (Self::Plain | Self::Beach, _) => 1,

            (Self::Forest, Infantry | Air | Sea) => 1,
            (Self::Forest, GroundVehicle) => 2,

            (Self::Mountain, Air) => 1,
            (Self::Mountain, Infantry) => 2,
            (Self::Mountain, GroundVehicle) => 6,
            (Self::Mountain, Sea) => COST_IMPASSABLE,

            (Self::Water, Air | Sea) => 1,
            (Self::Water, Infantry | GroundVehicle) => COST_IMPASSABLE,

            (Self::Obstacle, _) => COST_IMPASSABLE,
        }
    }
}

/// Preset tactical quality of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PositionQuality {
    /// 0 quality points, -1 defense.
    Unfavorable,
    /// 1 quality point, no defense bonus.
    #[default]
    Standard,
    /// 2 quality points, +2 defense.
    Improved,
    /// 3 quality points, +4 defense.
    Favorable,
    /// 4 quality points, +6 defense. Reserved for special sites such as bases.
    Unique,
}

impl PositionQuality {
    /// Quality points of this preset.
    #[must_use]
    pub const fn quality_points(self) -> i32 {
        match self {
            Self::Unfavorable => 0,
            Self::Standard => 1,
            Self::Improved => 2,
            Self::Favorable => 3,
            Self::Unique => 4,
        }
    }

    /// Defense bonus of this preset.
    #[must_use]
    pub const fn defense_bonus(self) -> i32 {
        match self {
            Self::Unfavorable => -1,
            Self::Standard => 0,
            Self::Improved => 2,
            Self::Favorable => 4,
            Self::Unique => 6,
        }
    }
}

/// Explicit per-class movement costs, overriding the category defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MobilityCosts {
    /// Cost for infantry.
    pub infantry: u32,
    /// Cost for ground vehicles.
    pub ground_vehicle: u32,
    /// Cost for aircraft.
    pub air: u32,
    /// Cost for ships.
    pub sea: u32,
}

impl MobilityCosts {
    /// Look up the cost for a mobility class.
    #[must_use]
    pub const fn get(&self, mobility: MobilityClass) -> u32 {
        match mobility {
            MobilityClass::Infantry => self.infantry,
            MobilityClass::GroundVehicle => self.ground_vehicle,
            MobilityClass::Air => self.air,
            MobilityClass::Sea => self.sea,
        }
    }
}

/// One row of the terrain-profile table.
///
/// # Example RON
///
/// ```ron
/// TerrainProfile(
///     name: "forest",
///     category: Forest,
///     quality: Improved,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainProfile {
    /// Unique name, referenced from the map legend.
    pub name: String,

    /// Terrain category.
    #[serde(default)]
    pub category: TerrainCategory,

    /// DPQ preset.
    #[serde(default)]
    pub quality: PositionQuality,

    /// Overrides the preset's quality points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_points: Option<i32>,

    /// Overrides the preset's defense bonus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_bonus: Option<i32>,

    /// Overrides the category's movement costs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<MobilityCosts>,
}

impl TerrainProfile {
    /// Create a profile with category defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, category: TerrainCategory, quality: PositionQuality) -> Self {
        Self {
            name: name.into(),
            category,
            quality,
            quality_points: None,
            defense_bonus: None,
            costs: None,
        }
    }

    /// Movement cost for a mobility class.
    #[must_use]
    pub fn movement_cost(&self, mobility: MobilityClass) -> u32 {
        self.costs
            .map_or_else(|| self.category.movement_cost(mobility), |c| c.get(mobility))
    }

    /// Quality points of this terrain.
    #[must_use]
    pub fn quality_points(&self) -> i32 {
        self.quality_points
            .unwrap_or_else(|| self.quality.quality_points())
    }

    /// Defense bonus of this terrain.
    #[must_use]
    pub fn defense_bonus(&self) -> i32 {
        self.defense_bonus
            .unwrap_or_else(|| self.quality.defense_bonus())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Tile {
    /// No tile: behaves as off-map.
    Void,
    /// A tile with no configured profile: behaves as plain, standard ground.
    Unmapped,
    /// Index into the profile table.
    Profile(u16),
}

/// Read-only map from cells to terrain profiles.
#[derive(Debug, Clone)]
pub struct TerrainIndex {
    width: u32,
    height: u32,
    /// Row-major tiles.
    tiles: Vec<Tile>,
    profiles: Vec<TerrainProfile>,
}

impl TerrainIndex {
    /// Create a board of unmapped (plain) tiles.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "TerrainIndex width must be positive");
        assert!(height > 0, "TerrainIndex height must be positive");

        Self {
            width,
            height,
            tiles: vec![Tile::Unmapped; (width as usize) * (height as usize)],
            profiles: Vec::new(),
        }
    }

    /// Build a board from text rows, one legend character per cell.
    ///
    /// Row `r`, character `c` becomes `Cell::new(c, r)`. [`VOID_TILE`] marks a
    /// hole in the board. Characters missing from the legend, and legend
    /// entries naming an unknown profile, fall back to unmapped plain tiles
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` if there are no rows, rows differ in
    /// length, or a profile name is declared twice.
    pub fn from_rows(
        profiles: Vec<TerrainProfile>,
        legend: &BTreeMap<char, String>,
        rows: &[String],
    ) -> Result<Self> {
        let map_error = |message: String| GameError::DataParseError {
            path: "map".into(),
            message,
        };

        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if height == 0 || width == 0 {
            return Err(map_error("map has no cells".into()));
        }

        let mut by_name: BTreeMap<&str, u16> = BTreeMap::new();
        for (i, profile) in profiles.iter().enumerate() {
            let index = u16::try_from(i).map_err(|_| map_error("too many terrain profiles".into()))?;
            if by_name.insert(profile.name.as_str(), index).is_some() {
                return Err(map_error(format!("duplicate terrain profile '{}'", profile.name)));
            }
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(map_error(format!(
                    "row {r} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for (c, symbol) in row.chars().enumerate() {
                let tile = if symbol == VOID_TILE {
                    Tile::Void
                } else {
                    match legend.get(&symbol) {
                        Some(name) => match by_name.get(name.as_str()) {
                            Some(&index) => Tile::Profile(index),
                            None => {
                                tracing::warn!(
                                    symbol = %symbol,
                                    profile = %name,
                                    "Legend names an unknown terrain profile, using plain"
                                );
                                Tile::Unmapped
                            }
                        },
                        None => {
                            tracing::warn!(symbol = %symbol, row = r, col = c, "Unmapped legend symbol, using plain");
                            Tile::Unmapped
                        }
                    }
                };
                tiles.push(tile);
            }
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            tiles,
            profiles,
        })
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Register a profile and return its index.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` if the table is full.
    pub fn add_profile(&mut self, profile: TerrainProfile) -> Result<u16> {
        let index = u16::try_from(self.profiles.len())
            .map_err(|_| GameError::InvalidState("terrain profile table is full".into()))?;
        self.profiles.push(profile);
        Ok(index)
    }

    /// Paint a cell with a registered profile. Returns `false` if the cell is
    /// off the board or the profile index is unknown.
    pub fn set_profile(&mut self, cell: Cell, profile: u16) -> bool {
        if usize::from(profile) >= self.profiles.len() {
            return false;
        }
        self.set_tile(cell, Tile::Profile(profile))
    }

    /// Remove a cell's tile, making it behave as off-map.
    pub fn clear_tile(&mut self, cell: Cell) -> bool {
        self.set_tile(cell, Tile::Void)
    }

    fn set_tile(&mut self, cell: Cell, tile: Tile) -> bool {
        match self.index_of(cell) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    #[inline]
    fn index_of(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some((cell.row as usize) * (self.width as usize) + (cell.col as usize))
        } else {
            None
        }
    }

    /// Whether the cell lies inside the board rectangle.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as u32) < self.width
            && (cell.row as u32) < self.height
    }

    /// Whether the cell has a tile (in bounds and not a hole).
    #[must_use]
    pub fn on_board(&self, cell: Cell) -> bool {
        self.tile(cell).is_some()
    }

    fn tile(&self, cell: Cell) -> Option<Tile> {
        match self.index_of(cell).map(|i| self.tiles[i]) {
            Some(Tile::Void) | None => None,
            tile => tile,
        }
    }

    /// The profile painted on a cell, if any.
    #[must_use]
    pub fn profile(&self, cell: Cell) -> Option<&TerrainProfile> {
        match self.tile(cell)? {
            Tile::Profile(i) => self.profiles.get(usize::from(i)),
            Tile::Void | Tile::Unmapped => None,
        }
    }

    /// Terrain category of a cell; unmapped and off-map cells read as plain.
    #[must_use]
    pub fn category(&self, cell: Cell) -> TerrainCategory {
        self.profile(cell).map_or(TerrainCategory::Plain, |p| p.category)
    }

    /// Cost for `mobility` to enter `cell`.
    ///
    /// Off-map cells return [`COST_OFF_MAP`]; unmapped tiles cost 1.
    #[must_use]
    pub fn movement_cost(&self, cell: Cell, mobility: MobilityClass) -> u32 {
        match self.tile(cell) {
            None => COST_OFF_MAP,
            Some(Tile::Unmapped | Tile::Void) => 1,
            Some(Tile::Profile(i)) => self
                .profiles
                .get(usize::from(i))
                .map_or(1, |p| p.movement_cost(mobility)),
        }
    }

    /// Defense bonus granted to a unit standing on `cell`.
    #[must_use]
    pub fn defense_bonus(&self, cell: Cell) -> i32 {
        self.profile(cell)
            .map_or_else(|| PositionQuality::Standard.defense_bonus(), |p| p.defense_bonus())
    }

    /// Quality points of `cell`.
    #[must_use]
    pub fn quality_points(&self, cell: Cell) -> i32 {
        self.profile(cell)
            .map_or_else(|| PositionQuality::Standard.quality_points(), |p| p.quality_points())
    }

    /// All registered profiles.
    #[must_use]
    pub fn profiles(&self) -> &[TerrainProfile] {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legend(pairs: &[(char, &str)]) -> BTreeMap<char, String> {
        pairs.iter().map(|(c, n)| (*c, (*n).to_string())).collect()
    }

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_string()).collect()
    }

    fn sample_index() -> TerrainIndex {
        let profiles = vec![
            TerrainProfile::new("plain", TerrainCategory::Plain, PositionQuality::Standard),
            TerrainProfile::new("forest", TerrainCategory::Forest, PositionQuality::Improved),
            TerrainProfile::new("mountain", TerrainCategory::Mountain, PositionQuality::Favorable),
            TerrainProfile::new("sea", TerrainCategory::Water, PositionQuality::Unfavorable),
            TerrainProfile::new("wall", TerrainCategory::Obstacle, PositionQuality::Standard),
        ];
        let legend = legend(&[('.', "plain"), ('f', "forest"), ('^', "mountain"), ('~', "sea"), ('#', "wall")]);
        TerrainIndex::from_rows(profiles, &legend, &rows(&[".f^~#", ".. ?."])).unwrap()
    }

    #[test]
    fn test_category_cost_table() {
        use MobilityClass::*;
        use TerrainCategory::*;

        assert_eq!(Forest.movement_cost(Infantry), 1);
        assert_eq!(Forest.movement_cost(GroundVehicle), 2);
        assert_eq!(Forest.movement_cost(Air), 1);
        assert_eq!(Mountain.movement_cost(GroundVehicle), 6);
        assert_eq!(Mountain.movement_cost(Sea), COST_IMPASSABLE);
        assert_eq!(Water.movement_cost(Infantry), COST_IMPASSABLE);
        assert_eq!(Water.movement_cost(Sea), 1);
        assert_eq!(Obstacle.movement_cost(Air), COST_IMPASSABLE);
        assert_eq!(Beach.movement_cost(GroundVehicle), 1);
    }

    #[test]
    fn test_position_quality_presets() {
        assert_eq!(PositionQuality::Unfavorable.quality_points(), 0);
        assert_eq!(PositionQuality::Unfavorable.defense_bonus(), -1);
        assert_eq!(PositionQuality::Unique.quality_points(), 4);
        assert_eq!(PositionQuality::Unique.defense_bonus(), 6);
    }

    #[test]
    fn test_profile_overrides() {
        let mut profile = TerrainProfile::new("bunker", TerrainCategory::Plain, PositionQuality::Standard);
        profile.defense_bonus = Some(5);
        profile.costs = Some(MobilityCosts {
            infantry: 1,
            ground_vehicle: COST_IMPASSABLE,
            air: 1,
            sea: COST_IMPASSABLE,
        });
        assert_eq!(profile.defense_bonus(), 5);
        assert_eq!(profile.quality_points(), 1);
        assert_eq!(profile.movement_cost(MobilityClass::GroundVehicle), COST_IMPASSABLE);
    }

    #[test]
    fn test_index_lookups() {
        let index = sample_index();
        assert_eq!(index.width(), 5);
        assert_eq!(index.height(), 2);

        assert_eq!(index.category(Cell::new(1, 0)), TerrainCategory::Forest);
        assert_eq!(index.defense_bonus(Cell::new(1, 0)), 2);
        assert_eq!(index.quality_points(Cell::new(2, 0)), 3);
        assert_eq!(index.movement_cost(Cell::new(3, 0), MobilityClass::Infantry), COST_IMPASSABLE);
        assert_eq!(index.movement_cost(Cell::new(4, 0), MobilityClass::Air), COST_IMPASSABLE);
    }

    #[test]
    fn test_unmapped_cell_defaults_to_plain() {
        let index = sample_index();
        // '?' is not in the legend
        let cell = Cell::new(3, 1);
        assert!(index.on_board(cell));
        assert_eq!(index.movement_cost(cell, MobilityClass::GroundVehicle), 1);
        assert_eq!(index.defense_bonus(cell), 0);
        assert_eq!(index.quality_points(cell), 1);
    }

    #[test]
    fn test_off_map_is_impassable() {
        let index = sample_index();
        assert_eq!(index.movement_cost(Cell::new(-1, 0), MobilityClass::Air), COST_OFF_MAP);
        assert_eq!(index.movement_cost(Cell::new(0, 2), MobilityClass::Air), COST_OFF_MAP);
        // void tile inside the rectangle
        assert!(!index.on_board(Cell::new(2, 1)));
        assert_eq!(index.movement_cost(Cell::new(2, 1), MobilityClass::Air), COST_OFF_MAP);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = TerrainIndex::from_rows(Vec::new(), &BTreeMap::new(), &rows(&["...", ".."]));
        assert!(matches!(result, Err(GameError::DataParseError { .. })));
    }

    #[test]
    fn test_duplicate_profile_rejected() {
        let profiles = vec![
            TerrainProfile::new("plain", TerrainCategory::Plain, PositionQuality::Standard),
            TerrainProfile::new("plain", TerrainCategory::Forest, PositionQuality::Standard),
        ];
        let result = TerrainIndex::from_rows(profiles, &BTreeMap::new(), &rows(&["."]));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_profile() {
        let mut index = TerrainIndex::new(4, 4);
        let forest = index
            .add_profile(TerrainProfile::new("forest", TerrainCategory::Forest, PositionQuality::Improved))
            .unwrap();
        assert!(index.set_profile(Cell::new(1, 1), forest));
        assert!(!index.set_profile(Cell::new(9, 9), forest));
        assert!(!index.set_profile(Cell::new(0, 0), forest + 1));
        assert_eq!(index.movement_cost(Cell::new(1, 1), MobilityClass::GroundVehicle), 2);

        assert!(index.clear_tile(Cell::new(0, 0)));
        assert!(!index.on_board(Cell::new(0, 0)));
    }
}
