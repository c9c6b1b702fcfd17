//! The scenario world: terrain plus the registry of every unit.
//!
//! The world is an explicit object passed by reference into planning and
//! targeting. Units are kept in a `BTreeMap` keyed by id so every iteration
//! order is deterministic.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::data::ScenarioData;
use crate::error::{GameError, Result};
use crate::hex::Cell;
use crate::terrain::TerrainIndex;
use crate::units::{TeamId, Unit, UnitId, UnitStats, WeaponLoadoutEntry, WeaponProfile};

/// Terrain and units of one scenario.
#[derive(Debug, Clone)]
pub struct World {
    terrain: TerrainIndex,
    units: BTreeMap<UnitId, Unit>,
    next_id: u32,
}

impl World {
    /// Create an empty world over `terrain`.
    #[must_use]
    pub fn new(terrain: TerrainIndex) -> Self {
        Self {
            terrain,
            units: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Build the world described by a scenario document.
    ///
    /// Placements that reference an unknown profile, lie off the board, or
    /// overlap another unit are skipped with a warning. Weapon slots that
    /// reference an unknown weapon keep their range but get no profile and no
    /// ammunition.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` if the map layout is invalid.
    pub fn from_scenario(scenario: &ScenarioData) -> Result<Self> {
        let terrain = scenario.map.build_index(scenario.terrain.clone())?;
        let mut world = Self::new(terrain);

        let weapons: BTreeMap<&str, Arc<WeaponProfile>> = scenario
            .weapons
            .iter()
            .map(|w| (w.name.as_str(), Arc::new(w.clone())))
            .collect();

        for placement in &scenario.placements {
            let Some(profile) = scenario.unit_profile(&placement.profile) else {
                tracing::warn!(profile = %placement.profile, cell = %placement.cell, "Unknown unit profile, placement skipped");
                continue;
            };

            let loadout = profile
                .weapons
                .iter()
                .map(|slot| match weapons.get(slot.weapon.as_str()) {
                    Some(weapon) => WeaponLoadoutEntry::new(Arc::clone(weapon), slot.ammo, slot.min_range, slot.max_range),
                    None => {
                        tracing::warn!(
                            unit = %profile.id,
                            weapon = %slot.weapon,
                            "Unknown weapon, slot has no power and no ammo"
                        );
                        WeaponLoadoutEntry {
                            profile: None,
                            ammo: 0,
                            min_range: slot.min_range,
                            max_range: slot.max_range,
                        }
                    }
                })
                .collect();

            let name = placement.name.clone().unwrap_or_else(|| profile.name.clone());
            if let Err(err) = world.spawn(name, placement.team, profile.stats(), placement.cell, loadout) {
                tracing::warn!(profile = %placement.profile, %err, "Placement skipped");
            }
        }

        tracing::info!(
            scenario = %scenario.name,
            width = world.terrain.width(),
            height = world.terrain.height(),
            units = world.units.len(),
            "World built"
        );
        Ok(world)
    }

    /// Place a new unit and return its id.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` if the cell is off the board or
    /// already occupied by a live unit.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        team: TeamId,
        stats: UnitStats,
        cell: Cell,
        weapons: Vec<WeaponLoadoutEntry>,
    ) -> Result<UnitId> {
        if !self.terrain.on_board(cell) {
            return Err(GameError::InvalidState(format!("cell {cell} is off the board")));
        }
        if let Some(other) = self.unit_at(cell) {
            return Err(GameError::InvalidState(format!("cell {cell} is occupied by {}", other.id)));
        }

        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.units.insert(id, Unit::new(id, name, team, stats, cell, weapons));
        Ok(id)
    }

    /// Terrain index.
    #[must_use]
    pub const fn terrain(&self) -> &TerrainIndex {
        &self.terrain
    }

    /// Look up a unit (live or not).
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Look up a unit or fail with `UnknownUnit`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownUnit` if the id is not registered.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.get(id).ok_or(GameError::UnknownUnit(id))
    }

    /// Mutable variant of [`Self::unit`].
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownUnit` if the id is not registered.
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.get_mut(id).ok_or(GameError::UnknownUnit(id))
    }

    /// Look up a unit that is still in play.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownUnit` if the id is not registered and
    /// `GameError::InvalidState` if the unit is dead or removed.
    pub fn live_unit(&self, id: UnitId) -> Result<&Unit> {
        let unit = self.unit(id)?;
        if unit.is_alive() {
            Ok(unit)
        } else {
            Err(GameError::InvalidState(format!("unit {id} is not alive")))
        }
    }

    /// All registered units in id order, including dead ones.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Live units in id order.
    pub fn live_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.is_alive())
    }

    /// The live unit standing on `cell`.
    #[must_use]
    pub fn unit_at(&self, cell: Cell) -> Option<&Unit> {
        self.live_units().find(|u| u.cell == cell)
    }

    /// Cells `mover` may not enter: those held by live units of other teams.
    #[must_use]
    pub fn movement_blockers(&self, mover: &Unit) -> BTreeSet<Cell> {
        self.live_units()
            .filter(|u| u.id != mover.id && u.is_enemy_of(mover))
            .map(|u| u.cell)
            .collect()
    }

    /// Cells `mover` may pass through but not stop on: those held by allies.
    #[must_use]
    pub fn stopping_blockers(&self, mover: &Unit) -> BTreeSet<Cell> {
        self.live_units()
            .filter(|u| u.id != mover.id && !u.is_enemy_of(mover))
            .map(|u| u.cell)
            .collect()
    }

    /// Remove a unit from play.
    ///
    /// # Errors
    ///
    /// Returns `GameError::UnknownUnit` if the id is not registered.
    pub fn deactivate(&mut self, id: UnitId) -> Result<()> {
        let unit = self.unit_mut(id)?;
        unit.active = false;
        tracing::info!(unit = %id, "Unit removed from play");
        Ok(())
    }

    /// Clear every unit's finished flag for a new round.
    pub fn reset_all_turns(&mut self) {
        for unit in self.units.values_mut() {
            unit.finished = false;
            unit.action_origin = unit.cell;
        }
    }

    /// Live units of `team` that have not acted, in id order.
    pub fn ready_units(&self, team: TeamId) -> impl Iterator<Item = &Unit> {
        self.live_units().filter(move |u| u.team == team && !u.finished)
    }

    /// Hash of every unit in id order.
    ///
    /// Two worlds driven through identical inputs produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.units.len().hash(&mut hasher);
        for unit in self.units.values() {
            unit.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Check cross-unit invariants. Compiled only with `debug-validation`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` naming the first violation.
    #[cfg(feature = "debug-validation")]
    pub fn validate(&self) -> Result<()> {
        let mut occupied = BTreeSet::new();
        for unit in self.live_units() {
            if !occupied.insert(unit.cell) {
                return Err(GameError::InvalidState(format!("two live units on {}", unit.cell)));
            }
            if unit.health.current > unit.health.max {
                return Err(GameError::InvalidState(format!("{} health above max", unit.id)));
            }
            if unit.fuel.current > unit.fuel.max {
                return Err(GameError::InvalidState(format!("{} fuel above max", unit.id)));
            }
        }
        Ok(())
    }
}
