//! Unit records: identity, squad health, fuel and weapon loadout.
//!
//! Every counter here is unsigned and mutated with saturating arithmetic, so
//! health, fuel and ammunition can never go negative.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hex::Cell;
use crate::terrain::MobilityClass;

/// Stable unit identifier, assigned in placement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team identifier. Units on the same team are allies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.0)
    }
}

/// Unit type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitType {
    /// Foot squad.
    #[default]
    Infantry,
    /// Light wheeled vehicle.
    Vehicle,
    /// Towed or self-propelled guns.
    Artillery,
    /// Armored tracked vehicle.
    Tank,
    /// Fast fixed-wing fighter.
    JetFighter,
    /// Rotary-wing aircraft.
    Helicopter,
    /// Fixed-wing bomber or transport.
    Plane,
    /// Surface vessel.
    Ship,
    /// Submarine.
    Sub,
}

impl UnitType {
    /// Terrain-cost class of this unit type.
    #[must_use]
    pub const fn mobility(self) -> MobilityClass {
        match self {
            Self::Infantry => MobilityClass::Infantry,
            Self::Vehicle | Self::Artillery | Self::Tank => MobilityClass::GroundVehicle,
            Self::JetFighter | Self::Helicopter | Self::Plane => MobilityClass::Air,
            Self::Ship | Self::Sub => MobilityClass::Sea,
        }
    }
}

/// Projectile flight kind, used only by presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trajectory {
    /// Direct fire.
    #[default]
    Straight,
    /// Lobbed shell.
    Parabolic,
}

/// Immutable weapon statistics shared between units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponProfile {
    /// Unique weapon name.
    pub name: String,
    /// Attack power per living squad member.
    pub base_power: u32,
    /// Projectile flight kind.
    #[serde(default)]
    pub trajectory: Trajectory,
    /// Projectile speed in cells per second.
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: u32,
}

const fn default_projectile_speed() -> u32 {
    20
}

/// One mounted weapon: shared stats plus per-unit ammunition and range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeaponLoadoutEntry {
    /// Weapon stats. `None` if the configuration referenced unknown data.
    pub profile: Option<Arc<WeaponProfile>>,
    /// Remaining squad attacks.
    pub ammo: u32,
    /// Minimum range in hexes.
    pub min_range: u32,
    /// Maximum range in hexes.
    pub max_range: u32,
}

impl WeaponLoadoutEntry {
    /// Create a loadout entry.
    #[must_use]
    pub fn new(profile: Arc<WeaponProfile>, ammo: u32, min_range: u32, max_range: u32) -> Self {
        Self {
            profile: Some(profile),
            ammo,
            min_range,
            max_range,
        }
    }

    /// Base power, zero when the profile is missing.
    #[must_use]
    pub fn base_power(&self) -> u32 {
        self.profile.as_ref().map_or(0, |p| p.base_power)
    }

    /// Weapon name for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        self.profile.as_ref().map_or("<missing>", |p| p.name.as_str())
    }

    /// Whether this weapon has ammunition left.
    #[must_use]
    pub const fn has_ammo(&self) -> bool {
        self.ammo > 0
    }

    /// Whether `distance` lies within the native range.
    #[must_use]
    pub const fn covers(&self, distance: u32) -> bool {
        distance >= self.min_range && distance <= self.max_range
    }

    /// Spend one round. Returns false if the weapon was already empty.
    pub fn spend_ammo(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        true
    }
}

/// Squad size of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Living squad members.
    pub current: u32,
    /// Starting squad size.
    pub max: u32,
}

impl Health {
    /// Create a full-strength squad.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the squad is wiped out.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Remove squad members, returning how many were actually removed.
    pub fn apply_eliminations(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }
}

/// Fuel tank. Spent on movement, refunded only by undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fuel {
    /// Fuel left.
    pub current: u32,
    /// Tank size.
    pub max: u32,
}

impl Fuel {
    /// Create a full tank.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Burn fuel, returning how much was actually burned.
    pub fn spend(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Return fuel to the tank, never above its size.
    pub fn refund(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Static per-type statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Unit type; determines mobility.
    pub unit_type: UnitType,
    /// Maximum movement points per turn.
    pub move_range: u32,
    /// Starting squad size.
    pub max_health: u32,
    /// Squad defense before terrain.
    pub base_defense: i32,
    /// Fuel tank size.
    pub max_fuel: u32,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            unit_type: UnitType::Infantry,
            move_range: 3,
            max_health: 10,
            base_defense: 8,
            max_fuel: 70,
        }
    }
}

/// A unit on the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    /// Identifier.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Owning team.
    pub team: TeamId,
    /// Static statistics.
    pub stats: UnitStats,
    /// Current cell.
    pub cell: Cell,
    /// Squad size.
    pub health: Health,
    /// Fuel.
    pub fuel: Fuel,
    /// Ordered weapons; slot 0 is the primary weapon used in combat.
    pub weapons: Vec<WeaponLoadoutEntry>,
    /// Set once the unit has acted this round.
    pub finished: bool,
    /// Cleared when the unit is removed from play.
    pub active: bool,
    /// Cell occupied at the start of the current action.
    pub action_origin: Cell,
}

impl Unit {
    /// Create a full-strength unit.
    #[must_use]
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        team: TeamId,
        stats: UnitStats,
        cell: Cell,
        weapons: Vec<WeaponLoadoutEntry>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            stats,
            cell,
            health: Health::new(stats.max_health),
            fuel: Fuel::new(stats.max_fuel),
            weapons,
            finished: false,
            active: true,
            action_origin: cell,
        }
    }

    /// Active and with at least one squad member.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.active && !self.health.is_dead()
    }

    /// Alive and not yet acted this round.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.is_alive() && !self.finished
    }

    /// Terrain-cost class.
    #[must_use]
    pub const fn mobility(&self) -> MobilityClass {
        self.stats.unit_type.mobility()
    }

    /// Movement points available now: `min(move_range, fuel)`.
    #[must_use]
    pub fn movement_budget(&self) -> u32 {
        self.stats.move_range.min(self.fuel.current)
    }

    /// Whether `other` is on a different team.
    #[must_use]
    pub fn is_enemy_of(&self, other: &Self) -> bool {
        self.team != other.team
    }

    /// Primary (slot 0) weapon.
    #[must_use]
    pub fn primary_weapon(&self) -> Option<&WeaponLoadoutEntry> {
        self.weapons.first()
    }

    /// Primary weapon, mutably.
    pub fn primary_weapon_mut(&mut self) -> Option<&mut WeaponLoadoutEntry> {
        self.weapons.first_mut()
    }

    /// Ammunition left in the primary weapon.
    #[must_use]
    pub fn primary_ammo(&self) -> u32 {
        self.primary_weapon().map_or(0, |w| w.ammo)
    }
}
