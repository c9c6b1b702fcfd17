//! Test fixtures and helpers.
//!
//! Pre-built worlds, weapons and sessions for consistent testing.

use std::sync::Arc;

use warfront_core::config::CoreConfig;
use warfront_core::data::ScenarioData;
use warfront_core::hex::Cell;
use warfront_core::sequence::RecordingSink;
use warfront_core::session::Session;
use warfront_core::terrain::{PositionQuality, TerrainCategory, TerrainIndex, TerrainProfile};
use warfront_core::units::{TeamId, Trajectory, UnitId, UnitStats, UnitType, WeaponLoadoutEntry, WeaponProfile};
use warfront_core::world::World;

/// Team controlled by the player in every fixture.
pub const PLAYER: TeamId = TeamId(0);

/// Opposing team in every fixture.
pub const ENEMY: TeamId = TeamId(1);

/// A small scenario with mixed terrain and two squads per side.
pub const SKIRMISH_RON: &str = r#"ScenarioData(
    name: "Skirmish",
    terrain: [
        TerrainProfile(name: "plain", category: Plain),
        TerrainProfile(name: "forest", category: Forest, quality: Improved),
        TerrainProfile(name: "hill", category: Mountain, quality: Favorable),
        TerrainProfile(name: "sea", category: Water, quality: Unfavorable),
    ],
    weapons: [
        WeaponProfile(name: "rifle", base_power: 4),
        WeaponProfile(name: "mortar", base_power: 6, trajectory: Parabolic),
    ],
    units: [
        UnitProfileData(
            id: "rifles",
            name: "Rifle Squad",
            unit_type: Infantry,
            move_range: 3,
            weapons: [WeaponSlotData(weapon: "rifle", ammo: 6)],
        ),
        UnitProfileData(
            id: "mortars",
            name: "Mortar Team",
            unit_type: Infantry,
            move_range: 2,
            defense: 6,
            weapons: [WeaponSlotData(weapon: "mortar", ammo: 3, min_range: 2, max_range: 3)],
        ),
    ],
    map: MapData(
        legend: { '.': "plain", 'f': "forest", 'h': "hill", '~': "sea" },
        rows: [
            "..f....~",
            ".ff..h.~",
            "....hh..",
            "..f.....",
            "........",
        ],
    ),
    placements: [
        UnitPlacement(profile: "rifles", team: (0), cell: (col: 0, row: 0)),
        UnitPlacement(profile: "mortars", team: (0), cell: (col: 0, row: 2)),
        UnitPlacement(profile: "rifles", team: (1), cell: (col: 6, row: 0), name: Some("Enemy Rifles")),
        UnitPlacement(profile: "mortars", team: (1), cell: (col: 6, row: 3)),
    ],
)"#;

/// Parse [`SKIRMISH_RON`].
///
/// # Panics
///
/// Panics if the fixture text no longer parses.
#[must_use]
pub fn skirmish_scenario() -> ScenarioData {
    ScenarioData::from_ron_str(SKIRMISH_RON, "skirmish.ron").expect("skirmish fixture parses")
}

/// Build the world of [`SKIRMISH_RON`].
///
/// # Panics
///
/// Panics if the fixture no longer builds.
#[must_use]
pub fn skirmish_world() -> World {
    World::from_scenario(&skirmish_scenario()).expect("skirmish fixture builds")
}

/// An all-plain board.
#[must_use]
pub fn open_field(width: u32, height: u32) -> World {
    World::new(TerrainIndex::new(width, height))
}

/// A forest profile with improved position quality.
#[must_use]
pub fn forest() -> TerrainProfile {
    TerrainProfile::new("forest", TerrainCategory::Forest, PositionQuality::Improved)
}

/// A weapon with explicit power, ammunition and range.
#[must_use]
pub fn gun(power: u32, ammo: u32, min_range: u32, max_range: u32) -> WeaponLoadoutEntry {
    let profile = Arc::new(WeaponProfile {
        name: format!("gun{power}"),
        base_power: power,
        trajectory: Trajectory::Straight,
        projectile_speed: 20,
    });
    WeaponLoadoutEntry::new(profile, ammo, min_range, max_range)
}

/// The standard adjacent-only rifle.
#[must_use]
pub fn rifle(ammo: u32) -> WeaponLoadoutEntry {
    gun(4, ammo, 1, 1)
}

/// Infantry stats with the given movement range and fuel.
#[must_use]
pub fn infantry(move_range: u32, fuel: u32) -> UnitStats {
    UnitStats {
        unit_type: UnitType::Infantry,
        move_range,
        max_fuel: fuel,
        ..UnitStats::default()
    }
}

/// Spawn a default infantry squad.
///
/// # Panics
///
/// Panics if the cell is off the board or occupied.
pub fn squad(world: &mut World, team: TeamId, cell: Cell, weapons: Vec<WeaponLoadoutEntry>) -> UnitId {
    spawn(world, team, UnitStats::default(), cell, weapons)
}

/// Spawn a unit with explicit stats.
///
/// # Panics
///
/// Panics if the cell is off the board or occupied.
pub fn spawn(world: &mut World, team: TeamId, stats: UnitStats, cell: Cell, weapons: Vec<WeaponLoadoutEntry>) -> UnitId {
    let name = format!("team{}@{cell}", team.0);
    world.spawn(name, team, stats, cell, weapons).expect("fixture spawn")
}

/// Two rifle squads facing each other across an 8x4 field: the player's at
/// (0,0), the enemy's at (4,0).
#[must_use]
pub fn duel() -> (World, UnitId, UnitId) {
    let mut world = open_field(8, 4);
    let player = squad(&mut world, PLAYER, Cell::new(0, 0), vec![rifle(6)]);
    let enemy = squad(&mut world, ENEMY, Cell::new(4, 0), vec![rifle(6)]);
    (world, player, enemy)
}

/// A recording session over `world` with default configuration.
#[must_use]
pub fn recording_session(world: World) -> Session<RecordingSink> {
    Session::new(world, CoreConfig::default(), RecordingSink::default())
}
