//! Scenario validation.
//!
//! Validation builds the world exactly as a session would and reports every
//! data-integrity substitution the builder makes along the way. Hard errors
//! (unparseable RON, ragged map rows) fail the run; substitutions are
//! reported as issues.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use warfront_core::config::CoreConfig;
use warfront_core::data::ScenarioData;
use warfront_core::world::World;

use crate::error::Result;
use crate::loader;

/// Outcome of validating one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Scenario name.
    pub scenario: String,
    /// Board width in cells.
    pub width: u32,
    /// Board height in cells.
    pub height: u32,
    /// Units placed successfully.
    pub units: usize,
    /// Data-integrity issues found.
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Whether the scenario loads without substitutions.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut dupes: Vec<&str> = names.filter(|name| !seen.insert(*name)).collect();
    dupes.sort_unstable();
    dupes.dedup();
    dupes
}

/// Validate a parsed scenario.
///
/// # Errors
///
/// Returns `ToolError::Game` if the world cannot be built at all.
pub fn validate_scenario(scenario: &ScenarioData, config: &CoreConfig) -> Result<ValidationReport> {
    let mut issues = Vec::new();

    for id in duplicates(scenario.units.iter().map(|u| u.id.as_str())) {
        issues.push(format!("unit profile '{id}' is defined more than once"));
    }
    for name in duplicates(scenario.weapons.iter().map(|w| w.name.as_str())) {
        issues.push(format!("weapon '{name}' is defined more than once"));
    }

    for profile in &scenario.units {
        for slot in &profile.weapons {
            if scenario.weapon(&slot.weapon).is_none() {
                issues.push(format!(
                    "unit profile '{}' mounts unknown weapon '{}' (no power, no ammo)",
                    profile.id, slot.weapon
                ));
            }
            if slot.min_range > slot.max_range {
                issues.push(format!(
                    "unit profile '{}' weapon '{}' has min range {} above max range {}",
                    profile.id, slot.weapon, slot.min_range, slot.max_range
                ));
            }
        }
    }

    let world = World::from_scenario(scenario)?;

    let mut occupied = BTreeSet::new();
    for placement in &scenario.placements {
        let cell = placement.cell;
        if scenario.unit_profile(&placement.profile).is_none() {
            issues.push(format!("placement at {cell} uses unknown profile '{}'", placement.profile));
        } else if !world.terrain().on_board(cell) {
            issues.push(format!("placement '{}' at {cell} is off the board", placement.profile));
        } else if !occupied.insert(cell) {
            issues.push(format!("placement '{}' at {cell} overlaps another unit", placement.profile));
        }
    }

    if world.ready_units(config.player_team).next().is_none() {
        issues.push(format!("{} has no units", config.player_team));
    }

    for issue in &issues {
        tracing::warn!(scenario = %scenario.name, "{issue}");
    }

    Ok(ValidationReport {
        scenario: scenario.name.clone(),
        width: world.terrain().width(),
        height: world.terrain().height(),
        units: world.units().count(),
        issues,
    })
}

/// Load and validate a scenario file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or built.
pub fn validate_file(path: &Path, config: &CoreConfig) -> Result<ValidationReport> {
    let scenario = loader::load_scenario(path)?;
    validate_scenario(&scenario, config)
}
