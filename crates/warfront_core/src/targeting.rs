//! Enumeration of valid enemy targets.
//!
//! After moving, long-range weapons are restricted: anything with a minimum
//! range above 1 cannot fire at all, and anything reaching beyond 1 is
//! clamped to point-blank range.

use std::collections::BTreeSet;

use crate::units::{Unit, UnitId, WeaponLoadoutEntry};
use crate::world::World;

/// Effective `(min, max)` range of a weapon given the movement state, or
/// `None` if the weapon cannot fire.
#[must_use]
pub fn effective_range(weapon: &WeaponLoadoutEntry, has_moved: bool) -> Option<(u32, u32)> {
    if !weapon.has_ammo() {
        return None;
    }
    if !has_moved {
        return Some((weapon.min_range, weapon.max_range));
    }
    if weapon.min_range > 1 {
        return None;
    }
    if weapon.max_range > 1 {
        return Some((1, 1));
    }
    Some((weapon.min_range, weapon.max_range))
}

/// Every live enemy within range of any usable weapon of `shooter`.
///
/// Returns ids in ascending order without duplicates.
#[must_use]
pub fn valid_targets(world: &World, shooter: &Unit, has_moved: bool) -> Vec<UnitId> {
    let ranges: Vec<(u32, u32)> = shooter
        .weapons
        .iter()
        .filter_map(|w| effective_range(w, has_moved))
        .collect();

    if ranges.is_empty() || !shooter.is_alive() {
        tracing::debug!(unit = %shooter.id, has_moved, "No usable weapons");
        return Vec::new();
    }

    let targets: BTreeSet<UnitId> = world
        .live_units()
        .filter(|other| other.is_enemy_of(shooter))
        .filter(|other| {
            let distance = shooter.cell.distance(other.cell);
            ranges.iter().any(|&(min, max)| distance >= min && distance <= max)
        })
        .map(|other| other.id)
        .collect();

    tracing::debug!(unit = %shooter.id, has_moved, targets = targets.len(), "Scanned targets");
    targets.into_iter().collect()
}
