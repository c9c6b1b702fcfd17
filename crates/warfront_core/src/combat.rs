//! Deterministic squad combat.
//!
//! Each side eliminates `effective attack / effective defense` members of the
//! other squad, rounded according to the quality-point differential between
//! the two positions. Both results are computed from the same pre-combat
//! snapshot and applied together, so a squad wiped out by the attack still
//! returns fire with its full pre-combat strength.
//!
//! The computation is split into [`plan_combat`] (pure, usable for previews)
//! and [`apply_outcome`] (mutation). [`resolve_combat`] does both.

use serde::{Deserialize, Serialize};

use crate::error::{AttackViolation, Result};
use crate::math::{fixed_serde, ratio, Fixed};
use crate::targeting::effective_range;
use crate::units::{Unit, UnitId};
use crate::world::World;

/// Hard ceiling on squad members eliminated by one side in one resolution.
pub const MAX_ELIMINATIONS: u32 = 10;

/// How a fractional elimination count becomes an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round up.
    Ceil,
    /// Round down.
    Floor,
    /// Round to nearest, halves up.
    Nearest,
}

impl RoundingMode {
    /// Round `num / den`. `den` must be positive.
    #[must_use]
    pub const fn divide(self, num: u64, den: u64) -> u64 {
        match self {
            Self::Floor => num / den,
            Self::Ceil => num.div_ceil(den),
            Self::Nearest => {
                let (whole, rem) = (num / den, num % den);
                // rem >= den - rem is 2 * rem >= den without overflowing
                if rem >= den - rem {
                    whole + 1
                } else {
                    whole
                }
            }
        }
    }
}

/// Rounding rules for one engagement, derived from the quality-point
/// differential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingPolicy {
    /// Mode for the attacker's eliminations.
    pub attacker: RoundingMode,
    /// Mode for the defender's eliminations.
    pub defender: RoundingMode,
    /// Added to the attacker's count instead of rounding when its ratio is
    /// an exact integer.
    pub attacker_exact_delta: i64,
    /// Added to the defender's count instead of rounding when its ratio is
    /// an exact integer.
    pub defender_exact_delta: i64,
}

impl RoundingPolicy {
    /// Policy for `diff = attacker quality points - defender quality points`.
    #[must_use]
    pub const fn for_differential(diff: i32) -> Self {
        use RoundingMode::{Ceil, Floor, Nearest};

        let (attacker, defender) = match diff {
            d if d >= 2 => (Ceil, Floor),
            0 | 1 => (Ceil, Nearest),
            -1 => (Nearest, Nearest),
            _ => (Floor, Ceil),
        };
        let attacker_exact_delta = match diff {
            d if d >= 0 => 1,
            -1 => 0,
            _ => -1,
        };

        Self {
            attacker,
            defender,
            attacker_exact_delta,
            defender_exact_delta: -attacker_exact_delta,
        }
    }
}

/// An elimination count before capping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eliminations {
    /// Unrounded ratio.
    pub raw: Fixed,
    /// Rounding applied (recorded even when the exact override fired).
    pub mode: RoundingMode,
    /// Whether the ratio was an exact integer and the delta replaced rounding.
    pub exact_override: bool,
    /// Resulting non-negative count.
    pub count: u64,
}

/// Eliminations inflicted by `attack` against `defense`.
///
/// `defense` is floored at 1. A zero attack eliminates nobody.
#[must_use]
pub fn eliminations(attack: u64, defense: u64, mode: RoundingMode, exact_delta: i64) -> Eliminations {
    let defense = defense.max(1);
    let raw = match (i64::try_from(attack), i64::try_from(defense)) {
        (Ok(a), Ok(d)) => ratio(a, d).unwrap_or(Fixed::MAX),
        _ => Fixed::MAX,
    };

    if attack == 0 {
        return Eliminations {
            raw,
            mode,
            exact_override: false,
            count: 0,
        };
    }

    if attack % defense == 0 {
        let whole = attack / defense;
        let count = if exact_delta >= 0 {
            whole.saturating_add(exact_delta.unsigned_abs())
        } else {
            whole.saturating_sub(exact_delta.unsigned_abs())
        };
        Eliminations {
            raw,
            mode,
            exact_override: true,
            count,
        }
    } else {
        Eliminations {
            raw,
            mode,
            exact_override: false,
            count: mode.divide(attack, defense),
        }
    }
}

/// Health times primary-weapon power.
#[must_use]
pub fn effective_attack(unit: &Unit) -> u64 {
    let power = unit.primary_weapon().map_or(0, |w| w.base_power());
    u64::from(unit.health.current) * u64::from(power)
}

/// Base defense plus the terrain bonus of the unit's cell, at least 1.
#[must_use]
pub fn effective_defense(world: &World, unit: &Unit) -> u64 {
    let total = i64::from(unit.stats.base_defense) + i64::from(world.terrain().defense_bonus(unit.cell));
    total.max(1).unsigned_abs()
}

/// What happened to one side of an engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideReport {
    /// Unit this report describes.
    pub unit: UnitId,
    /// Whether this side pulled the trigger.
    pub fired: bool,
    /// Primary-weapon ammunition before the engagement.
    pub ammo_before: u32,
    /// Primary-weapon ammunition after the engagement.
    pub ammo_after: u32,
    /// Squad size before the engagement.
    pub health_before: u32,
    /// Squad size after the engagement.
    pub health_after: u32,
    /// Effective attack used for this side's shot.
    pub effective_attack: u64,
    /// Effective defense of the unit this side shot at.
    pub target_defense: u64,
    /// Unrounded elimination ratio of this side's shot (zero if it held fire).
    #[serde(with = "fixed_serde")]
    pub raw_ratio: Fixed,
    /// Rounding mode applied to this side's shot.
    pub rounding: RoundingMode,
    /// Whether the exact-division override fired for this side's shot.
    pub exact_override: bool,
    /// Squad members this side eliminated, after the cap.
    pub eliminations: u32,
}

impl SideReport {
    /// Whether this side's squad was wiped out.
    #[must_use]
    pub const fn died(&self) -> bool {
        self.health_after == 0
    }
}

/// Full result of one resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Hex distance between the combatants.
    pub distance: u32,
    /// Attacker quality points minus defender quality points.
    pub quality_diff: i32,
    /// Whether the defender returned fire.
    pub retaliated: bool,
    /// Attacker's side.
    pub attacker: SideReport,
    /// Defender's side.
    pub defender: SideReport,
}

impl CombatOutcome {
    /// Units whose squads were wiped out, attacker first.
    #[must_use]
    pub fn casualties(&self) -> Vec<UnitId> {
        [&self.attacker, &self.defender]
            .into_iter()
            .filter(|side| side.died())
            .map(|side| side.unit)
            .collect()
    }
}

/// Check every precondition of an attack.
///
/// # Errors
///
/// Returns `GameError::UnknownUnit` for unregistered ids and
/// `GameError::IllegalAttack` naming the first violated rule.
pub fn validate_attack(world: &World, attacker: UnitId, defender: UnitId, has_moved: bool) -> Result<()> {
    let shooter = world.unit(attacker)?;
    let target = world.unit(defender)?;

    if attacker == defender {
        return Err(AttackViolation::SelfTarget.into());
    }
    if !shooter.is_alive() {
        return Err(AttackViolation::AttackerInactive.into());
    }
    if !target.is_alive() {
        return Err(AttackViolation::TargetInactive.into());
    }
    if !shooter.is_enemy_of(target) {
        return Err(AttackViolation::FriendlyTarget.into());
    }

    let Some(weapon) = shooter.primary_weapon().filter(|w| w.profile.is_some()) else {
        return Err(AttackViolation::NoWeapon.into());
    };
    if !weapon.has_ammo() {
        return Err(AttackViolation::NoAmmo.into());
    }

    let distance = shooter.cell.distance(target.cell);
    let in_range = effective_range(weapon, has_moved).is_some_and(|(min, max)| distance >= min && distance <= max);
    if !in_range {
        let (min, max) = effective_range(weapon, has_moved).unwrap_or((weapon.min_range, weapon.max_range));
        return Err(AttackViolation::OutOfRange { distance, min, max }.into());
    }
    Ok(())
}

/// Whether `defender` may return fire at `distance`.
#[must_use]
pub fn can_retaliate(defender: &Unit, distance: u32) -> bool {
    distance == 1
        && defender
            .primary_weapon()
            .is_some_and(|w| w.profile.is_some() && w.has_ammo() && w.covers(1))
}

/// Compute the outcome of an attack without touching the world.
///
/// # Errors
///
/// Same as [`validate_attack`].
pub fn plan_combat(world: &World, attacker: UnitId, defender: UnitId, has_moved: bool) -> Result<CombatOutcome> {
    validate_attack(world, attacker, defender, has_moved)?;
    let shooter = world.unit(attacker)?;
    let target = world.unit(defender)?;

    let distance = shooter.cell.distance(target.cell);
    let retaliated = can_retaliate(target, distance);
    let terrain = world.terrain();
    let quality_diff = terrain.quality_points(shooter.cell) - terrain.quality_points(target.cell);
    let policy = RoundingPolicy::for_differential(quality_diff);

    let cap = MAX_ELIMINATIONS
        .min(shooter.health.current)
        .min(target.health.current);

    let attack_a = effective_attack(shooter);
    let defense_d = effective_defense(world, target);
    let shot = eliminations(attack_a, defense_d, policy.attacker, policy.attacker_exact_delta);
    let inflicted_by_attacker = capped(shot.count, cap);

    let attack_d = effective_attack(target);
    let defense_a = effective_defense(world, shooter);
    let (return_fire, inflicted_by_defender) = if retaliated {
        let r = eliminations(attack_d, defense_a, policy.defender, policy.defender_exact_delta);
        let count = capped(r.count, cap);
        (r, count)
    } else {
        (
            Eliminations {
                raw: Fixed::ZERO,
                mode: policy.defender,
                exact_override: false,
                count: 0,
            },
            0,
        )
    };

    let attacker_ammo = shooter.primary_ammo();
    let defender_ammo = target.primary_ammo();

    Ok(CombatOutcome {
        distance,
        quality_diff,
        retaliated,
        attacker: SideReport {
            unit: attacker,
            fired: true,
            ammo_before: attacker_ammo,
            ammo_after: attacker_ammo.saturating_sub(1),
            health_before: shooter.health.current,
            health_after: shooter.health.current.saturating_sub(inflicted_by_defender),
            effective_attack: attack_a,
            target_defense: defense_d,
            raw_ratio: shot.raw,
            rounding: shot.mode,
            exact_override: shot.exact_override,
            eliminations: inflicted_by_attacker,
        },
        defender: SideReport {
            unit: defender,
            fired: retaliated,
            ammo_before: defender_ammo,
            ammo_after: if retaliated {
                defender_ammo.saturating_sub(1)
            } else {
                defender_ammo
            },
            health_before: target.health.current,
            health_after: target.health.current.saturating_sub(inflicted_by_attacker),
            effective_attack: if retaliated { attack_d } else { 0 },
            target_defense: defense_a,
            raw_ratio: return_fire.raw,
            rounding: return_fire.mode,
            exact_override: return_fire.exact_override,
            eliminations: inflicted_by_defender,
        },
    })
}

fn capped(count: u64, cap: u32) -> u32 {
    u32::try_from(count).map_or(cap, |c| c.min(cap))
}

/// Write a planned outcome into the world.
///
/// # Errors
///
/// Returns `GameError::UnknownUnit` if either unit has been unregistered.
pub fn apply_outcome(world: &mut World, outcome: &CombatOutcome) -> Result<()> {
    for side in [&outcome.attacker, &outcome.defender] {
        let unit = world.unit_mut(side.unit)?;
        if side.fired {
            if let Some(weapon) = unit.primary_weapon_mut() {
                weapon.spend_ammo();
            }
        }
        let lost = side.health_before.saturating_sub(side.health_after);
        unit.health.apply_eliminations(lost);
    }
    Ok(())
}

/// Validate, compute and apply an attack.
///
/// Illegal attacks are logged at error level: callers are expected to have
/// chosen the target from [`crate::targeting::valid_targets`].
///
/// # Errors
///
/// Same as [`validate_attack`]. No state is changed on error.
pub fn resolve_combat(world: &mut World, attacker: UnitId, defender: UnitId, has_moved: bool) -> Result<CombatOutcome> {
    let outcome = match plan_combat(world, attacker, defender, has_moved) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(%attacker, %defender, has_moved, %err, "Attack rejected by resolver");
            return Err(err);
        }
    };

    apply_outcome(world, &outcome)?;

    tracing::info!(
        %attacker,
        %defender,
        distance = outcome.distance,
        quality_diff = outcome.quality_diff,
        dealt = outcome.attacker.eliminations,
        taken = outcome.defender.eliminations,
        retaliated = outcome.retaliated,
        "Combat resolved"
    );
    for unit in outcome.casualties() {
        tracing::info!(%unit, "Squad eliminated");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::hex::Cell;
    use crate::terrain::{PositionQuality, TerrainCategory, TerrainIndex, TerrainProfile};
    use crate::units::{TeamId, Trajectory, UnitStats, WeaponLoadoutEntry, WeaponProfile};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn gun(power: u32, ammo: u32, min_range: u32, max_range: u32) -> WeaponLoadoutEntry {
        let profile = Arc::new(WeaponProfile {
            name: format!("gun{power}"),
            base_power: power,
            trajectory: Trajectory::Straight,
            projectile_speed: 20,
        });
        WeaponLoadoutEntry::new(profile, ammo, min_range, max_range)
    }

    fn stats(health: u32, defense: i32) -> UnitStats {
        UnitStats {
            max_health: health,
            base_defense: defense,
            ..UnitStats::default()
        }
    }

    /// Board with a column of quality presets along row 0.
    fn board() -> TerrainIndex {
        let mut terrain = TerrainIndex::new(8, 4);
        let presets = [
            PositionQuality::Unfavorable,
            PositionQuality::Standard,
            PositionQuality::Improved,
            PositionQuality::Favorable,
            PositionQuality::Unique,
        ];
        for (i, quality) in presets.into_iter().enumerate() {
            let index = terrain
                .add_profile(TerrainProfile::new(format!("{quality:?}"), TerrainCategory::Plain, quality))
                .unwrap();
            assert!(terrain.set_profile(Cell::new(i as i32, 0), index));
        }
        terrain
    }

    fn duel(
        attacker: (UnitStats, WeaponLoadoutEntry, Cell),
        defender: (UnitStats, WeaponLoadoutEntry, Cell),
    ) -> (World, UnitId, UnitId) {
        let mut world = World::new(board());
        let a = world.spawn("attacker", TeamId(0), attacker.0, attacker.2, vec![attacker.1]).unwrap();
        let d = world.spawn("defender", TeamId(1), defender.0, defender.2, vec![defender.1]).unwrap();
        (world, a, d)
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(RoundingMode::Ceil.divide(16, 5), 4);
        assert_eq!(RoundingMode::Floor.divide(16, 5), 3);
        assert_eq!(RoundingMode::Nearest.divide(16, 5), 3);
        assert_eq!(RoundingMode::Nearest.divide(5, 2), 3);
        assert_eq!(RoundingMode::Nearest.divide(7, 5), 1);
        assert_eq!(RoundingMode::Nearest.divide(8, 5), 2);
        assert_eq!(RoundingMode::Nearest.divide(u64::MAX, 2), u64::MAX / 2 + 1);
        assert_eq!(RoundingMode::Nearest.divide(u64::MAX - 3, u64::MAX), 1);
        assert_eq!(RoundingMode::Ceil.divide(u64::MAX, 7), u64::MAX / 7 + 1);
    }

    #[test]
    fn test_policy_table() {
        use RoundingMode::*;

        let p = RoundingPolicy::for_differential(3);
        assert_eq!((p.attacker, p.defender, p.attacker_exact_delta, p.defender_exact_delta), (Ceil, Floor, 1, -1));
        let p = RoundingPolicy::for_differential(1);
        assert_eq!((p.attacker, p.defender, p.attacker_exact_delta), (Ceil, Nearest, 1));
        let p = RoundingPolicy::for_differential(0);
        assert_eq!((p.attacker, p.defender, p.attacker_exact_delta), (Ceil, Nearest, 1));
        let p = RoundingPolicy::for_differential(-1);
        assert_eq!((p.attacker, p.defender, p.attacker_exact_delta, p.defender_exact_delta), (Nearest, Nearest, 0, 0));
        let p = RoundingPolicy::for_differential(-4);
        assert_eq!((p.attacker, p.defender, p.attacker_exact_delta, p.defender_exact_delta), (Floor, Ceil, -1, 1));
    }

    #[test]
    fn test_exact_division_override() {
        let e = eliminations(40, 10, RoundingMode::Ceil, 1);
        assert!(e.exact_override);
        assert_eq!(e.count, 5);
        assert_eq!(e.raw, Fixed::from_num(4));

        let e = eliminations(10, 10, RoundingMode::Floor, -1);
        assert_eq!(e.count, 0);
        let e = eliminations(0, 10, RoundingMode::Ceil, 1);
        assert_eq!(e.count, 0);
        assert!(!e.exact_override);
    }

    #[test]
    fn test_exact_ratio_with_improved_position() {
        // 10 members x power 4 = 40 against defense 10, diff = 2 - 1 = 1
        let (mut world, a, d) = duel(
            (stats(10, 8), gun(4, 3, 1, 1), Cell::new(2, 0)),
            (stats(10, 10), gun(1, 3, 1, 1), Cell::new(1, 1)),
        );
        assert_eq!(world.terrain().quality_points(Cell::new(1, 1)), 1);

        let outcome = resolve_combat(&mut world, a, d, false).unwrap();
        assert_eq!(outcome.quality_diff, 1);
        assert!(outcome.attacker.exact_override);
        assert_eq!(outcome.attacker.eliminations, 5);
        assert_eq!(world.get(d).unwrap().health.current, 5);
    }

    #[test]
    fn test_fractional_ratio_rounds_up_for_strong_position() {
        // 4 members x power 4 = 16 against defense 5 is 3.2, diff = 4 - 1 = 3
        let (world, a, d) = duel(
            (stats(4, 8), gun(4, 3, 1, 3), Cell::new(4, 0)),
            (stats(10, 5), gun(1, 3, 1, 1), Cell::new(2, 2)),
        );
        let outcome = plan_combat(&world, a, d, false).unwrap();
        assert_eq!(outcome.quality_diff, 3);
        assert_eq!(outcome.attacker.rounding, RoundingMode::Ceil);
        assert!(!outcome.attacker.exact_override);
        assert_eq!(outcome.attacker.raw_ratio, Fixed::from_num(16) / Fixed::from_num(5));
        assert_eq!(outcome.attacker.eliminations, 4);
        assert!(!outcome.retaliated);
    }

    #[test]
    fn test_cap_at_ten_and_health() {
        let (world, a, d) = duel(
            (stats(20, 8), gun(50, 3, 1, 1), Cell::new(1, 2)),
            (stats(30, 1), gun(50, 3, 1, 1), Cell::new(2, 2)),
        );
        let outcome = plan_combat(&world, a, d, false).unwrap();
        assert_eq!(outcome.attacker.eliminations, MAX_ELIMINATIONS);
        assert_eq!(outcome.defender.eliminations, MAX_ELIMINATIONS);

        let (world, a, d) = duel(
            (stats(3, 8), gun(50, 3, 1, 1), Cell::new(1, 2)),
            (stats(30, 1), gun(50, 3, 1, 1), Cell::new(2, 2)),
        );
        let outcome = plan_combat(&world, a, d, false).unwrap();
        assert_eq!(outcome.attacker.eliminations, 3);
        assert_eq!(outcome.defender.eliminations, 3);
    }

    #[test]
    fn test_huge_squads_round_without_overflow() {
        // 3.1e9 x 3.1e9 is past i64::MAX; the defender rounds to nearest at diff 0.
        let huge = 3_100_000_000;
        let (world, a, d) = duel(
            (stats(10, 7), gun(4, 3, 1, 1), Cell::new(1, 2)),
            (stats(huge, 1), gun(huge, 3, 1, 1), Cell::new(2, 2)),
        );
        let outcome = plan_combat(&world, a, d, false).unwrap();
        assert_eq!(outcome.quality_diff, 0);
        assert!(outcome.retaliated);
        assert_eq!(outcome.defender.rounding, RoundingMode::Nearest);
        assert_eq!(outcome.defender.effective_attack, u64::from(huge) * u64::from(huge));
        assert_eq!(outcome.defender.raw_ratio, Fixed::MAX);
        assert_eq!(outcome.defender.eliminations, 10);
        assert_eq!(outcome.attacker.eliminations, 10);
    }

    #[test]
    fn test_simultaneous_application() {
        // Both squads wipe each other out; the defender still fires at full strength.
        let (mut world, a, d) = duel(
            (stats(2, 1), gun(10, 3, 1, 1), Cell::new(1, 2)),
            (stats(2, 1), gun(10, 3, 1, 1), Cell::new(2, 2)),
        );
        let outcome = resolve_combat(&mut world, a, d, false).unwrap();
        assert!(outcome.retaliated);
        assert_eq!(outcome.casualties(), vec![a, d]);
        assert!(!world.get(a).unwrap().is_alive());
        assert!(!world.get(d).unwrap().is_alive());
    }

    #[test]
    fn test_no_retaliation_at_range_or_without_ammo() {
        let (world, a, d) = duel(
            (stats(10, 8), gun(4, 3, 1, 3), Cell::new(1, 2)),
            (stats(10, 8), gun(4, 3, 1, 3), Cell::new(3, 2)),
        );
        let outcome = plan_combat(&world, a, d, false).unwrap();
        assert_eq!(outcome.distance, 2);
        assert!(!outcome.retaliated);
        assert_eq!(outcome.defender.ammo_after, outcome.defender.ammo_before);

        let (world, a, d) = duel(
            (stats(10, 8), gun(4, 3, 1, 1), Cell::new(1, 2)),
            (stats(10, 8), gun(4, 0, 1, 1), Cell::new(2, 2)),
        );
        assert!(!plan_combat(&world, a, d, false).unwrap().retaliated);

        // min range 2 cannot answer at distance 1
        let (world, a, d) = duel(
            (stats(10, 8), gun(4, 3, 1, 1), Cell::new(1, 2)),
            (stats(10, 8), gun(4, 3, 2, 3), Cell::new(2, 2)),
        );
        assert!(!plan_combat(&world, a, d, false).unwrap().retaliated);
    }

    #[test]
    fn test_illegal_attacks_leave_world_untouched() {
        let (mut world, a, d) = duel(
            (stats(10, 8), gun(4, 0, 1, 1), Cell::new(1, 2)),
            (stats(10, 8), gun(4, 3, 1, 1), Cell::new(2, 2)),
        );
        let before = world.state_hash();
        let err = resolve_combat(&mut world, a, d, false).unwrap_err();
        assert!(matches!(err, GameError::IllegalAttack(AttackViolation::NoAmmo)));
        assert_eq!(world.state_hash(), before);

        let err = resolve_combat(&mut world, d, d, false).unwrap_err();
        assert!(matches!(err, GameError::IllegalAttack(AttackViolation::SelfTarget)));

        world.unit_mut(a).unwrap().health.apply_eliminations(10);
        let err = resolve_combat(&mut world, d, a, false).unwrap_err();
        assert!(matches!(err, GameError::IllegalAttack(AttackViolation::TargetInactive)));
    }

    #[test]
    fn test_out_of_range_after_moving() {
        let (world, a, d) = duel(
            (stats(10, 8), gun(4, 3, 1, 3), Cell::new(1, 2)),
            (stats(10, 8), gun(4, 3, 1, 1), Cell::new(3, 2)),
        );
        assert!(validate_attack(&world, a, d, false).is_ok());
        let err = validate_attack(&world, a, d, true).unwrap_err();
        assert!(matches!(
            err,
            GameError::IllegalAttack(AttackViolation::OutOfRange { distance: 2, min: 1, max: 1 })
        ));
    }

    #[test]
    fn test_friendly_and_missing_weapon() {
        let mut world = World::new(board());
        let a = world
            .spawn("a", TeamId(0), stats(10, 8), Cell::new(1, 2), vec![gun(4, 3, 1, 1)])
            .unwrap();
        let b = world.spawn("b", TeamId(0), stats(10, 8), Cell::new(2, 2), Vec::new()).unwrap();
        let c = world.spawn("c", TeamId(1), stats(10, 8), Cell::new(1, 3), Vec::new()).unwrap();

        assert!(matches!(
            validate_attack(&world, a, b, false),
            Err(GameError::IllegalAttack(AttackViolation::FriendlyTarget))
        ));
        assert!(matches!(
            validate_attack(&world, c, a, false),
            Err(GameError::IllegalAttack(AttackViolation::NoWeapon))
        ));
        assert!(matches!(validate_attack(&world, a, UnitId(42), false), Err(GameError::UnknownUnit(_))));
    }

    #[test]
    fn test_defense_floor() {
        let mut world = World::new(board());
        let id = world
            .spawn("weak", TeamId(0), stats(10, -5), Cell::new(0, 0), Vec::new())
            .unwrap();
        assert_eq!(effective_defense(&world, world.get(id).unwrap()), 1);
    }

    proptest! {
        #[test]
        fn prop_eliminations_capped_and_ammo_conserved(
            a_health in 1u32..40,
            d_health in 1u32..40,
            a_power in 0u32..60,
            d_power in 0u32..60,
            a_def in -3i32..20,
            d_def in -3i32..20,
            a_col in 0i32..5,
            d_ammo in 0u32..3,
        ) {
            let (mut world, a, d) = duel(
                (stats(a_health, a_def), gun(a_power, 2, 1, 1), Cell::new(a_col, 0)),
                (stats(d_health, d_def), gun(d_power, d_ammo, 1, 1), Cell::new(a_col, 1)),
            );
            let outcome = resolve_combat(&mut world, a, d, false).unwrap();
            let cap = MAX_ELIMINATIONS.min(a_health).min(d_health);

            prop_assert!(outcome.attacker.eliminations <= cap);
            prop_assert!(outcome.defender.eliminations <= cap);

            let attacker = world.get(a).unwrap();
            let defender = world.get(d).unwrap();
            prop_assert_eq!(attacker.primary_ammo(), 1);
            prop_assert_eq!(outcome.retaliated, d_ammo > 0);
            let expected_defender_ammo = if outcome.retaliated { d_ammo - 1 } else { d_ammo };
            prop_assert_eq!(defender.primary_ammo(), expected_defender_ammo);

            prop_assert_eq!(defender.health.current, d_health - outcome.attacker.eliminations);
            prop_assert_eq!(attacker.health.current, a_health - outcome.defender.eliminations);
        }

        #[test]
        fn prop_simultaneous_snapshot(
            a_health in 1u32..20,
            d_health in 1u32..20,
            a_power in 1u32..30,
            d_power_1 in 1u32..30,
            d_power_2 in 1u32..30,
        ) {
            // The defender's loss depends only on the attacker's pre-combat
            // strength, whatever the defender fires back with.
            let plan = |d_power: u32| {
                let (world, a, d) = duel(
                    (stats(a_health, 4), gun(a_power, 2, 1, 1), Cell::new(1, 2)),
                    (stats(d_health, 4), gun(d_power, 2, 1, 1), Cell::new(2, 2)),
                );
                plan_combat(&world, a, d, false).unwrap()
            };
            let first = plan(d_power_1);
            let second = plan(d_power_2);
            prop_assert_eq!(first.defender.health_after, second.defender.health_after);
            prop_assert_eq!(first.attacker.eliminations, second.attacker.eliminations);
        }
    }
}
