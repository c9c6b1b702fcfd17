//! Session: the single driver that turns player intents into state changes.
//!
//! A session owns the world, one [`TurnController`] per unit, the pending
//! step queue and the combat log. Only one unit is ever mid-turn. While a
//! step sequence is in flight every intent is rejected except `Cancel`,
//! which is silently ignored.
//!
//! ```no_run
//! use warfront_core::prelude::*;
//!
//! # fn run(world: World) -> Result<()> {
//! let mut session = Session::headless(world, CoreConfig::default());
//! session.handle(Intent::SelectAt(Cell::new(0, 0)))?;
//! session.handle(Intent::SelectAt(Cell::new(2, 0)))?;
//! session.settle()?;
//! session.handle(Intent::Confirm)?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::{self, CombatOutcome};
use crate::combat_log::CombatLog;
use crate::config::CoreConfig;
use crate::error::{GameError, Result};
use crate::hex::Cell;
use crate::pathfinding::{stop_filtered, PathPlanner};
use crate::sequence::{self, JoinPoint, Mutation, NullSink, PresentationSink, Step};
use crate::targeting::valid_targets;
use crate::turn::{CancelAction, ConfirmAction, MovePlan, TurnController, TurnState};
use crate::units::UnitId;
use crate::world::World;

/// Direction for cycling through units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Next unit by id.
    Next,
    /// Previous unit by id.
    Previous,
}

/// A discrete player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Click or tap on a cell.
    SelectAt(Cell),
    /// Accept the current prompt.
    Confirm,
    /// Back out of the current prompt.
    Cancel,
    /// Move the cursor to another ready unit.
    CycleUnit(Direction),
    /// Choose a cached target by index.
    PickTarget(usize),
    /// End the turn after moving, without attacking.
    MoveOnly,
    /// Start a new round.
    ResetRound,
}

impl Intent {
    /// Short name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectAt(_) => "SelectAt",
            Self::Confirm => "Confirm",
            Self::Cancel => "Cancel",
            Self::CycleUnit(_) => "CycleUnit",
            Self::PickTarget(_) => "PickTarget",
            Self::MoveOnly => "MoveOnly",
            Self::ResetRound => "ResetRound",
        }
    }
}

/// Result of an accepted intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The intent changed something.
    Accepted,
    /// The intent was valid but had no effect.
    Ignored,
}

/// Result of [`Session::pump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// No steps remain.
    Settled,
    /// Presentation should catch up before the next pump.
    Waiting {
        /// The join point reached.
        join: JoinPoint,
        /// How long presentation asked for.
        wait: Duration,
    },
}

/// One scenario in play.
#[derive(Debug)]
pub struct Session<S = NullSink> {
    world: World,
    config: CoreConfig,
    sink: S,
    controllers: BTreeMap<UnitId, TurnController>,
    focus: Option<UnitId>,
    cursor: Option<Cell>,
    queue: VecDeque<Step>,
    log: CombatLog,
}

impl Session<NullSink> {
    /// A session without presentation.
    #[must_use]
    pub fn headless(world: World, config: CoreConfig) -> Self {
        Self::new(world, config, NullSink)
    }
}

impl<S: PresentationSink> Session<S> {
    /// Create a session over `world`.
    #[must_use]
    pub fn new(world: World, config: CoreConfig, sink: S) -> Self {
        let controllers = world.units().map(|u| (u.id, TurnController::new(u.id))).collect();
        Self {
            world,
            config,
            sink,
            controllers,
            focus: None,
            cursor: None,
            queue: VecDeque::new(),
            log: CombatLog::new(),
        }
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The presentation sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The presentation sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Every resolved attack so far.
    #[must_use]
    pub const fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Last cell the cursor was placed on.
    #[must_use]
    pub const fn cursor(&self) -> Option<Cell> {
        self.cursor
    }

    /// Unit currently selected or inspected.
    #[must_use]
    pub const fn focus(&self) -> Option<UnitId> {
        self.focus
    }

    /// Controller of a unit.
    #[must_use]
    pub fn controller(&self, unit: UnitId) -> Option<&TurnController> {
        self.controllers.get(&unit)
    }

    /// Turn state of a unit (`Idle` for unknown ids).
    #[must_use]
    pub fn state_of(&self, unit: UnitId) -> TurnState {
        self.controllers.get(&unit).map_or(TurnState::Idle, TurnController::state)
    }

    /// Turn state of the focused unit, or `Idle`.
    #[must_use]
    pub fn focus_state(&self) -> TurnState {
        self.focus.map_or(TurnState::Idle, |id| self.state_of(id))
    }

    /// Whether a step sequence is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Path planner configured for this session.
    #[must_use]
    pub fn planner(&self) -> PathPlanner<'_> {
        PathPlanner::new(self.world.terrain())
            .with_threshold(self.config.impassable_threshold)
            .with_order(self.config.expansion)
    }

    /// Cells `unit` may end a move on from its current cell.
    ///
    /// # Errors
    ///
    /// Fails if the unit is unknown or dead.
    pub fn reachable_tiles(&self, unit: UnitId) -> Result<Vec<Cell>> {
        let unit = self.world.live_unit(unit)?;
        Ok(self.planner().reachable_tiles(
            unit.cell,
            unit.movement_budget(),
            &self.world.movement_blockers(unit),
            &self.world.stopping_blockers(unit),
            unit.mobility(),
        ))
    }

    /// Cells `unit` may pass through, including allied-occupied cells.
    ///
    /// # Errors
    ///
    /// Fails if the unit is unknown or dead.
    pub fn navigable_tiles(&self, unit: UnitId) -> Result<Vec<Cell>> {
        let unit = self.world.live_unit(unit)?;
        Ok(self.planner().navigable_tiles(
            unit.cell,
            unit.movement_budget(),
            &self.world.movement_blockers(unit),
            unit.mobility(),
        ))
    }

    /// Predicted outcome of the attack awaiting confirmation.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the focused unit is `ConfirmingTarget`;
    /// otherwise as [`combat::plan_combat`].
    pub fn preview_attack(&self) -> Result<CombatOutcome> {
        let controller = self.focused_controller("preview attack")?;
        match (controller.state(), controller.target()) {
            (TurnState::ConfirmingTarget, Some(target)) => {
                combat::plan_combat(&self.world, controller.unit(), target, controller.has_moved())
            }
            (state, _) => Err(GameError::IllegalTransition {
                state: state.to_string(),
                intent: "preview attack".into(),
            }),
        }
    }

    /// Handle one intent.
    ///
    /// Rejections are logged, reported to the sink and returned; the state is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// `IllegalTransition`, `IllegalMove`, `IllegalAttack` or `InvalidState`
    /// describing why the intent was refused.
    pub fn handle(&mut self, intent: Intent) -> Result<IntentOutcome> {
        let result = self.dispatch(intent);
        match &result {
            Ok(outcome) => tracing::debug!(intent = ?intent, ?outcome, "Intent handled"),
            Err(err) => {
                tracing::warn!(intent = ?intent, %err, "Intent rejected");
                self.sink.notify_rejected(err);
            }
        }
        result
    }

    fn dispatch(&mut self, intent: Intent) -> Result<IntentOutcome> {
        if self.is_busy() {
            return match intent {
                Intent::Cancel => Ok(IntentOutcome::Ignored),
                _ => Err(self.illegal(intent)),
            };
        }

        match intent {
            Intent::SelectAt(cell) => self.select_at(cell),
            Intent::Confirm => self.confirm(),
            Intent::Cancel => self.cancel(),
            Intent::CycleUnit(direction) => self.cycle(direction),
            Intent::PickTarget(index) => {
                let unit = self.focused_unit(intent)?;
                self.pick_target(unit, index)
            }
            Intent::MoveOnly => {
                let unit = self.focused_unit(intent)?;
                self.controller_mut(unit)?.move_only()?;
                self.complete_turn(unit)?;
                Ok(IntentOutcome::Accepted)
            }
            Intent::ResetRound => self.reset_round(),
        }
    }

    fn illegal(&self, intent: Intent) -> GameError {
        GameError::IllegalTransition {
            state: self.focus_state().to_string(),
            intent: intent.name().into(),
        }
    }

    fn focused_unit(&self, intent: Intent) -> Result<UnitId> {
        self.focus.ok_or_else(|| self.illegal(intent))
    }

    fn focused_controller(&self, intent: &str) -> Result<&TurnController> {
        self.focus
            .and_then(|id| self.controllers.get(&id))
            .ok_or_else(|| GameError::IllegalTransition {
                state: TurnState::Idle.to_string(),
                intent: intent.into(),
            })
    }

    fn controller_mut(&mut self, unit: UnitId) -> Result<&mut TurnController> {
        self.controllers.get_mut(&unit).ok_or(GameError::UnknownUnit(unit))
    }

    fn select_at(&mut self, cell: Cell) -> Result<IntentOutcome> {
        self.cursor = Some(cell);

        let Some(unit) = self.focus else {
            return self.select_fresh(cell);
        };
        match self.state_of(unit) {
            TurnState::Selected => self.choose_destination(unit, cell),
            TurnState::SelectingTarget => self.choose_target_at(unit, cell),
            TurnState::Inspecting => {
                self.controller_mut(unit)?.cancel();
                self.focus = None;
                if self.world.unit_at(cell).is_some_and(|u| u.id == unit) {
                    Ok(IntentOutcome::Accepted)
                } else {
                    self.select_fresh(cell).map(|_| IntentOutcome::Accepted)
                }
            }
            _ => Err(self.illegal(Intent::SelectAt(cell))),
        }
    }

    /// Select or inspect whatever stands on `cell`.
    fn select_fresh(&mut self, cell: Cell) -> Result<IntentOutcome> {
        let Some(unit) = self.world.unit_at(cell) else {
            return Ok(IntentOutcome::Ignored);
        };
        let id = unit.id;
        let playable = unit.team == self.config.player_team && unit.is_ready();

        let controller = self.controller_mut(id)?;
        if playable && controller.state() == TurnState::Idle {
            controller.select()?;
            self.world.unit_mut(id)?.action_origin = cell;
            tracing::info!(unit = %id, %cell, "Unit selected");
        } else {
            controller.inspect()?;
        }
        self.focus = Some(id);
        Ok(IntentOutcome::Accepted)
    }

    fn choose_destination(&mut self, id: UnitId, cell: Cell) -> Result<IntentOutcome> {
        let unit = self.world.live_unit(id)?;
        let from = unit.cell;

        let plan = if cell == from {
            MovePlan::null(from)
        } else {
            let map = self.planner().reachable_set(
                from,
                unit.movement_budget(),
                &self.world.movement_blockers(unit),
                unit.mobility(),
            );
            let stops = stop_filtered(&map, &self.world.stopping_blockers(unit));
            if !stops.contains(&cell) {
                return Err(GameError::IllegalMove { from, to: cell });
            }
            MovePlan {
                path: map.path_to(cell),
                cost: map.cost(cell).unwrap_or(0),
            }
        };

        let unit = self.world.unit_mut(id)?;
        let spent = unit.fuel.spend(plan.cost);
        unit.action_origin = from;
        tracing::info!(unit = %id, %from, to = %cell, cost = plan.cost, fuel_left = unit.fuel.current, "Move committed");
        debug_assert_eq!(spent, plan.cost);

        self.queue.extend(sequence::walk_steps(id, &plan.path));
        self.controller_mut(id)?.begin_move(plan)?;
        Ok(IntentOutcome::Accepted)
    }

    fn choose_target_at(&mut self, unit: UnitId, cell: Cell) -> Result<IntentOutcome> {
        let index = self
            .controllers
            .get(&unit)
            .and_then(|c| {
                c.targets()
                    .iter()
                    .position(|t| self.world.get(*t).is_some_and(|u| u.cell == cell))
            })
            .ok_or_else(|| GameError::InvalidState(format!("no target on {cell}")))?;
        self.pick_target(unit, index)
    }

    /// Pick a cached target, refusing it unless the primary weapon can
    /// actually engage it.
    fn pick_target(&mut self, unit: UnitId, index: usize) -> Result<IntentOutcome> {
        if let Some(controller) = self.controllers.get(&unit) {
            if controller.state() == TurnState::SelectingTarget {
                if let Some(&target) = controller.targets().get(index) {
                    combat::validate_attack(&self.world, unit, target, controller.has_moved())?;
                }
            }
        }
        self.controller_mut(unit)?.pick_target(index)?;
        Ok(IntentOutcome::Accepted)
    }

    fn confirm(&mut self) -> Result<IntentOutcome> {
        let unit = self.focused_unit(Intent::Confirm)?;
        if self.state_of(unit) == TurnState::SelectingTarget {
            return self.pick_target(unit, 0);
        }
        match self.controller_mut(unit)?.confirm()? {
            ConfirmAction::FinishTurn => self.complete_turn(unit)?,
            ConfirmAction::ShowTargets | ConfirmAction::TargetChosen(_) => {}
            ConfirmAction::Attack(target) => {
                let has_moved = self.controller(unit).is_some_and(TurnController::has_moved);
                if let Err(err) = combat::validate_attack(&self.world, unit, target, has_moved) {
                    tracing::error!(attacker = %unit, defender = %target, %err, "Confirmed attack is illegal");
                    return Err(err);
                }
                self.queue.extend(sequence::attack_steps(unit, target, has_moved));
            }
        }
        Ok(IntentOutcome::Accepted)
    }

    fn cancel(&mut self) -> Result<IntentOutcome> {
        let Some(unit) = self.focus else {
            return Ok(IntentOutcome::Ignored);
        };
        match self.controller_mut(unit)?.cancel() {
            CancelAction::Ignored => Ok(IntentOutcome::Ignored),
            CancelAction::Deselected | CancelAction::LeftInspection(_) => {
                self.focus = None;
                Ok(IntentOutcome::Accepted)
            }
            CancelAction::SteppedBack(_) => Ok(IntentOutcome::Accepted),
            CancelAction::Undo(plan) => {
                let refunded = self.world.unit_mut(unit)?;
                refunded.fuel.refund(plan.cost);
                tracing::info!(unit = %unit, refund = plan.cost, fuel = refunded.fuel.current, "Move undone");
                self.queue.extend(sequence::walk_steps(unit, &plan.reversed()));
                Ok(IntentOutcome::Accepted)
            }
        }
    }

    fn cycle(&mut self, direction: Direction) -> Result<IntentOutcome> {
        if self.focus_state().is_mid_turn() {
            return Err(self.illegal(Intent::CycleUnit(direction)));
        }
        if let Some(unit) = self.focus.take() {
            self.controller_mut(unit)?.cancel();
        }

        let ready: Vec<(UnitId, Cell)> = self
            .world
            .ready_units(self.config.player_team)
            .map(|u| (u.id, u.cell))
            .collect();
        if ready.is_empty() {
            return Ok(IntentOutcome::Ignored);
        }

        let current = self.cursor.and_then(|c| ready.iter().position(|(_, cell)| *cell == c));
        let next = match (current, direction) {
            (None, Direction::Next) => 0,
            (None, Direction::Previous) => ready.len() - 1,
            (Some(i), Direction::Next) => (i + 1) % ready.len(),
            (Some(i), Direction::Previous) => (i + ready.len() - 1) % ready.len(),
        };
        self.cursor = Some(ready[next].1);
        tracing::debug!(unit = %ready[next].0, cell = %ready[next].1, "Cursor cycled");
        Ok(IntentOutcome::Accepted)
    }

    fn reset_round(&mut self) -> Result<IntentOutcome> {
        if self.focus_state().is_mid_turn() {
            return Err(self.illegal(Intent::ResetRound));
        }
        self.world.reset_all_turns();
        for controller in self.controllers.values_mut() {
            controller.reset();
        }
        self.focus = None;
        tracing::info!("Round reset");
        Ok(IntentOutcome::Accepted)
    }

    fn complete_turn(&mut self, unit: UnitId) -> Result<()> {
        self.world.unit_mut(unit)?.finished = true;
        if self.focus == Some(unit) {
            self.focus = None;
        }
        tracing::info!(%unit, "Turn finished");
        Ok(())
    }

    /// Run steps until the next join point or the end of the queue.
    ///
    /// # Errors
    ///
    /// Propagates a failed mutation. A combat that fails validation at
    /// resolution time aborts the rest of its sequence and returns the
    /// attacker to target selection.
    pub fn pump(&mut self) -> Result<PumpStatus> {
        while let Some(step) = self.queue.pop_front() {
            match step {
                Step::Notify(notice) => sequence::deliver(&mut self.sink, &notice),
                Step::Apply(mutation) => self.apply(mutation)?,
                Step::Join(join) => {
                    let wait = self.sink.join(&join).unwrap_or_else(|| self.config.fallback_join());
                    return Ok(PumpStatus::Waiting { join, wait });
                }
            }
        }
        Ok(PumpStatus::Settled)
    }

    /// Run every queued step, treating each join as already satisfied.
    ///
    /// # Errors
    ///
    /// Same as [`Self::pump`].
    pub fn settle(&mut self) -> Result<()> {
        while let PumpStatus::Waiting { .. } = self.pump()? {}
        Ok(())
    }

    fn apply(&mut self, mutation: Mutation) -> Result<()> {
        match mutation {
            Mutation::MoveUnit { unit, to } => {
                self.world.unit_mut(unit)?.cell = to;
            }
            Mutation::EndWalk(unit) => {
                let controller = self.controllers.get(&unit).ok_or(GameError::UnknownUnit(unit))?;
                let targets = if controller.is_reverting() {
                    Vec::new()
                } else {
                    valid_targets(&self.world, self.world.unit(unit)?, controller.has_moved())
                };
                self.controller_mut(unit)?.arrive(targets)?;
            }
            Mutation::ResolveCombat {
                attacker,
                defender,
                has_moved,
            } => match combat::resolve_combat(&mut self.world, attacker, defender, has_moved) {
                Ok(outcome) => {
                    for step in sequence::aftermath_steps(&outcome).into_iter().rev() {
                        self.queue.push_front(step);
                    }
                    let record = self.log.record(outcome, has_moved);
                    tracing::debug!(sequence = record.sequence, state_hash = self.world.state_hash(), "Combat logged");
                }
                Err(err) => {
                    self.queue.clear();
                    self.controller_mut(attacker)?.cancel();
                    self.sink.notify_rejected(&err);
                    return Err(err);
                }
            },
            Mutation::Deactivate(unit) => self.world.deactivate(unit)?,
            Mutation::FinishTurn(unit) => {
                self.controller_mut(unit)?.finish()?;
                self.complete_turn(unit)?;
            }
        }

        #[cfg(feature = "debug-validation")]
        self.world.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Notice, RecordingSink};
    use crate::terrain::TerrainIndex;
    use crate::units::{TeamId, Trajectory, UnitStats, WeaponLoadoutEntry, WeaponProfile};
    use std::sync::Arc;

    fn rifle(ammo: u32) -> WeaponLoadoutEntry {
        let profile = Arc::new(WeaponProfile {
            name: "rifle".into(),
            base_power: 4,
            trajectory: Trajectory::Straight,
            projectile_speed: 20,
        });
        WeaponLoadoutEntry::new(profile, ammo, 1, 1)
    }

    /// Player squad at (0,0), enemy squad at (4,0) on an open 8x4 board.
    fn session() -> (Session<RecordingSink>, UnitId, UnitId) {
        let mut world = World::new(TerrainIndex::new(8, 4));
        let player = world
            .spawn("player", TeamId(0), UnitStats::default(), Cell::new(0, 0), vec![rifle(3)])
            .unwrap();
        let enemy = world
            .spawn("enemy", TeamId(1), UnitStats::default(), Cell::new(4, 0), vec![rifle(3)])
            .unwrap();
        (Session::new(world, CoreConfig::default(), RecordingSink::default()), player, enemy)
    }

    #[test]
    fn test_select_move_and_finish() {
        let (mut s, player, _) = session();
        assert_eq!(s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap(), IntentOutcome::Accepted);
        assert_eq!(s.state_of(player), TurnState::Selected);

        s.handle(Intent::SelectAt(Cell::new(2, 0))).unwrap();
        assert_eq!(s.state_of(player), TurnState::Moving);
        assert!(s.is_busy());
        s.settle().unwrap();

        assert_eq!(s.state_of(player), TurnState::ConfirmingMove);
        assert_eq!(s.world().get(player).unwrap().cell, Cell::new(2, 0));
        assert_eq!(s.world().get(player).unwrap().fuel.current, 68);

        s.handle(Intent::Confirm).unwrap();
        assert_eq!(s.state_of(player), TurnState::Finished);
        assert!(s.world().get(player).unwrap().finished);
        assert_eq!(s.focus(), None);
    }

    #[test]
    fn test_pump_yields_each_join() {
        let (mut s, player, _) = session();
        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        s.handle(Intent::SelectAt(Cell::new(2, 0))).unwrap();

        let first = s.pump().unwrap();
        assert_eq!(
            first,
            PumpStatus::Waiting {
                join: JoinPoint::MoveStep {
                    unit: player,
                    to: Cell::new(1, 0),
                },
                wait: Duration::from_millis(250),
            }
        );
        assert_eq!(s.world().get(player).unwrap().cell, Cell::new(1, 0));

        // input is closed while walking
        assert!(s.handle(Intent::Confirm).is_err());
        assert_eq!(s.handle(Intent::Cancel).unwrap(), IntentOutcome::Ignored);

        assert!(matches!(s.pump().unwrap(), PumpStatus::Waiting { .. }));
        assert_eq!(s.pump().unwrap(), PumpStatus::Settled);
        assert_eq!(s.state_of(player), TurnState::ConfirmingMove);
    }

    #[test]
    fn test_illegal_move_keeps_selection() {
        let (mut s, player, _) = session();
        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        let err = s.handle(Intent::SelectAt(Cell::new(7, 3))).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
        assert_eq!(s.state_of(player), TurnState::Selected);
        assert_eq!(s.sink().rejections.len(), 1);
    }

    #[test]
    fn test_attack_sequence_and_log() {
        let (mut s, player, enemy) = session();
        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        s.handle(Intent::SelectAt(Cell::new(3, 0))).unwrap();
        s.settle().unwrap();
        assert_eq!(s.controller(player).unwrap().targets(), &[enemy]);

        s.handle(Intent::Confirm).unwrap();
        assert_eq!(s.state_of(player), TurnState::SelectingTarget);
        s.handle(Intent::SelectAt(Cell::new(4, 0))).unwrap();
        assert_eq!(s.state_of(player), TurnState::ConfirmingTarget);

        let preview = s.preview_attack().unwrap();
        s.handle(Intent::Confirm).unwrap();
        s.settle().unwrap();

        assert_eq!(s.state_of(player), TurnState::Finished);
        assert_eq!(s.log().len(), 1);
        let record = s.log().last().unwrap();
        assert_eq!(record.outcome, preview);
        assert!(record.has_moved);
        assert_eq!(s.world().get(player).unwrap().primary_ammo(), 2);
        assert_eq!(s.world().get(enemy).unwrap().primary_ammo(), 2);

        let joins = &s.sink().joins;
        assert!(joins.contains(&JoinPoint::Volley {
            attacker: player,
            defender: enemy,
        }));
        assert!(joins.contains(&JoinPoint::HitReactions {
            attacker: player,
            defender: enemy,
        }));
    }

    #[test]
    fn test_death_is_deferred_until_effect_join() {
        let (mut s, player, enemy) = session();
        s.world.unit_mut(enemy).unwrap().health.current = 1;
        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        s.handle(Intent::SelectAt(Cell::new(3, 0))).unwrap();
        s.settle().unwrap();
        s.handle(Intent::Confirm).unwrap();
        s.handle(Intent::Confirm).unwrap();
        s.handle(Intent::Confirm).unwrap();

        loop {
            match s.pump().unwrap() {
                PumpStatus::Waiting {
                    join: JoinPoint::DeathEffect(unit),
                    ..
                } => {
                    assert_eq!(unit, enemy);
                    let dead = s.world().get(enemy).unwrap();
                    assert!(dead.active);
                    assert!(!dead.is_alive());
                    assert!(s.world().unit_at(Cell::new(4, 0)).is_none());
                }
                PumpStatus::Waiting { .. } => {}
                PumpStatus::Settled => break,
            }
        }
        assert!(!s.world().get(enemy).unwrap().active);
        assert!(s.sink().notices.contains(&Notice::UnitDied(enemy)));
        assert_eq!(s.state_of(player), TurnState::Finished);
    }

    #[test]
    fn test_enemy_and_finished_units_are_inspected() {
        let (mut s, player, enemy) = session();
        s.handle(Intent::SelectAt(Cell::new(4, 0))).unwrap();
        assert_eq!(s.state_of(enemy), TurnState::Inspecting);
        s.handle(Intent::Cancel).unwrap();
        assert_eq!(s.state_of(enemy), TurnState::Idle);

        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        s.settle().unwrap();
        s.handle(Intent::Confirm).unwrap();
        assert_eq!(s.state_of(player), TurnState::Finished);

        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        assert_eq!(s.state_of(player), TurnState::Inspecting);
        s.handle(Intent::SelectAt(Cell::new(6, 3))).unwrap();
        assert_eq!(s.state_of(player), TurnState::Finished);
    }

    #[test]
    fn test_cycle_and_reset_round() {
        let (mut s, player, _) = session();
        let second = {
            let world = &mut s.world;
            world
                .spawn("second", TeamId(0), UnitStats::default(), Cell::new(0, 2), Vec::new())
                .unwrap()
        };
        s.controllers.insert(second, TurnController::new(second));

        s.handle(Intent::CycleUnit(Direction::Next)).unwrap();
        assert_eq!(s.cursor(), Some(Cell::new(0, 0)));
        s.handle(Intent::CycleUnit(Direction::Next)).unwrap();
        assert_eq!(s.cursor(), Some(Cell::new(0, 2)));
        s.handle(Intent::CycleUnit(Direction::Next)).unwrap();
        assert_eq!(s.cursor(), Some(Cell::new(0, 0)));
        s.handle(Intent::CycleUnit(Direction::Previous)).unwrap();
        assert_eq!(s.cursor(), Some(Cell::new(0, 2)));

        s.handle(Intent::SelectAt(Cell::new(0, 0))).unwrap();
        assert!(s.handle(Intent::CycleUnit(Direction::Next)).is_err());
        assert!(s.handle(Intent::ResetRound).is_err());

        s.handle(Intent::SelectAt(Cell::new(1, 0))).unwrap();
        s.settle().unwrap();
        s.handle(Intent::MoveOnly).unwrap();
        assert_eq!(s.state_of(player), TurnState::Finished);

        s.handle(Intent::ResetRound).unwrap();
        assert_eq!(s.state_of(player), TurnState::Idle);
        assert!(!s.world().get(player).unwrap().finished);
    }
}
