//! Ordered step lists that pace movement and combat for presentation.
//!
//! Multi-stage actions are expressed as a queue of [`Step`]s: notifications
//! for the presentation layer, state mutations, and join points where the
//! driver waits for presentation to catch up. The simulation never depends on
//! what happens at a join; a headless driver treats every join as already
//! satisfied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::combat::CombatOutcome;
use crate::error::GameError;
use crate::hex::Cell;
use crate::units::UnitId;

/// Fire-and-forget notification for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// A unit steps between adjacent cells.
    MoveStep {
        /// Moving unit.
        unit: UnitId,
        /// Cell left.
        from: Cell,
        /// Cell entered.
        to: Cell,
    },
    /// An attack is about to be resolved.
    CombatStart {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
    },
    /// An attack has been resolved.
    CombatEnd(Box<CombatOutcome>),
    /// A squad was wiped out.
    UnitDied(UnitId),
}

/// A point where presentation may hold the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinPoint {
    /// One movement step has been animated.
    MoveStep {
        /// Moving unit.
        unit: UnitId,
        /// Cell entered.
        to: Cell,
    },
    /// Fire effects and projectile flight have finished.
    Volley {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
    },
    /// Both hit reactions have finished.
    HitReactions {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
    },
    /// A death effect has finished.
    DeathEffect(UnitId),
}

/// A state change executed by the session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    /// Place a unit on a cell.
    MoveUnit {
        /// Moving unit.
        unit: UnitId,
        /// Destination.
        to: Cell,
    },
    /// A forward walk or an undo walk has ended.
    EndWalk(UnitId),
    /// Resolve combat between two units.
    ResolveCombat {
        /// Attacking unit.
        attacker: UnitId,
        /// Defending unit.
        defender: UnitId,
        /// Whether the attacker moved this turn.
        has_moved: bool,
    },
    /// Remove a dead unit from play.
    Deactivate(UnitId),
    /// Mark a unit's turn as complete.
    FinishTurn(UnitId),
}

/// One entry of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Tell presentation something happened.
    Notify(Notice),
    /// Change simulation state.
    Apply(Mutation),
    /// Wait for presentation.
    Join(JoinPoint),
}

/// Steps walking `unit` along `path`, one join per cell entered.
#[must_use]
pub fn walk_steps(unit: UnitId, path: &[Cell]) -> Vec<Step> {
    let mut steps = Vec::with_capacity(path.len().saturating_sub(1) * 3 + 1);
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        steps.push(Step::Notify(Notice::MoveStep { unit, from, to }));
        steps.push(Step::Apply(Mutation::MoveUnit { unit, to }));
        steps.push(Step::Join(JoinPoint::MoveStep { unit, to }));
    }
    steps.push(Step::Apply(Mutation::EndWalk(unit)));
    steps
}

/// Steps for an attack up to and including resolution and turn completion.
#[must_use]
pub fn attack_steps(attacker: UnitId, defender: UnitId, has_moved: bool) -> Vec<Step> {
    vec![
        Step::Notify(Notice::CombatStart { attacker, defender }),
        Step::Join(JoinPoint::Volley { attacker, defender }),
        Step::Apply(Mutation::ResolveCombat {
            attacker,
            defender,
            has_moved,
        }),
        Step::Apply(Mutation::FinishTurn(attacker)),
    ]
}

/// Steps that follow a resolved attack: the end notice, the hit-reaction
/// join, and for each casualty a death notice, its effect join and removal.
#[must_use]
pub fn aftermath_steps(outcome: &CombatOutcome) -> Vec<Step> {
    let attacker = outcome.attacker.unit;
    let defender = outcome.defender.unit;
    let mut steps = vec![
        Step::Notify(Notice::CombatEnd(Box::new(outcome.clone()))),
        Step::Join(JoinPoint::HitReactions { attacker, defender }),
    ];
    for unit in outcome.casualties() {
        steps.push(Step::Notify(Notice::UnitDied(unit)));
        steps.push(Step::Join(JoinPoint::DeathEffect(unit)));
        steps.push(Step::Apply(Mutation::Deactivate(unit)));
    }
    steps
}

/// Presentation collaborator driven by the session.
///
/// Every method has a no-op default. `join` reports how long presentation
/// needs at a join point; `None` means the session's fallback applies.
pub trait PresentationSink {
    /// A unit steps between adjacent cells.
    fn notify_move_step(&mut self, _unit: UnitId, _from: Cell, _to: Cell) {}

    /// An attack is about to be resolved.
    fn notify_combat_start(&mut self, _attacker: UnitId, _defender: UnitId) {}

    /// An attack has been resolved.
    fn notify_combat_end(&mut self, _outcome: &CombatOutcome) {}

    /// A squad was wiped out.
    fn notify_unit_died(&mut self, _unit: UnitId) {}

    /// An intent was rejected.
    fn notify_rejected(&mut self, _error: &GameError) {}

    /// The sequence reached a join point.
    fn join(&mut self, _join: &JoinPoint) -> Option<Duration> {
        None
    }
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}

/// Sink that records every notice and join, for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Notices in delivery order.
    pub notices: Vec<Notice>,
    /// Joins in arrival order.
    pub joins: Vec<JoinPoint>,
    /// Rejection messages in arrival order.
    pub rejections: Vec<String>,
    /// Duration reported at every join.
    pub join_duration: Option<Duration>,
}

impl PresentationSink for RecordingSink {
    fn notify_move_step(&mut self, unit: UnitId, from: Cell, to: Cell) {
        self.notices.push(Notice::MoveStep { unit, from, to });
    }

    fn notify_combat_start(&mut self, attacker: UnitId, defender: UnitId) {
        self.notices.push(Notice::CombatStart { attacker, defender });
    }

    fn notify_combat_end(&mut self, outcome: &CombatOutcome) {
        self.notices.push(Notice::CombatEnd(Box::new(outcome.clone())));
    }

    fn notify_unit_died(&mut self, unit: UnitId) {
        self.notices.push(Notice::UnitDied(unit));
    }

    fn notify_rejected(&mut self, error: &GameError) {
        self.rejections.push(error.to_string());
    }

    fn join(&mut self, join: &JoinPoint) -> Option<Duration> {
        self.joins.push(*join);
        self.join_duration
    }
}

/// Deliver a notice to a sink.
pub fn deliver<S: PresentationSink + ?Sized>(sink: &mut S, notice: &Notice) {
    match notice {
        Notice::MoveStep { unit, from, to } => sink.notify_move_step(*unit, *from, *to),
        Notice::CombatStart { attacker, defender } => sink.notify_combat_start(*attacker, *defender),
        Notice::CombatEnd(outcome) => sink.notify_combat_end(outcome),
        Notice::UnitDied(unit) => sink.notify_unit_died(*unit),
    }
}
