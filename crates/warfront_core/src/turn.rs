//! Per-unit turn state machine.
//!
//! ```text
//! Idle --select--> Selected --destination--> Moving --arrive--> ConfirmingMove
//!                     ^                                          |   |    |
//!                     +------------- cancel (undo walk) ---------+   |    |
//!                                                  confirm, no targets   |
//!   Finished <-------------------------------------------------------+    |
//!      ^                                          confirm, has targets     v
//!      +--- confirm (combat) --- ConfirmingTarget <--pick-- SelectingTarget
//! ```
//!
//! Any unit may be inspected from `Idle` or `Finished`; leaving inspection
//! returns to the state it was entered from. `Finished` only ever leads to
//! `Inspecting` or, through [`TurnController::reset`], back to `Idle`.
//!
//! The controller owns transition legality and the pending move used for
//! undo. World mutation (fuel, positions, combat) is driven by the session.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::Cell;
use crate::units::UnitId;

/// State of one unit's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnState {
    /// Waiting to be selected.
    #[default]
    Idle,
    /// Selected, choosing a destination.
    Selected,
    /// Walking a path (forward or undo). Ignores input.
    Moving,
    /// Arrived; confirm, move only, or undo.
    ConfirmingMove,
    /// Choosing among cached targets.
    SelectingTarget,
    /// A target is chosen; confirm to fire.
    ConfirmingTarget,
    /// Acted this round.
    Finished,
    /// Read-only inspection.
    Inspecting,
}

impl TurnState {
    /// Whether the unit is between selection and completion.
    #[must_use]
    pub const fn is_mid_turn(self) -> bool {
        matches!(
            self,
            Self::Selected | Self::Moving | Self::ConfirmingMove | Self::SelectingTarget | Self::ConfirmingTarget
        )
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A committed move: the path walked and the fuel it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    /// Path from the origin to the destination, both included.
    pub path: Vec<Cell>,
    /// Terrain cost paid.
    pub cost: u32,
}

impl MovePlan {
    /// A move that stays on `cell`.
    #[must_use]
    pub fn null(cell: Cell) -> Self {
        Self {
            path: vec![cell],
            cost: 0,
        }
    }

    /// Starting cell.
    #[must_use]
    pub fn origin(&self) -> Option<Cell> {
        self.path.first().copied()
    }

    /// Final cell.
    #[must_use]
    pub fn destination(&self) -> Option<Cell> {
        self.path.last().copied()
    }

    /// Whether the unit actually left its cell.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.path.len() > 1
    }

    /// The path walked backwards, for undo.
    #[must_use]
    pub fn reversed(&self) -> Vec<Cell> {
        self.path.iter().rev().copied().collect()
    }
}

/// What the session must do after a confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// The turn ended without combat.
    FinishTurn,
    /// Targets are now offered for selection.
    ShowTargets,
    /// The default target was chosen.
    TargetChosen(UnitId),
    /// Fire at the chosen target.
    Attack(UnitId),
}

/// What the session must do after a cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelAction {
    /// Nothing changed.
    Ignored,
    /// The unit is no longer selected.
    Deselected,
    /// Leave inspection for the given state.
    LeftInspection(TurnState),
    /// Stepped back one menu level.
    SteppedBack(TurnState),
    /// Refund the plan's cost and walk its path backwards.
    Undo(MovePlan),
}

/// Turn state machine for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnController {
    unit: UnitId,
    state: TurnState,
    return_to: TurnState,
    plan: Option<MovePlan>,
    reverting: bool,
    targets: Vec<UnitId>,
    target: Option<UnitId>,
}

impl TurnController {
    /// A controller in `Idle`.
    #[must_use]
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            state: TurnState::Idle,
            return_to: TurnState::Idle,
            plan: None,
            reverting: false,
            targets: Vec::new(),
            target: None,
        }
    }

    /// Controlled unit.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Pending move, if any.
    #[must_use]
    pub fn plan(&self) -> Option<&MovePlan> {
        self.plan.as_ref()
    }

    /// Whether the unit left its cell this turn.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.plan.as_ref().is_some_and(MovePlan::has_moved)
    }

    /// Targets cached on arrival.
    #[must_use]
    pub fn targets(&self) -> &[UnitId] {
        &self.targets
    }

    /// Chosen target.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Whether the current walk is an undo.
    #[must_use]
    pub const fn is_reverting(&self) -> bool {
        self.reverting
    }

    fn illegal(&self, intent: &str) -> GameError {
        GameError::IllegalTransition {
            state: self.state.to_string(),
            intent: intent.to_string(),
        }
    }

    fn transition(&mut self, next: TurnState) {
        tracing::debug!(unit = %self.unit, from = %self.state, to = %next, "Turn transition");
        self.state = next;
    }

    /// `Idle -> Selected`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any other state.
    pub fn select(&mut self) -> Result<()> {
        if self.state != TurnState::Idle {
            return Err(self.illegal("select"));
        }
        self.transition(TurnState::Selected);
        Ok(())
    }

    /// `Idle | Finished -> Inspecting`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any other state.
    pub fn inspect(&mut self) -> Result<()> {
        match self.state {
            TurnState::Idle | TurnState::Finished => {
                self.return_to = self.state;
                self.transition(TurnState::Inspecting);
                Ok(())
            }
            _ => Err(self.illegal("inspect")),
        }
    }

    /// `Selected -> Moving` along `plan`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any other state.
    pub fn begin_move(&mut self, plan: MovePlan) -> Result<()> {
        if self.state != TurnState::Selected {
            return Err(self.illegal("move"));
        }
        self.plan = Some(plan);
        self.reverting = false;
        self.transition(TurnState::Moving);
        Ok(())
    }

    /// End of a walk. A forward walk caches `targets` and enters
    /// `ConfirmingMove`; an undo walk returns to `Selected`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless `Moving`.
    pub fn arrive(&mut self, targets: Vec<UnitId>) -> Result<()> {
        if self.state != TurnState::Moving {
            return Err(self.illegal("arrive"));
        }
        if self.reverting {
            self.reverting = false;
            self.plan = None;
            self.targets.clear();
            self.transition(TurnState::Selected);
        } else {
            self.targets = targets;
            self.transition(TurnState::ConfirmingMove);
        }
        Ok(())
    }

    /// Confirm in the current state.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` outside the confirming and selecting states.
    pub fn confirm(&mut self) -> Result<ConfirmAction> {
        match self.state {
            TurnState::ConfirmingMove if self.targets.is_empty() => {
                self.finish()?;
                Ok(ConfirmAction::FinishTurn)
            }
            TurnState::ConfirmingMove => {
                self.transition(TurnState::SelectingTarget);
                Ok(ConfirmAction::ShowTargets)
            }
            TurnState::SelectingTarget => self.pick_target(0).map(ConfirmAction::TargetChosen),
            TurnState::ConfirmingTarget => match self.target {
                Some(target) => Ok(ConfirmAction::Attack(target)),
                None => Err(GameError::InvalidState(format!("{} has no chosen target", self.unit))),
            },
            _ => Err(self.illegal("confirm")),
        }
    }

    /// `SelectingTarget -> ConfirmingTarget` with the target at `index`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless `SelectingTarget`; `InvalidState` if
    /// `index` is out of range.
    pub fn pick_target(&mut self, index: usize) -> Result<UnitId> {
        if self.state != TurnState::SelectingTarget {
            return Err(self.illegal("pick target"));
        }
        let Some(&target) = self.targets.get(index) else {
            return Err(GameError::InvalidState(format!(
                "no target at index {index} ({} cached)",
                self.targets.len()
            )));
        };
        self.target = Some(target);
        self.transition(TurnState::ConfirmingTarget);
        Ok(target)
    }

    /// `ConfirmingMove -> Finished`, skipping target selection.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless `ConfirmingMove`.
    pub fn move_only(&mut self) -> Result<()> {
        if self.state != TurnState::ConfirmingMove {
            return Err(self.illegal("move only"));
        }
        self.finish()
    }

    /// Complete the turn from `ConfirmingMove` or `ConfirmingTarget`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any other state.
    pub fn finish(&mut self) -> Result<()> {
        match self.state {
            TurnState::ConfirmingMove | TurnState::ConfirmingTarget => {
                self.plan = None;
                self.targets.clear();
                self.target = None;
                self.transition(TurnState::Finished);
                Ok(())
            }
            _ => Err(self.illegal("finish")),
        }
    }

    /// Cancel in the current state.
    ///
    /// Cancelling while `Moving` is ignored, not queued.
    pub fn cancel(&mut self) -> CancelAction {
        match self.state {
            TurnState::Selected => {
                self.transition(TurnState::Idle);
                CancelAction::Deselected
            }
            TurnState::ConfirmingMove => {
                self.targets.clear();
                match self.plan.take() {
                    Some(plan) if plan.has_moved() => {
                        self.plan = Some(plan.clone());
                        self.reverting = true;
                        self.transition(TurnState::Moving);
                        CancelAction::Undo(plan)
                    }
                    _ => {
                        self.transition(TurnState::Selected);
                        CancelAction::SteppedBack(TurnState::Selected)
                    }
                }
            }
            TurnState::SelectingTarget => {
                self.transition(TurnState::ConfirmingMove);
                CancelAction::SteppedBack(TurnState::ConfirmingMove)
            }
            TurnState::ConfirmingTarget => {
                self.target = None;
                self.transition(TurnState::SelectingTarget);
                CancelAction::SteppedBack(TurnState::SelectingTarget)
            }
            TurnState::Inspecting => {
                let back = self.return_to;
                self.transition(back);
                CancelAction::LeftInspection(back)
            }
            TurnState::Idle | TurnState::Moving | TurnState::Finished => CancelAction::Ignored,
        }
    }

    /// Return to `Idle` for a new round.
    pub fn reset(&mut self) {
        self.plan = None;
        self.reverting = false;
        self.targets.clear();
        self.target = None;
        self.return_to = TurnState::Idle;
        if self.state != TurnState::Idle {
            self.transition(TurnState::Idle);
        }
    }
}
