//! Error types for the tactics simulation.

use thiserror::Error;

use crate::hex::Cell;
use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Reason an attack was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttackViolation {
    /// The shooter is inactive (dead or removed).
    #[error("attacker is inactive")]
    AttackerInactive,

    /// The target is inactive.
    #[error("target is inactive")]
    TargetInactive,

    /// The target belongs to the shooter's team.
    #[error("target is on the attacker's team")]
    FriendlyTarget,

    /// The shooter and target are the same unit.
    #[error("a unit cannot attack itself")]
    SelfTarget,

    /// The shooter has no weapon in slot 0.
    #[error("attacker has no primary weapon")]
    NoWeapon,

    /// The shooter has no ammunition in slot 0.
    #[error("attacker has no ammunition")]
    NoAmmo,

    /// The target is outside the primary weapon's range.
    #[error("target at distance {distance} is outside range {min}..={max}")]
    OutOfRange {
        /// Hex distance to the target.
        distance: u32,
        /// Minimum weapon range.
        min: u32,
        /// Maximum weapon range.
        max: u32,
    },
}

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// An intent is not legal in the current turn state.
    #[error("Intent '{intent}' is not legal in state '{state}'")]
    IllegalTransition {
        /// Name of the current turn state.
        state: String,
        /// Name of the rejected intent.
        intent: String,
    },

    /// A move target is not in the reachable set.
    #[error("Illegal move from {from} to {to}")]
    IllegalMove {
        /// Cell the unit started from.
        from: Cell,
        /// Requested destination.
        to: Cell,
    },

    /// A combat request failed validation.
    #[error("Illegal attack: {0}")]
    IllegalAttack(#[from] AttackViolation),

    /// Unit identifier not present in the world.
    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
