//! # Warfront Core
//!
//! Deterministic simulation core for turn-based hex tactics.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No file IO (callers hand in RON text)
//! - No randomness
//! - No floating-point math in combat (uses fixed-point)
//!
//! Presentation plugs in through [`sequence::PresentationSink`]; a headless
//! driver simply settles every join point immediately.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Odd-r offset grid, cube coordinates and distance
//! - [`terrain`] - Terrain profiles and the per-tile index
//! - [`pathfinding`] - Budgeted reachability and paths
//! - [`units`] - Units, weapons, health and fuel
//! - [`world`] - Unit registry and scenario construction
//! - [`targeting`] - Which enemies a unit can fire on
//! - [`combat`] - Simultaneous-fire resolution
//! - [`turn`] - Per-unit turn state machine
//! - [`sequence`] - Step lists pacing movement and combat
//! - [`session`] - Intent handling and step pumping
//! - [`data`] - RON scenario documents

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod combat_log;
pub mod config;
pub mod data;
pub mod error;
pub mod hex;
pub mod math;
pub mod pathfinding;
pub mod sequence;
pub mod session;
pub mod targeting;
pub mod terrain;
pub mod turn;
pub mod units;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{plan_combat, resolve_combat, CombatOutcome, RoundingMode, SideReport};
    pub use crate::combat_log::{CombatLog, CombatRecord};
    pub use crate::config::CoreConfig;
    pub use crate::data::{MapData, ScenarioData, UnitPlacement, UnitProfileData};
    pub use crate::error::{AttackViolation, GameError, Result};
    pub use crate::hex::{hex_distance, Cell, Cube};
    pub use crate::math::Fixed;
    pub use crate::pathfinding::{ExpansionOrder, MoveMap, PathPlanner};
    pub use crate::sequence::{JoinPoint, Notice, NullSink, PresentationSink, RecordingSink};
    pub use crate::session::{Direction, Intent, IntentOutcome, PumpStatus, Session};
    pub use crate::targeting::valid_targets;
    pub use crate::terrain::{MobilityClass, PositionQuality, TerrainCategory, TerrainIndex, TerrainProfile};
    pub use crate::turn::{TurnController, TurnState};
    pub use crate::units::{TeamId, Unit, UnitId, UnitStats, UnitType, WeaponLoadoutEntry, WeaponProfile};
    pub use crate::world::World;
}
