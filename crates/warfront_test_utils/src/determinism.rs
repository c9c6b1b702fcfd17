//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a session produces identical
//! results given identical intents.
//!
//! # Testing Strategy
//!
//! Replays and audit logs only mean something if the same intents always
//! produce the same world. Sources of non-determinism include:
//!
//! - **Floating-point math**: combat ratios use fixed-point via
//!   [`warfront_core::math::Fixed`].
//!
//! - **HashMap iteration order**: units live in a `BTreeMap` keyed by id,
//!   and target lists are sorted.
//!
//! - **Presentation timing**: join points never feed back into the
//!   simulation, so a headless run must match a recorded one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use serde::{Deserialize, Serialize};
use warfront_core::error::GameError;
use warfront_core::session::{Intent, Session};
use warfront_core::world::World;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of intents replayed per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// A recorded list of intents, storable as RON next to a failing test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentScript {
    /// Intents in the order they were issued.
    pub intents: Vec<Intent>,
}

impl IntentScript {
    /// Wrap a list of intents.
    #[must_use]
    pub fn new(intents: Vec<Intent>) -> Self {
        Self { intents }
    }

    /// Render the script as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the script cannot be rendered.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse a script from RON.
    ///
    /// # Errors
    ///
    /// Returns the parser error if the text is not a script.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `inputs` - Inputs fed to every run, in order
/// * `setup` - Function to create initial state
/// * `step` - Function applying one input
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, I, Setup, Step, HashFn>(
    runs: usize,
    inputs: &[I],
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, &I),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for input in inputs {
            step(&mut state, input);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps: inputs.len(),
    }
}

/// Feed one intent to a headless session and settle every queued step.
///
/// Rejected intents are part of the script, so their errors are returned
/// rather than aborting the replay.
pub fn apply_intent(session: &mut Session, intent: Intent) -> Result<(), GameError> {
    session.handle(intent)?;
    session.settle()
}

/// Replay `script` twice from `setup` and compare final world hashes.
pub fn verify_session_determinism<F>(setup: F, script: &IntentScript) -> bool
where
    F: Fn() -> Session,
{
    let result = verify_determinism(
        2,
        &script.intents,
        &setup,
        |session, intent| {
            if let Err(err) = apply_intent(session, *intent) {
                tracing::trace!(%err, "Scripted intent rejected");
            }
        },
        |session| session.world().state_hash(),
    );
    result.is_deterministic
}

/// Replay `script` on `num_runs` threads and collect final hashes.
///
/// # Panics
///
/// Panics if a replay thread panics.
pub fn run_parallel_sessions<F>(setup: F, script: &IntentScript, num_runs: usize) -> DeterminismResult
where
    F: Fn() -> World + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut session = Session::headless(setup(), warfront_core::config::CoreConfig::default());
                    for intent in &script.intents {
                        if let Err(err) = apply_intent(&mut session, *intent) {
                            tracing::trace!(%err, "Scripted intent rejected");
                        }
                    }
                    session.world().state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().expect("replay thread panicked")).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.intents.len(),
    }
}

/// Replay two sessions side by side, finding the first intent after which
/// their worlds differ.
///
/// # Returns
///
/// `None` if the sessions never diverge, `Some(0)` if they differ before
/// any intent, `Some(n)` if they diverge after the n-th intent.
pub fn find_first_divergence<F>(setup: F, script: &IntentScript) -> Option<usize>
where
    F: Fn() -> Session,
{
    let mut first = setup();
    let mut second = setup();

    if first.world().state_hash() != second.world().state_hash() {
        return Some(0);
    }

    for (index, intent) in script.intents.iter().enumerate() {
        let a = apply_intent(&mut first, *intent).map_err(|e| e.to_string());
        let b = apply_intent(&mut second, *intent).map_err(|e| e.to_string());

        if a != b || first.world().state_hash() != second.world().state_hash() {
            tracing::warn!(step = index + 1, ?intent, "Sessions diverged");
            return Some(index + 1);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for session testing.
///
/// These strategies generate random but reproducible intents for
/// property-based testing of the turn machinery.
pub mod strategies {
    use proptest::prelude::*;
    use warfront_core::hex::Cell;
    use warfront_core::session::{Direction, Intent};

    use super::IntentScript;

    /// Generate a cell on a `width` x `height` board.
    pub fn arb_cell(width: i32, height: i32) -> impl Strategy<Value = Cell> {
        (0..width, 0..height).prop_map(|(col, row)| Cell::new(col, row))
    }

    /// Generate a cell that may lie up to two cells off the board.
    pub fn arb_any_cell(width: i32, height: i32) -> impl Strategy<Value = Cell> {
        (-2..width + 2, -2..height + 2).prop_map(|(col, row)| Cell::new(col, row))
    }

    /// Generate any intent targeting a `width` x `height` board.
    pub fn arb_intent(width: i32, height: i32) -> impl Strategy<Value = Intent> {
        prop_oneof![
            4 => arb_cell(width, height).prop_map(Intent::SelectAt),
            3 => Just(Intent::Confirm),
            2 => Just(Intent::Cancel),
            1 => prop_oneof![Just(Direction::Next), Just(Direction::Previous)].prop_map(Intent::CycleUnit),
            1 => (0usize..3).prop_map(Intent::PickTarget),
            1 => Just(Intent::MoveOnly),
            1 => Just(Intent::ResetRound),
        ]
    }

    /// Generate a script of up to `max_len` intents.
    pub fn arb_intent_script(width: i32, height: i32, max_len: usize) -> impl Strategy<Value = IntentScript> {
        proptest::collection::vec(arb_intent(width, height), 0..max_len).prop_map(IntentScript::new)
    }

    /// Generate squad sizes (1-10).
    pub fn arb_health() -> impl Strategy<Value = u32> {
        1u32..=10u32
    }

    /// Generate weapon power values (1-12).
    pub fn arb_power() -> impl Strategy<Value = u32> {
        1u32..=12u32
    }

    /// Generate squad defense values (1-12).
    pub fn arb_defense() -> impl Strategy<Value = i32> {
        1i32..=12i32
    }
}
