//! Headless scripted play.
//!
//! Drives a session from a list of intents, settling every step sequence
//! immediately, and streams each new combat record as one JSON line.
//! Rejected intents are logged and counted but never stop the run.

use std::io::Write;

use serde::Serialize;
use warfront_core::config::CoreConfig;
use warfront_core::data::ScenarioData;
use warfront_core::session::{Intent, IntentOutcome, Session};
use warfront_core::world::World;

use crate::error::Result;

/// Summary of one scripted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaySummary {
    /// Intents fed to the session.
    pub intents: usize,
    /// Intents that changed something.
    pub accepted: usize,
    /// Intents that were valid but had no effect.
    pub ignored: usize,
    /// Intents the session refused.
    pub rejected: usize,
    /// Attacks resolved.
    pub combats: usize,
    /// World hash after the last intent.
    pub final_hash: u64,
}

/// Run `intents` against a fresh session built from `scenario`, writing
/// every combat record to `out` as a JSON line.
///
/// # Errors
///
/// Fails if the world cannot be built or `out` cannot be written.
pub fn run_script<W: Write>(
    scenario: &ScenarioData,
    config: CoreConfig,
    intents: &[Intent],
    out: &mut W,
) -> Result<PlaySummary> {
    let world = World::from_scenario(scenario)?;
    let mut session = Session::headless(world, config);

    let mut summary = PlaySummary {
        intents: intents.len(),
        accepted: 0,
        ignored: 0,
        rejected: 0,
        combats: 0,
        final_hash: 0,
    };

    for (index, intent) in intents.iter().enumerate() {
        let outcome = session.handle(*intent).and_then(|outcome| session.settle().map(|()| outcome));
        match outcome {
            Ok(IntentOutcome::Accepted) => summary.accepted += 1,
            Ok(IntentOutcome::Ignored) => summary.ignored += 1,
            Err(err) => {
                tracing::warn!(line = index + 1, intent = intent.name(), %err, "Scripted intent rejected");
                summary.rejected += 1;
            }
        }

        for record in &session.log().records()[summary.combats..] {
            serde_json::to_writer(&mut *out, record)?;
            out.write_all(b"\n")?;
        }
        summary.combats = session.log().len();
    }

    out.flush()?;
    summary.final_hash = session.world().state_hash();
    tracing::info!(
        intents = summary.intents,
        accepted = summary.accepted,
        rejected = summary.rejected,
        combats = summary.combats,
        final_hash = summary.final_hash,
        "Script finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfront_core::combat_log::CombatRecord;
    use warfront_core::hex::Cell;
    use warfront_test_utils::fixtures::skirmish_scenario;

    /// The player rifles advance one round, then close in and fire on the
    /// enemy rifles at (6,0) the next.
    fn script() -> Vec<Intent> {
        vec![
            Intent::SelectAt(Cell::new(0, 0)),
            Intent::SelectAt(Cell::new(3, 0)),
            Intent::Confirm,
            // Finished units can only be inspected.
            Intent::SelectAt(Cell::new(3, 0)),
            Intent::Confirm,
            Intent::ResetRound,
            Intent::SelectAt(Cell::new(3, 0)),
            Intent::SelectAt(Cell::new(5, 0)),
            Intent::Confirm,
            Intent::Confirm,
            Intent::Confirm,
        ]
    }

    #[test]
    fn test_script_emits_one_line_per_combat() {
        let mut out = Vec::new();
        let summary = run_script(&skirmish_scenario(), CoreConfig::default(), &script(), &mut out).unwrap();

        assert_eq!(summary.intents, 11);
        assert_eq!(summary.combats, 1);
        assert_eq!(summary.rejected, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: CombatRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record.sequence, 1);
        assert!(record.has_moved);
        assert_eq!(record.outcome.distance, 1);
    }

    #[test]
    fn test_replays_are_identical() {
        let scenario = skirmish_scenario();
        let mut first = Vec::new();
        let mut second = Vec::new();
        let a = run_script(&scenario, CoreConfig::default(), &script(), &mut first).unwrap();
        let b = run_script(&scenario, CoreConfig::default(), &script(), &mut second).unwrap();
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_script() {
        let mut out = Vec::new();
        let summary = run_script(&skirmish_scenario(), CoreConfig::default(), &[], &mut out).unwrap();
        assert_eq!(summary.combats, 0);
        assert!(out.is_empty());
    }
}
