//! Auditable record of every resolved attack.

use serde::{Deserialize, Serialize};

use crate::combat::CombatOutcome;
use crate::units::UnitId;

/// One resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRecord {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// Attacking unit.
    pub attacker: UnitId,
    /// Defending unit.
    pub defender: UnitId,
    /// Whether the attacker moved before firing.
    pub has_moved: bool,
    /// Full outcome.
    pub outcome: CombatOutcome,
}

/// Ordered collection of [`CombatRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    records: Vec<CombatRecord>,
}

impl CombatLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome and return the new record.
    pub fn record(&mut self, outcome: CombatOutcome, has_moved: bool) -> &CombatRecord {
        let record = CombatRecord {
            sequence: self.records.len() as u64 + 1,
            attacker: outcome.attacker.unit,
            defender: outcome.defender.unit,
            has_moved,
            outcome,
        };
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[CombatRecord] {
        &self.records
    }

    /// Most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&CombatRecord> {
        self.records.last()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no attack has been resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
