//! Core configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::pathfinding::ExpansionOrder;
use crate::terrain::COST_IMPASSABLE;
use crate::units::TeamId;

/// Tunables for a session.
///
/// # Example RON
///
/// ```ron
/// CoreConfig(
///     player_team: (0),
///     impassable_threshold: 99,
///     expansion: CostOrdered,
///     fallback_join_ms: 250,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Team whose units accept turn input.
    pub player_team: TeamId,
    /// Terrain cost at or above which a cell cannot be entered.
    pub impassable_threshold: u32,
    /// Frontier discipline of the path planner.
    pub expansion: ExpansionOrder,
    /// Pacing reported for a presentation join when the sink reports none.
    pub fallback_join_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            player_team: TeamId(0),
            impassable_threshold: COST_IMPASSABLE,
            expansion: ExpansionOrder::CostOrdered,
            fallback_join_ms: 250,
        }
    }
}

impl CoreConfig {
    /// Parse a configuration from RON text. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` if the text is not valid RON for
    /// this structure.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Fallback join duration.
    #[must_use]
    pub const fn fallback_join(&self) -> Duration {
        Duration::from_millis(self.fallback_join_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.player_team, TeamId(0));
        assert_eq!(config.impassable_threshold, 99);
        assert_eq!(config.expansion, ExpansionOrder::CostOrdered);
        assert_eq!(config.fallback_join(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_ron() {
        let config = CoreConfig::from_ron_str("CoreConfig(expansion: Fifo, player_team: (1))", "core.ron").unwrap();
        assert_eq!(config.expansion, ExpansionOrder::Fifo);
        assert_eq!(config.player_team, TeamId(1));
        assert_eq!(config.fallback_join_ms, 250);

        let empty = CoreConfig::from_ron_str("()", "core.ron").unwrap();
        assert_eq!(empty, CoreConfig::default());
    }

    #[test]
    fn test_bad_ron() {
        assert!(CoreConfig::from_ron_str("CoreConfig(player_team: \"red\")", "core.ron").is_err());
    }
}
