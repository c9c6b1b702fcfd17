//! Map layout data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::terrain::{TerrainIndex, TerrainProfile};

/// Board layout as text rows plus a legend mapping characters to terrain
/// profile names.
///
/// Row `r`, character `c` is the cell `(c, r)`. A space marks a hole in the
/// board.
///
/// # Example RON
///
/// ```ron
/// MapData(
///     legend: { '.': "plain", 'f': "forest", '~': "sea" },
///     rows: [
///         "..f~",
///         ".ff~",
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    /// Character to terrain profile name.
    pub legend: BTreeMap<char, String>,

    /// One string per board row.
    pub rows: Vec<String>,
}

impl MapData {
    /// Build the terrain index for this layout.
    ///
    /// # Errors
    ///
    /// Returns `GameError::DataParseError` for an empty or ragged layout or a
    /// duplicated profile name.
    pub fn build_index(&self, profiles: Vec<TerrainProfile>) -> Result<TerrainIndex> {
        TerrainIndex::from_rows(profiles, &self.legend, &self.rows)
    }
}
