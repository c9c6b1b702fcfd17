//! Hex geometry on an odd-row-shifted ("odd-r", pointy-top) layout.
//!
//! Cells are addressed with offset coordinates `(col, row)`. Odd rows are
//! shifted half a cell to the right. Distances are computed by converting to
//! cube coordinates, where every hex step changes exactly two of the three
//! axes by one.
//!
//! Everything here is pure integer arithmetic with no failure modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An offset coordinate on the hex board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Column (x).
    pub col: i32,
    /// Row (y).
    pub row: i32,
}

impl Cell {
    /// Create a new cell.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Convert to cube coordinates.
    #[must_use]
    pub const fn to_cube(self) -> Cube {
        let x = self.col - self.row.div_euclid(2);
        let z = self.row;
        Cube { x, y: -x - z, z }
    }

    /// Hex distance to another cell.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        self.to_cube().distance(other.to_cube())
    }

    /// The six adjacent cells, east first, then counter-clockwise.
    #[must_use]
    pub fn neighbors(self) -> [Cell; 6] {
        let table = if self.row.rem_euclid(2) == 0 {
            &EVEN_ROW_DIRECTIONS
        } else {
            &ODD_ROW_DIRECTIONS
        };
        table.map(|(dc, dr)| Cell::new(self.col + dc, self.row + dr))
    }

    /// Whether `other` is one of the six adjacent cells.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from((col, row): (i32, i32)) -> Self {
        Self::new(col, row)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Cube coordinate. Always satisfies `x + y + z == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cube {
    /// X axis.
    pub x: i32,
    /// Y axis.
    pub y: i32,
    /// Z axis (equal to the offset row).
    pub z: i32,
}

impl Cube {
    /// Chebyshev distance between two cube coordinates.
    #[must_use]
    pub const fn distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        let m = if dx > dy { dx } else { dy };
        if m > dz {
            m
        } else {
            dz
        }
    }

    /// Convert back to an offset cell.
    #[must_use]
    pub const fn to_offset(self) -> Cell {
        Cell::new(self.x + self.z.div_euclid(2), self.z)
    }
}

/// Neighbor offsets for cells on even rows.
const EVEN_ROW_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // East
    (0, -1),  // North-east
    (-1, -1), // North-west
    (-1, 0),  // West
    (-1, 1),  // South-west
    (0, 1),   // South-east
];

/// Neighbor offsets for cells on odd rows.
const ODD_ROW_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),  // East
    (1, -1), // North-east
    (0, -1), // North-west
    (-1, 0), // West
    (0, 1),  // South-west
    (1, 1),  // South-east
];

/// Hex distance between two offset cells.
#[must_use]
pub const fn hex_distance(a: Cell, b: Cell) -> u32 {
    a.distance(b)
}
