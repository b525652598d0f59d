//! Grid geometry: positions, offsets, cardinal directions, radius queries.
//!
//! The signal graph is spatial: every node occupies one grid cell and every
//! port is positioned by a relative offset from its owner. Radial emitters
//! cache a cell set computed from these primitives once at spawn.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GridPosition
// ---------------------------------------------------------------------------

/// A position on the 2D world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Squared Euclidean distance to another position.
    pub fn distance_squared(&self, other: &GridPosition) -> u64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        (dx * dx + dy * dy) as u64
    }

    /// The position reached by applying an offset.
    pub fn offset_by(&self, offset: GridOffset) -> GridPosition {
        GridPosition::new(self.x + offset.dx, self.y + offset.dy)
    }
}

// ---------------------------------------------------------------------------
// GridOffset
// ---------------------------------------------------------------------------

/// A relative grid delta. Ports are positioned by an offset from their
/// owning node; a zero offset names the owner's own cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridOffset {
    pub dx: i32,
    pub dy: i32,
}

impl GridOffset {
    pub const ZERO: GridOffset = GridOffset { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// The reciprocal offset: the delta a peer port must expose to point
    /// back at this port's owner.
    pub fn reciprocal(&self) -> GridOffset {
        GridOffset::new(-self.dx, -self.dy)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Cardinal directions, used for default port layouts and toggle labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Unit offset for this direction.
    pub fn offset(&self) -> GridOffset {
        match self {
            Direction::North => GridOffset::new(0, -1),
            Direction::East => GridOffset::new(1, 0),
            Direction::South => GridOffset::new(0, 1),
            Direction::West => GridOffset::new(-1, 0),
        }
    }

    /// The direction matching a unit offset, if any.
    pub fn from_offset(offset: GridOffset) -> Option<Direction> {
        Direction::all().into_iter().find(|d| d.offset() == offset)
    }

    /// Lowercase label for toggle commands.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

// ---------------------------------------------------------------------------
// Radius queries
// ---------------------------------------------------------------------------

/// All cells within `radius` of `center` (Euclidean, inclusive), in row-major
/// order. Deterministic order matters: radial emitters iterate the cached
/// result on every emission.
pub fn cells_in_radius(center: GridPosition, radius: u32) -> Vec<GridPosition> {
    let r = radius as i32;
    let r_sq = (radius as u64) * (radius as u64);
    let mut cells = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let cell = GridPosition::new(center.x + dx, center.y + dy);
            if center.distance_squared(&cell) <= r_sq {
                cells.push(cell);
            }
        }
    }
    cells
}

// ===========================================================================
// Tests
// ===========================================================================
