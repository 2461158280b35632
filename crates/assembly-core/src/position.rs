//! Grid coordinates and the scanned area.

use serde::{Deserialize, Serialize};
use std::ops::Add;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// The grid origin. The rocket is looked up here by the terminal output check.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another position.
    pub fn chebyshev_distance(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// `self + offset`, or `None` past the edge of the `i32` range.
    pub fn checked_add(self, offset: Offset) -> Option<Position> {
        Some(Position::new(
            self.x.checked_add(offset.dx)?,
            self.y.checked_add(offset.dy)?,
        ))
    }
}

impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, rhs: Offset) -> Position {
        Position::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A relative displacement between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

// ---------------------------------------------------------------------------
// GridBounds
// ---------------------------------------------------------------------------

/// Half-open rectangle `[min, max)` of cells scanned on every rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min: Position,
    pub max: Position,
}

impl GridBounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Whether `pos` lies inside the rectangle (max is exclusive).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x < self.max.x && pos.y >= self.min.y && pos.y < self.max.y
    }

    /// Number of cells covered. Zero when max does not exceed min.
    pub fn area(&self) -> usize {
        let span = |lo: i32, hi: i32| if hi > lo { hi.abs_diff(lo) as usize } else { 0 };
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y)
    }

    /// Iterate every cell, column by column: x outer, y inner.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let (min, max) = (self.min, self.max);
        (min.x..max.x).flat_map(move |x| (min.y..max.y).map(move |y| Position::new(x, y)))
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self {
            min: Position::new(-32, -32),
            max: Position::new(32, 32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance_is_max_axis_delta() {
        let a = Position::new(0, 0);
        assert_eq!(a.chebyshev_distance(&Position::new(1, -1)), 1);
        assert_eq!(a.chebyshev_distance(&Position::new(-1, 0)), 1);
        assert_eq!(a.chebyshev_distance(&Position::new(2, -1)), 2);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn position_plus_offset() {
        let p = Position::new(3, -2) + Offset::new(-1, 1);
        assert_eq!(p, Position::new(2, -1));
    }

    #[test]
    fn checked_add_stops_at_the_edge() {
        let edge = Position::new(i32::MIN, i32::MAX);
        assert_eq!(edge.checked_add(Offset::new(-1, 0)), None);
        assert_eq!(edge.checked_add(Offset::new(0, 1)), None);
        assert_eq!(
            edge.checked_add(Offset::new(1, -1)),
            Some(Position::new(i32::MIN + 1, i32::MAX - 1))
        );
        assert_eq!(edge.chebyshev_distance(&Position::ORIGIN), i32::MIN.unsigned_abs());
    }

    #[test]
    fn bounds_are_half_open() {
        let b = GridBounds::new(Position::new(-1, -1), Position::new(1, 1));
        assert!(b.contains(Position::new(-1, -1)));
        assert!(b.contains(Position::new(0, 0)));
        assert!(!b.contains(Position::new(1, 0)));
        assert!(!b.contains(Position::new(0, 1)));
        assert_eq!(b.area(), 4);
    }

    #[test]
    fn cells_scan_x_outer_y_inner() {
        let b = GridBounds::new(Position::new(0, 0), Position::new(2, 2));
        let cells: Vec<Position> = b.cells().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn inverted_bounds_are_empty() {
        let b = GridBounds::new(Position::new(2, 2), Position::new(0, 0));
        assert_eq!(b.area(), 0);
        assert_eq!(b.cells().count(), 0);
    }
}
