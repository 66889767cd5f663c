use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of a zone along each axis. A zone is the environment a worker perceives.
pub const ZONE_SIZE: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn zone(self) -> Zone {
        Zone {
            x: self.x.div_euclid(ZONE_SIZE),
            y: self.y.div_euclid(ZONE_SIZE),
        }
    }

    /// Chebyshev distance, the number of single-tile steps between two positions.
    pub fn range_to(self, other: Position) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    pub fn within_range(self, other: Position, range: u32) -> bool {
        self.range_to(other) <= range
    }

    /// One greedy step toward `target`; stays put when already there.
    pub fn step_toward(self, target: Position) -> Position {
        self.offset(
            (target.x - self.x).signum(),
            (target.y - self.y).signum(),
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Zone {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z{}:{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_chebyshev() {
        let a = Position::new(0, 0);
        assert_eq!(a.range_to(Position::new(3, -1)), 3);
        assert_eq!(a.range_to(Position::new(-2, 2)), 2);
        assert!(a.within_range(Position::new(1, 1), 1));
        assert!(!a.within_range(Position::new(2, 0), 1));
    }

    #[test]
    fn zones_floor_negative_coordinates() {
        assert_eq!(Position::new(-1, 0).zone(), Zone { x: -1, y: 0 });
        assert_eq!(Position::new(15, 16).zone(), Zone { x: 0, y: 1 });
    }

    #[test]
    fn step_moves_one_tile_diagonally() {
        let from = Position::new(0, 0);
        assert_eq!(from.step_toward(Position::new(5, -3)), Position::new(1, -1));
        assert_eq!(from.step_toward(Position::new(0, 4)), Position::new(0, 1));
        assert_eq!(from.step_toward(from), from);
    }
}
