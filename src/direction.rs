#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four compass directions an agent can face.
///
/// Pedestrians walk east or west across the carriageway;
/// vehicles drive north or south along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The direction facing the opposite way.
    ///
    /// This mapping is an involution: `d.opposite().opposite() == d`.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}
