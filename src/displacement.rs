use crate::direction::Direction;
use crate::grid::Cell;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A displacement relative to an agent's facing direction, in cells.
///
/// `forward` is positive ahead of the agent and negative behind it;
/// `lateral` is positive to the agent's right and negative to its left.
/// Displacements compose by component-wise addition and can be shrunk
/// one step toward [still](Self::still) to resolve a contended move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Displacement {
    /// Cells ahead (positive) or behind (negative).
    pub forward: i32,
    /// Cells to the right (positive) or left (negative).
    pub lateral: i32,
}

impl Displacement {
    /// The zero displacement.
    pub const fn still() -> Self {
        Self {
            forward: 0,
            lateral: 0,
        }
    }

    /// A displacement of `amount` cells straight ahead.
    pub const fn forward(amount: i32) -> Self {
        Self {
            forward: amount,
            lateral: 0,
        }
    }

    /// A displacement of `amount` cells straight behind.
    pub const fn backward(amount: i32) -> Self {
        Self {
            forward: -amount,
            lateral: 0,
        }
    }

    /// A displacement of `amount` cells to the right.
    pub const fn right(amount: i32) -> Self {
        Self {
            forward: 0,
            lateral: amount,
        }
    }

    /// A displacement of `amount` cells to the left.
    pub const fn left(amount: i32) -> Self {
        Self {
            forward: 0,
            lateral: -amount,
        }
    }

    /// Whether this is the zero displacement.
    pub fn is_still(self) -> bool {
        self.forward == 0 && self.lateral == 0
    }

    /// The number of [shrink](Self::shrink) steps needed to reach still.
    pub fn magnitude(self) -> u32 {
        u32::max(self.forward.unsigned_abs(), self.lateral.unsigned_abs())
    }

    /// Reduces the magnitude of each nonzero component by one.
    pub fn shrink(&mut self) {
        self.forward -= self.forward.signum();
        self.lateral -= self.lateral.signum();
    }

    /// The single-cell step in the same direction as this displacement.
    pub fn unit_step(self) -> Self {
        Self {
            forward: self.forward.signum(),
            lateral: self.lateral.signum(),
        }
    }

    /// Resolves the displacement to an absolute cell, given the facing
    /// direction it is expressed in and the cell it is anchored at.
    pub fn apply(self, facing: Direction, origin: Cell) -> Cell {
        let (row, col) = match facing {
            Direction::East => (origin.row + self.lateral, origin.col + self.forward),
            Direction::West => (origin.row - self.lateral, origin.col - self.forward),
            Direction::North => (origin.row - self.forward, origin.col + self.lateral),
            Direction::South => (origin.row + self.forward, origin.col - self.lateral),
        };
        Cell { row, col }
    }
}

impl std::ops::Add for Displacement {
    type Output = Displacement;

    fn add(self, rhs: Self) -> Self {
        Self {
            forward: self.forward + rhs.forward,
            lateral: self.lateral + rhs.lateral,
        }
    }
}

impl std::ops::Sub for Displacement {
    type Output = Displacement;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl std::ops::Neg for Displacement {
    type Output = Displacement;

    fn neg(self) -> Self {
        Self {
            forward: -self.forward,
            lateral: -self.lateral,
        }
    }
}
