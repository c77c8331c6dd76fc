use crate::direction::Direction;
use crate::error::GridError;
use crate::rng::SimRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An absolute grid coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The adjacent cell one step toward the given direction.
    fn step(self, toward: Direction) -> Self {
        match toward {
            Direction::North => Cell::new(self.row - 1, self.col),
            Direction::South => Cell::new(self.row + 1, self.col),
            Direction::East => Cell::new(self.row, self.col + 1),
            Direction::West => Cell::new(self.row, self.col - 1),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The 2D cell store. Each cell holds at most one value.
///
/// The value type is a bare copyable token (the simulation stores entity
/// ids); the grid itself knows nothing about what occupies it.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    cells: Vec<Option<T>>,
    rows: i32,
    cols: i32,
}

impl<T: Copy> Grid<T> {
    /// Creates an empty grid of the given dimensions.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            cells: vec![None; (rows * cols) as usize],
            rows: rows as i32,
            cols: cols as i32,
        }
    }

    /// The number of rows in the grid.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// The number of columns in the grid.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Whether the cell lies inside the grid extent.
    pub fn in_extent(&self, cell: Cell) -> bool {
        (0..self.rows).contains(&cell.row) && (0..self.cols).contains(&cell.col)
    }

    fn index(&self, cell: Cell) -> usize {
        (cell.row * self.cols + cell.col) as usize
    }

    /// Whether the cell is occupied.
    ///
    /// A cell outside the column range is reported as unoccupied (agents
    /// walk off the ends of rows and exit). A row outside the grid is a
    /// caller bug.
    ///
    /// # Panics
    /// Panics if `cell.row` is outside the grid.
    pub fn occupied(&self, cell: Cell) -> bool {
        assert!(
            (0..self.rows).contains(&cell.row),
            "row {} out of bounds scanning cell {} (grid is {}x{})",
            cell.row,
            cell,
            self.rows,
            self.cols,
        );
        if !(0..self.cols).contains(&cell.col) {
            return false;
        }
        self.cells[self.index(cell)].is_some()
    }

    /// The value stored at the cell, if any. Out-of-extent cells are empty.
    pub fn get(&self, cell: Cell) -> Option<T> {
        if !self.in_extent(cell) {
            return None;
        }
        self.cells[self.index(cell)]
    }

    /// Stores a value in an empty cell.
    pub fn fill(&mut self, cell: Cell, value: T) -> Result<(), GridError> {
        if !self.in_extent(cell) {
            return Err(GridError::OutOfBounds {
                row: cell.row,
                col: cell.col,
            });
        }
        let idx = self.index(cell);
        if self.cells[idx].is_some() {
            return Err(GridError::CellOccupied {
                row: cell.row,
                col: cell.col,
            });
        }
        self.cells[idx] = Some(value);
        Ok(())
    }

    /// Removes and returns the value stored at the cell.
    pub fn clear(&mut self, cell: Cell) -> Result<T, GridError> {
        if !self.in_extent(cell) {
            return Err(GridError::OutOfBounds {
                row: cell.row,
                col: cell.col,
            });
        }
        let idx = self.index(cell);
        self.cells[idx].take().ok_or(GridError::CellEmpty {
            row: cell.row,
            col: cell.col,
        })
    }

    /// Scans strictly away from `from` toward a direction for the nearest
    /// occupied cell whose value satisfies the predicate.
    ///
    /// Returns the number of empty cells between `from` and the match (so an
    /// adjacent occupant yields a distance of zero) together with the
    /// occupant. The scan stops at the grid extent, or after examining
    /// `max_distance` cells when given.
    pub fn nearest(
        &self,
        from: Cell,
        toward: Direction,
        max_distance: Option<u32>,
        pred: impl Fn(T) -> bool,
    ) -> Option<(u32, T)> {
        let mut cell = from;
        let mut checked = 0;
        loop {
            cell = cell.step(toward);
            if !self.in_extent(cell) {
                return None;
            }
            if let Some(max) = max_distance {
                if checked >= max {
                    return None;
                }
            }
            if let Some(value) = self.cells[self.index(cell)] {
                if pred(value) {
                    return Some((checked, value));
                }
            }
            checked += 1;
        }
    }

    /// Collects every occupied cell, row-major.
    pub fn occupied_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let cell = Cell::new(row, col);
                if self.cells[self.index(cell)].is_some() {
                    out.push(cell);
                }
            }
        }
        out
    }

    /// Collects every occupied cell in an order drawn uniformly at random
    /// from the generator. Each call draws a fresh order, so sequential
    /// per-cell processing carries no directional bias in aggregate.
    pub fn occupied_in_random_order(&self, rng: &mut SimRng) -> Vec<Cell> {
        let mut cells = self.occupied_cells();
        rng.shuffle(&mut cells);
        cells
    }
}
