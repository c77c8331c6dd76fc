use crate::direction::Direction;
use crate::grid::Cell;
use crate::util::Interval;
use itertools::iproduct;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned, inclusive rectangular region of grid cells.
///
/// Zones are computed once at simulation setup (crosswalk, waiting areas,
/// vehicle lanes) and never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zone {
    rows: Interval<i32>,
    cols: Interval<i32>,
}

impl Zone {
    /// Creates a zone from its inclusive corner coordinates.
    pub const fn new(start_row: i32, start_col: i32, end_row: i32, end_col: i32) -> Self {
        Self {
            rows: Interval::new(start_row, end_row),
            cols: Interval::new(start_col, end_col),
        }
    }

    /// The inclusive row range.
    pub fn rows(&self) -> Interval<i32> {
        self.rows
    }

    /// The inclusive column range.
    pub fn cols(&self) -> Interval<i32> {
        self.cols
    }

    /// The number of rows the zone spans.
    pub fn row_count(&self) -> u32 {
        (self.rows.length() + 1) as u32
    }

    /// The number of columns the zone spans.
    pub fn col_count(&self) -> u32 {
        (self.cols.length() + 1) as u32
    }

    /// Whether the cell lies inside the zone.
    pub fn contains(&self, cell: Cell) -> bool {
        self.rows.contains(cell.row) && self.cols.contains(cell.col)
    }

    /// The number of empty cells between `from` and the zone's near edge
    /// when travelling toward `facing`.
    ///
    /// `Some(0)` means the next cell ahead is already inside the zone.
    /// Returns `None` when the cell is inside the zone, past it, or on a
    /// line that never meets it.
    pub fn distance_until(&self, from: Cell, facing: Direction) -> Option<u32> {
        if self.contains(from) {
            return None;
        }
        let gap = match facing {
            Direction::South if self.cols.contains(from.col) => self.rows.min - from.row - 1,
            Direction::North if self.cols.contains(from.col) => from.row - self.rows.max - 1,
            Direction::East if self.rows.contains(from.row) => self.cols.min - from.col - 1,
            Direction::West if self.rows.contains(from.row) => from.col - self.cols.max - 1,
            _ => return None,
        };
        (gap >= 0).then(|| gap as u32)
    }

    /// Iterates over every cell of the zone, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(self.rows.min..=self.rows.max, self.cols.min..=self.cols.max)
            .map(|(row, col)| Cell::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction::*;

    #[test]
    fn contains_is_inclusive() {
        let zone = Zone::new(2, 3, 5, 9);
        assert!(zone.contains(Cell::new(2, 3)));
        assert!(zone.contains(Cell::new(5, 9)));
        assert!(!zone.contains(Cell::new(1, 3)));
        assert!(!zone.contains(Cell::new(2, 10)));
        assert_eq!(zone.row_count(), 4);
        assert_eq!(zone.col_count(), 7);
    }

    #[test]
    fn distance_until_counts_the_gap_ahead() {
        let zone = Zone::new(6, 0, 11, 9);
        // Southbound toward the zone: rows 3, 4, 5 lie between.
        assert_eq!(zone.distance_until(Cell::new(2, 4), South), Some(3));
        assert_eq!(zone.distance_until(Cell::new(5, 4), South), Some(0));
        // Inside and beyond there is no boundary ahead.
        assert_eq!(zone.distance_until(Cell::new(7, 4), South), None);
        assert_eq!(zone.distance_until(Cell::new(12, 4), South), None);
        // Northbound from below.
        assert_eq!(zone.distance_until(Cell::new(14, 4), North), Some(2));
    }

    #[test]
    fn distance_until_ignores_lines_missing_the_zone() {
        let zone = Zone::new(6, 2, 11, 5);
        assert_eq!(zone.distance_until(Cell::new(0, 8), South), None);
        assert_eq!(zone.distance_until(Cell::new(8, 0), East), Some(1));
        assert_eq!(zone.distance_until(Cell::new(8, 8), West), Some(2));
    }

    #[test]
    fn cells_cover_the_rectangle() {
        let zone = Zone::new(1, 1, 2, 3);
        let cells: Vec<Cell> = zone.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(1, 1));
        assert_eq!(cells[5], Cell::new(2, 3));
    }
}
