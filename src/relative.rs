use crate::direction::Direction;
use crate::displacement::Displacement;
use crate::error::GridError;
use crate::grid::{Cell, Grid};
use crate::zone::Zone;

/// How a movement attempt resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The entity relocated by the (possibly shrunk) displacement.
    Moved(Displacement),
    /// Every candidate target was contended; the entity did not move.
    Stayed,
    /// The target was out of bounds; the entity left the grid.
    Exited,
}

/// A facing- and zone-scoped view over the grid.
///
/// Re-expresses grid queries in forward/lateral terms from an anchor cell,
/// and owns the single-cell move protocol. The view never stores a grid
/// reference; every operation borrows the grid it acts on, which keeps an
/// agent's own record and the shared cell store separately borrowable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelativeGrid {
    anchor: Cell,
    facing: Direction,
    bounds: Zone,
}

impl RelativeGrid {
    /// Creates a view anchored at a cell, looking toward `facing`, confined
    /// to `bounds`.
    pub fn new(anchor: Cell, facing: Direction, bounds: Zone) -> Self {
        Self {
            anchor,
            facing,
            bounds,
        }
    }

    /// The cell the view is anchored at.
    pub fn anchor(&self) -> Cell {
        self.anchor
    }

    /// The direction the view is facing.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// The bounding zone moves are confined to.
    pub fn bounds(&self) -> Zone {
        self.bounds
    }

    /// A sibling view anchored `displacement` away.
    pub fn displaced(&self, displacement: Displacement) -> Self {
        Self {
            anchor: self.absolute(displacement),
            ..*self
        }
    }

    /// Resolves a displacement to an absolute cell.
    pub fn absolute(&self, displacement: Displacement) -> Cell {
        displacement.apply(self.facing, self.anchor)
    }

    /// Whether the anchor lies inside the given zone.
    pub fn is_in(&self, zone: &Zone) -> bool {
        zone.contains(self.anchor)
    }

    /// Whether the displaced cell is inside both the bounding zone and the
    /// grid extent.
    pub fn in_bounds<T: Copy>(&self, grid: &Grid<T>, displacement: Displacement) -> bool {
        let cell = self.absolute(displacement);
        self.bounds.contains(cell) && grid.in_extent(cell)
    }

    /// Whether the displaced cell is physically occupied.
    pub fn is_filled<T: Copy>(&self, grid: &Grid<T>, displacement: Displacement) -> bool {
        grid.get(self.absolute(displacement)).is_some()
    }

    /// The occupant of the displaced cell, if any.
    pub fn entity_at<T: Copy>(&self, grid: &Grid<T>, displacement: Displacement) -> Option<T> {
        grid.get(self.absolute(displacement))
    }

    /// Whether the displaced cell blocks travel in this view's direction.
    ///
    /// An occupant facing the exactly-opposite direction does not block:
    /// oncoming agents pass through each other's planning space and only
    /// contend at the move step. `facing_of` resolves an occupant to its
    /// facing direction.
    pub fn is_obstructed<T: Copy>(
        &self,
        grid: &Grid<T>,
        displacement: Displacement,
        facing_of: impl Fn(T) -> Direction,
    ) -> bool {
        match self.entity_at(grid, displacement) {
            Some(occupant) => facing_of(occupant) != self.facing.opposite(),
            None => false,
        }
    }

    /// Scans ahead of the displaced cell for the nearest occupant matching
    /// the predicate. Returns the gap (empty cells between) and the occupant.
    pub fn nearest_ahead<T: Copy>(
        &self,
        grid: &Grid<T>,
        displacement: Displacement,
        max_distance: Option<u32>,
        pred: impl Fn(T) -> bool,
    ) -> Option<(u32, T)> {
        grid.nearest(self.absolute(displacement), self.facing, max_distance, pred)
    }

    /// Scans behind the displaced cell, symmetric to
    /// [nearest_ahead](Self::nearest_ahead).
    pub fn nearest_behind<T: Copy>(
        &self,
        grid: &Grid<T>,
        displacement: Displacement,
        max_distance: Option<u32>,
        pred: impl Fn(T) -> bool,
    ) -> Option<(u32, T)> {
        grid.nearest(
            self.absolute(displacement),
            self.facing.opposite(),
            max_distance,
            pred,
        )
    }

    /// Introduces a new value at the displaced cell, returning a view
    /// anchored there for the spawned entity to own.
    pub fn spawn<T: Copy>(
        &self,
        grid: &mut Grid<T>,
        displacement: Displacement,
        value: T,
    ) -> Result<RelativeGrid, GridError> {
        let cell = self.absolute(displacement);
        if !self.in_bounds(grid, displacement) {
            return Err(GridError::OutOfBounds {
                row: cell.row,
                col: cell.col,
            });
        }
        grid.fill(cell, value)?;
        Ok(Self {
            anchor: cell,
            ..*self
        })
    }

    /// Removes the anchored value from the grid (the entity exits).
    pub fn clear<T: Copy>(&self, grid: &mut Grid<T>) -> Result<T, GridError> {
        grid.clear(self.anchor)
    }

    /// Attempts to relocate the anchored value by a displacement.
    ///
    /// A still displacement is a no-op. An out-of-bounds target removes the
    /// value from the grid entirely (the entity has exited). A contended
    /// target shrinks the displacement one step toward still and retries;
    /// the retry count is bounded by the initial magnitude, so the loop
    /// always terminates. On success the view's anchor advances with the
    /// value.
    ///
    /// Moving an empty anchor cell is an invariant violation.
    pub fn move_by<T: Copy>(
        &mut self,
        grid: &mut Grid<T>,
        displacement: Displacement,
    ) -> Result<MoveOutcome, GridError> {
        if displacement.is_still() {
            return Ok(MoveOutcome::Stayed);
        }
        let value = grid.get(self.anchor).ok_or(GridError::CellEmpty {
            row: self.anchor.row,
            col: self.anchor.col,
        })?;
        if !self.in_bounds(grid, displacement) {
            grid.clear(self.anchor)?;
            return Ok(MoveOutcome::Exited);
        }

        let mut step = displacement;
        for _ in 0..displacement.magnitude() {
            if step.is_still() {
                break;
            }
            let target = self.absolute(step);
            if grid.occupied(target) {
                step.shrink();
                continue;
            }
            grid.fill(target, value)?;
            grid.clear(self.anchor)?;
            self.anchor = target;
            return Ok(MoveOutcome::Moved(step));
        }
        Ok(MoveOutcome::Stayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction::*;

    fn view(row: i32, col: i32, facing: Direction) -> RelativeGrid {
        RelativeGrid::new(Cell::new(row, col), facing, Zone::new(0, 0, 5, 9))
    }

    #[test]
    fn translates_relative_to_facing() {
        let east = view(2, 3, East);
        assert_eq!(east.absolute(Displacement::forward(2)), Cell::new(2, 5));
        assert_eq!(east.absolute(Displacement::right(1)), Cell::new(3, 3));

        let west = view(2, 3, West);
        assert_eq!(west.absolute(Displacement::forward(2)), Cell::new(2, 1));
        assert_eq!(west.absolute(Displacement::right(1)), Cell::new(1, 3));

        let south = view(2, 3, South);
        assert_eq!(south.absolute(Displacement::forward(1)), Cell::new(3, 3));
        assert_eq!(south.absolute(Displacement::left(1)), Cell::new(2, 4));
    }

    #[test]
    fn still_move_never_mutates() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 3), 1u32).unwrap();
        let mut v = view(2, 3, East);
        let outcome = v.move_by(&mut grid, Displacement::still()).unwrap();
        assert_eq!(outcome, MoveOutcome::Stayed);
        assert_eq!(v.anchor(), Cell::new(2, 3));
        assert!(grid.occupied(Cell::new(2, 3)));
    }

    #[test]
    fn moves_relocate_value_and_anchor() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 3), 1u32).unwrap();
        let mut v = view(2, 3, East);
        let outcome = v.move_by(&mut grid, Displacement::forward(2)).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved(Displacement::forward(2)));
        assert_eq!(v.anchor(), Cell::new(2, 5));
        assert!(!grid.occupied(Cell::new(2, 3)));
        assert_eq!(grid.get(Cell::new(2, 5)), Some(1));
    }

    #[test]
    fn contended_moves_shrink_until_free() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 3), 1u32).unwrap();
        grid.fill(Cell::new(2, 6), 2u32).unwrap();
        let mut v = view(2, 3, East);
        let outcome = v.move_by(&mut grid, Displacement::forward(3)).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved(Displacement::forward(2)));
        assert_eq!(v.anchor(), Cell::new(2, 5));
    }

    #[test]
    fn fully_blocked_moves_stay_put() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 3), 1u32).unwrap();
        grid.fill(Cell::new(2, 4), 2u32).unwrap();
        let mut v = view(2, 3, East);
        let outcome = v.move_by(&mut grid, Displacement::forward(1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Stayed);
        assert_eq!(v.anchor(), Cell::new(2, 3));
        assert_eq!(grid.get(Cell::new(2, 3)), Some(1));
    }

    #[test]
    fn out_of_bounds_target_exits_the_grid() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 8), 1u32).unwrap();
        let mut v = view(2, 8, East);
        let outcome = v.move_by(&mut grid, Displacement::forward(3)).unwrap();
        assert_eq!(outcome, MoveOutcome::Exited);
        assert!(!grid.occupied(Cell::new(2, 8)));
    }

    #[test]
    fn moving_an_empty_anchor_is_an_invariant_violation() {
        let mut grid = Grid::<u32>::new(6, 10);
        let mut v = view(2, 3, East);
        let err = v.move_by(&mut grid, Displacement::forward(1)).unwrap_err();
        assert_eq!(err, GridError::CellEmpty { row: 2, col: 3 });
    }

    #[test]
    fn spawn_rejects_occupied_and_out_of_bounds_targets() {
        let mut grid = Grid::new(6, 10);
        let v = view(2, 0, East);
        let spawned = v.spawn(&mut grid, Displacement::right(1), 7u32).unwrap();
        assert_eq!(spawned.anchor(), Cell::new(3, 0));
        assert_eq!(
            v.spawn(&mut grid, Displacement::right(1), 8u32),
            Err(GridError::CellOccupied { row: 3, col: 0 })
        );
        assert_eq!(
            v.spawn(&mut grid, Displacement::backward(1), 8u32),
            Err(GridError::OutOfBounds { row: 2, col: -1 })
        );
    }

    #[test]
    fn oncoming_occupants_do_not_obstruct() {
        let mut grid = Grid::new(6, 10);
        grid.fill(Cell::new(2, 4), 1u32).unwrap();
        let v = view(2, 3, East);
        let facing_of = |_: u32| West;
        assert!(!v.is_obstructed(&grid, Displacement::forward(1), facing_of));
        let facing_of = |_: u32| East;
        assert!(v.is_obstructed(&grid, Displacement::forward(1), facing_of));
        let facing_of = |_: u32| North;
        assert!(v.is_obstructed(&grid, Displacement::forward(1), facing_of));
    }

    #[test]
    fn bounds_confine_moves_before_the_grid_edge() {
        let mut grid = Grid::new(6, 10);
        let narrow = Zone::new(0, 0, 5, 4);
        grid.fill(Cell::new(2, 4), 1u32).unwrap();
        let mut v = RelativeGrid::new(Cell::new(2, 4), East, narrow);
        let outcome = v.move_by(&mut grid, Displacement::forward(1)).unwrap();
        assert_eq!(outcome, MoveOutcome::Exited);
    }
}
