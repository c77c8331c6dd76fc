use crate::direction::Direction;
use crate::displacement::Displacement;
use crate::error::GridError;
use crate::grid::Grid;
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::signal::TrafficSignal;
use crate::zone::Zone;
use crate::{EntityId, EntitySet};
use arrayvec::ArrayVec;

/// The fastest velocity class a pedestrian can have, and the class every
/// pedestrian is pushed to while caught in the crosswalk on a red signal.
pub const MAX_VELOCITY: u32 = 6;

/// How far behind a lane-change target cell a same-direction follower is
/// considered. A follower further back cannot reach the merge cell within
/// one tick, since no velocity class exceeds [MAX_VELOCITY].
const LANE_CHANGE_LOOKBACK: u32 = MAX_VELOCITY;

const CALM_GLYPHS: [char; 7] = ['😀', '😁', '🙃', '🤔', '😶', '🙄', '😎'];
const DISTRESSED_GLYPH: char = '😰';

/// The result of a pedestrian movement attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PedestrianStep {
    /// The pedestrian walked off its bounding zone and left the grid.
    pub exited: bool,
    /// The pedestrian contended with a vehicle for its next cell.
    pub conflict: bool,
}

/// A pedestrian crossing the carriageway.
#[derive(Clone, Copy, Debug)]
pub struct Pedestrian {
    view: RelativeGrid,
    /// Velocity class in cells per tick, drawn once at spawn.
    velocity: u32,
    /// Latched on first entering the crosswalk zone.
    crossing: bool,
    desired: Displacement,
    glyph: char,
}

impl Pedestrian {
    /// Creates a pedestrian anchored at a spawn view, drawing its velocity
    /// class and glyph from the generator.
    pub(crate) fn spawn(view: RelativeGrid, rng: &mut SimRng) -> Self {
        let velocity = Self::draw_velocity(rng);
        let glyph = *rng.choose(&CALM_GLYPHS).expect("glyph palette is not empty");
        Self {
            view,
            velocity,
            crossing: false,
            desired: Displacement::still(),
            glyph,
        }
    }

    /// Creates a pedestrian with a fixed velocity class.
    #[cfg(test)]
    pub(crate) fn with_velocity(view: RelativeGrid, velocity: u32) -> Self {
        Self {
            view,
            velocity,
            crossing: false,
            desired: Displacement::still(),
            glyph: CALM_GLYPHS[0],
        }
    }

    /// Draws a velocity class from the empirical walking-speed distribution.
    fn draw_velocity(rng: &mut SimRng) -> u32 {
        let p = rng.random();
        if p > 0.978 {
            6
        } else if p > 0.93 {
            5
        } else if p > 0.793 {
            4
        } else if p > 0.273 {
            3
        } else {
            2
        }
    }

    pub fn facing(&self) -> Direction {
        self.view.facing()
    }

    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    pub fn is_crossing(&self) -> bool {
        self.crossing
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    /// The pedestrian's view over the grid; its anchor is the cell the
    /// pedestrian stands on.
    pub fn view(&self) -> RelativeGrid {
        self.view
    }

    /// The displacement decided by the last think, still by default.
    pub fn desired(&self) -> Displacement {
        self.desired
    }

    /// Decides the displacement to attempt this tick.
    ///
    /// On red, a pedestrian outside the crosswalk waits; one caught inside
    /// hurries through at the maximum velocity class. Otherwise it walks
    /// forward up to its velocity, clipped behind the nearest non-oncoming
    /// agent, or side-steps one cell when the way ahead is blocked and a
    /// neighbouring lane accepts it.
    pub(crate) fn think(
        &mut self,
        grid: &Grid<EntityId>,
        entities: &EntitySet,
        crosswalk: &Zone,
        signal: &TrafficSignal,
        rng: &mut SimRng,
    ) {
        if signal.is_red() && !self.view.is_in(crosswalk) {
            self.desired = Displacement::still();
            return;
        }
        // Past the gate above, red implies the pedestrian is mid-crossing.
        let hurrying = signal.is_red();
        if hurrying {
            self.glyph = DISTRESSED_GLYPH;
        }
        let velocity = if hurrying { MAX_VELOCITY } else { self.velocity };

        let facing_of = |id: EntityId| entities[id].facing();
        if !self.view.is_obstructed(grid, Displacement::forward(1), facing_of) {
            self.desired = self.forward_advance(grid, entities, velocity);
            return;
        }

        let mut legal: ArrayVec<Displacement, 2> = ArrayVec::new();
        for side in [Displacement::left(1), Displacement::right(1)] {
            if self.accepts_gap(grid, entities, side, velocity) {
                legal.push(side);
            }
        }
        self.desired = match legal.as_slice() {
            [] => Displacement::still(),
            [only] => *only,
            _ => {
                if rng.random() > 0.5 {
                    Displacement::left(1)
                } else {
                    Displacement::right(1)
                }
            }
        };
    }

    /// The forward displacement, clipped behind the nearest agent ahead
    /// that is not facing the exactly-opposite direction.
    fn forward_advance(
        &self,
        grid: &Grid<EntityId>,
        entities: &EntitySet,
        velocity: u32,
    ) -> Displacement {
        let oncoming = self.view.facing().opposite();
        let gap = self
            .view
            .nearest_ahead(grid, Displacement::still(), None, |id| {
                entities[id].facing() != oncoming
            })
            .map(|(gap, _)| gap);
        match gap {
            Some(gap) if gap <= velocity => Displacement::forward(gap as i32),
            _ => Displacement::forward(velocity as i32),
        }
    }

    /// Gap acceptance for a one-cell lateral move.
    ///
    /// The target must be in bounds and unobstructed; a same-direction
    /// follower behind the target lane must be strictly slower; and no
    /// oncoming agent may be within this pedestrian's velocity ahead of it.
    fn accepts_gap(
        &self,
        grid: &Grid<EntityId>,
        entities: &EntitySet,
        side: Displacement,
        velocity: u32,
    ) -> bool {
        if !self.view.in_bounds(grid, side) {
            return false;
        }
        let facing_of = |id: EntityId| entities[id].facing();
        if self.view.is_obstructed(grid, side, facing_of) {
            return false;
        }
        let same_direction = |id: EntityId| entities[id].facing() == self.view.facing();
        if let Some((_, follower)) =
            self.view
                .nearest_behind(grid, side, Some(LANE_CHANGE_LOOKBACK), same_direction)
        {
            if entities[follower].velocity() >= velocity {
                return false;
            }
        }
        let oncoming = |id: EntityId| entities[id].facing() == self.view.facing().opposite();
        self.view
            .nearest_ahead(grid, side, Some(velocity + 1), oncoming)
            .is_none()
    }

    /// Attempts the displacement decided by [think](Self::think).
    ///
    /// A target beyond the bounding zone removes the pedestrian (it has
    /// finished crossing or left the area). An occupied next cell cancels
    /// the move, counting a conflict when the occupant is a vehicle; any
    /// remaining contention is resolved by the view's shrink-and-retry.
    pub(crate) fn step(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &EntitySet,
        crosswalk: &Zone,
    ) -> Result<PedestrianStep, GridError> {
        let desired = std::mem::replace(&mut self.desired, Displacement::still());
        if !self.view.in_bounds(grid, desired) {
            self.view.clear(grid)?;
            return Ok(PedestrianStep {
                exited: true,
                conflict: false,
            });
        }
        if desired.is_still() {
            return Ok(PedestrianStep::default());
        }

        let mut attempt = desired;
        let mut conflict = false;
        if let Some(blocker) = self.view.entity_at(grid, desired.unit_step()) {
            conflict = entities[blocker].is_vehicle();
            attempt = Displacement::still();
        }
        self.view.move_by(grid, attempt)?;
        self.crossing = self.crossing || self.view.is_in(crosswalk);
        Ok(PedestrianStep {
            exited: false,
            conflict,
        })
    }
}
