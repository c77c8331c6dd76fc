use crate::direction::Direction;
use crate::displacement::Displacement;
use crate::error::GridError;
use crate::grid::Grid;
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::signal::TrafficSignal;
use crate::zone::Zone;
use crate::{EntityId, EntitySet};
use itertools::iproduct;
use smallvec::SmallVec;

/// Every vehicle advances at this many cells per tick when unconstrained.
pub const VEHICLE_VELOCITY: u32 = 5;

const VEHICLE_GLYPHS: [char; 7] = ['🟥', '🟧', '🟨', '🟩', '🟦', '🟪', '🟫'];

/// How a vehicle behaves toward the pedestrian signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleKind {
    /// Drives through; holds at the stop line while pedestrians have right
    /// of way.
    Straight,
    /// Turns in across the crosswalk from its own protected phase; not
    /// gated by the pedestrian signal, yields only physically.
    Turning,
}

/// The result of a vehicle movement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VehicleStep {
    /// The footprint did not move. `conflict` is set when a pedestrian
    /// occupied a cell the footprint would have swept through.
    Stayed { conflict: bool },
    /// Every footprint cell advanced by the desired displacement.
    Advanced,
    /// The driver's target left the lane; the whole footprint was removed.
    Exited,
}

/// A vehicle occupying a rectangular footprint of cells.
///
/// The view is anchored at the driver cell, on the footprint's leading row;
/// the remaining cells are [VehiclePart] entities owned through `parts`.
/// All cells move together or not at all.
#[derive(Clone, Debug)]
pub struct Vehicle {
    view: RelativeGrid,
    kind: VehicleKind,
    velocity: u32,
    /// Footprint width in lateral cells.
    width: u32,
    /// Footprint length in cells along the travel axis.
    length: u32,
    /// Latched on first entering the crosswalk zone.
    crossing: bool,
    desired: Displacement,
    glyph: char,
    parts: SmallVec<[EntityId; 8]>,
}

/// One non-driver cell of a vehicle footprint.
///
/// Parts carry no decision logic; think and move are delegated to the
/// owning vehicle, which the simulation resolves through `owner`.
#[derive(Clone, Copy, Debug)]
pub struct VehiclePart {
    owner: EntityId,
    facing: Direction,
    glyph: char,
}

impl VehiclePart {
    pub(crate) fn new(owner: EntityId, facing: Direction, glyph: char) -> Self {
        Self {
            owner,
            facing,
            glyph,
        }
    }

    /// The vehicle this cell belongs to.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }
}

impl Vehicle {
    /// Creates a vehicle record anchored at the driver view. The caller
    /// owns placing the footprint on the grid and attaching part ids.
    pub(crate) fn new(
        view: RelativeGrid,
        kind: VehicleKind,
        width: u32,
        length: u32,
        rng: &mut SimRng,
    ) -> Self {
        let glyph = *rng
            .choose(&VEHICLE_GLYPHS)
            .expect("glyph palette is not empty");
        Self {
            view,
            kind,
            velocity: VEHICLE_VELOCITY,
            width,
            length,
            crossing: false,
            desired: Displacement::still(),
            glyph,
            parts: SmallVec::new(),
        }
    }

    /// The displacement of every footprint cell from the driver cell, in
    /// the order cells must move: leading row first, then rearward.
    pub(crate) fn footprint_offsets(width: u32, length: u32) -> impl Iterator<Item = Displacement> {
        iproduct!(0..length as i32, 0..width as i32)
            .map(|(back, side)| Displacement::right(side) + Displacement::backward(back))
    }

    pub fn facing(&self) -> Direction {
        self.view.facing()
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn is_crossing(&self) -> bool {
        self.crossing
    }

    pub fn glyph(&self) -> char {
        self.glyph
    }

    /// The driver-cell view over the grid; its anchor is the footprint's
    /// leading cell.
    pub fn view(&self) -> RelativeGrid {
        self.view
    }

    /// The displacement decided by the last think, still by default.
    pub fn desired(&self) -> Displacement {
        self.desired
    }

    pub(crate) fn parts(&self) -> &[EntityId] {
        &self.parts
    }

    pub(crate) fn set_parts(&mut self, parts: SmallVec<[EntityId; 8]>) {
        self.parts = parts;
    }

    /// Whether any entity sits within braking distance ahead of the
    /// footprint, in any of its lanes.
    fn entity_ahead(&self, grid: &Grid<EntityId>) -> bool {
        (0..self.width as i32).any(|side| {
            self.view
                .nearest_ahead(grid, Displacement::right(side), Some(self.velocity), |_| true)
                .is_some()
        })
    }

    /// Decides the displacement to attempt this tick.
    ///
    /// Anything within braking distance ahead stops the vehicle. Otherwise
    /// it runs at full velocity; a straight-through vehicle that has not
    /// entered the crosswalk clips its advance to the stop line while the
    /// pedestrian phase is not red.
    pub(crate) fn think(&mut self, grid: &Grid<EntityId>, crosswalk: &Zone, signal: &TrafficSignal) {
        if self.entity_ahead(grid) {
            self.desired = Displacement::still();
            return;
        }
        let clear_run = Displacement::forward(self.velocity as i32);
        self.desired = match self.kind {
            VehicleKind::Turning => clear_run,
            VehicleKind::Straight if self.crossing || signal.is_red() => clear_run,
            VehicleKind::Straight => {
                match crosswalk.distance_until(self.view.anchor(), self.view.facing()) {
                    Some(gap) => Displacement::forward(gap.min(self.velocity) as i32),
                    None => clear_run,
                }
            }
        };
    }

    /// Attempts the displacement decided by [think](Self::think).
    ///
    /// The whole move is gated on the swept region being clear: a
    /// pedestrian there counts a conflict and the vehicle yields in place.
    /// A driver target beyond the lane removes the entire footprint.
    /// Otherwise every cell advances by the same displacement, leading
    /// cells first so trailing cells step into freshly vacated ground.
    pub(crate) fn step(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &EntitySet,
        crosswalk: &Zone,
    ) -> Result<VehicleStep, GridError> {
        let desired = std::mem::replace(&mut self.desired, Displacement::still());
        if desired.is_still() {
            return Ok(VehicleStep::Stayed { conflict: false });
        }

        let reach = desired.magnitude();
        let mut blocked = false;
        let mut conflict = false;
        for side in 0..self.width as i32 {
            if let Some((_, occupant)) =
                self.view
                    .nearest_ahead(grid, Displacement::right(side), Some(reach), |_| true)
            {
                blocked = true;
                conflict = conflict || !entities[occupant].is_vehicle();
            }
        }
        if blocked {
            return Ok(VehicleStep::Stayed { conflict });
        }

        if !self.view.in_bounds(grid, desired) {
            for offset in Self::footprint_offsets(self.width, self.length) {
                self.view.displaced(offset).clear(grid)?;
            }
            return Ok(VehicleStep::Exited);
        }

        for offset in Self::footprint_offsets(self.width, self.length) {
            let from = self.view.absolute(offset);
            let to = desired.apply(self.view.facing(), from);
            let value = grid.clear(from)?;
            grid.fill(to, value)?;
        }
        self.view = self.view.displaced(desired);
        self.crossing = self.crossing || self.view.is_in(crosswalk);
        Ok(VehicleStep::Advanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::fixtures::Fixture;
    use crate::grid::Cell;

    fn green_signal() -> TrafficSignal {
        TrafficSignal::two_phase(90, 50).unwrap()
    }

    fn red_signal() -> TrafficSignal {
        let mut signal = TrafficSignal::two_phase(90, 50).unwrap();
        for _ in 0..50 {
            signal.update();
        }
        signal
    }

    /// Places a 2x2 southbound vehicle with its driver at `driver`.
    fn place_vehicle(f: &mut Fixture, driver: Cell, kind: VehicleKind) -> EntityId {
        f.place_vehicle(driver, Direction::South, kind, 2, 2)
    }

    fn far_crosswalk() -> Zone {
        Zone::new(100, 0, 101, 9)
    }

    #[test]
    fn footprint_offsets_lead_from_the_front() {
        let offsets: Vec<Displacement> = Vehicle::footprint_offsets(2, 3).collect();
        assert_eq!(offsets.len(), 6);
        assert_eq!(offsets[0], Displacement::still());
        assert_eq!(offsets[1], Displacement::right(1));
        assert_eq!(offsets[2], Displacement::backward(1));
        assert_eq!(
            offsets[5],
            Displacement::right(1) + Displacement::backward(2)
        );
    }

    #[test]
    fn advances_the_whole_footprint_together() {
        let mut f = Fixture::blank(12, 6);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Straight);
        let mut veh = f.vehicle(id);

        veh.think(&f.grid, &far_crosswalk(), &red_signal());
        assert_eq!(veh.desired(), Displacement::forward(5));
        let step = veh.step(&mut f.grid, &f.entities, &far_crosswalk()).unwrap();
        assert_eq!(step, VehicleStep::Advanced);

        // Southbound: rows 0..=1 vacated, rows 5..=6 occupied, both columns.
        for col in [2, 3] {
            assert!(!f.grid.occupied(Cell::new(0, col)));
            assert!(!f.grid.occupied(Cell::new(1, col)));
            assert!(f.grid.occupied(Cell::new(5, col)));
            assert!(f.grid.occupied(Cell::new(6, col)));
        }
        assert_eq!(veh.view().anchor(), Cell::new(6, 3));
    }

    #[test]
    fn stops_for_an_entity_within_braking_distance() {
        let mut f = Fixture::blank(12, 6);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Straight);
        // A pedestrian four cells ahead in the driver's column.
        f.place_pedestrian(Cell::new(5, 3), Direction::East, 2);
        let mut veh = f.vehicle(id);

        veh.think(&f.grid, &far_crosswalk(), &red_signal());
        assert_eq!(veh.desired(), Displacement::still());
        let step = veh.step(&mut f.grid, &f.entities, &far_crosswalk()).unwrap();
        assert_eq!(step, VehicleStep::Stayed { conflict: false });
    }

    #[test]
    fn holds_at_the_stop_line_while_pedestrians_have_right_of_way() {
        let mut f = Fixture::blank(12, 6);
        let crosswalk = Zone::new(6, 0, 8, 5);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Straight);
        let mut veh = f.vehicle(id);

        veh.think(&f.grid, &crosswalk, &green_signal());
        // Four empty rows (2..=5) separate the driver from the zone.
        assert_eq!(veh.desired(), Displacement::forward(4));
        veh.step(&mut f.grid, &f.entities, &crosswalk).unwrap();
        assert_eq!(veh.view().anchor(), Cell::new(5, 3));

        // At the line it waits...
        veh.think(&f.grid, &crosswalk, &green_signal());
        assert_eq!(veh.desired(), Displacement::still());
        // ...until the pedestrian phase turns red.
        veh.think(&f.grid, &crosswalk, &red_signal());
        assert_eq!(veh.desired(), Displacement::forward(5));
    }

    #[test]
    fn turning_vehicles_ignore_the_signal() {
        let mut f = Fixture::blank(12, 6);
        let crosswalk = Zone::new(6, 0, 8, 5);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Turning);
        let mut veh = f.vehicle(id);

        veh.think(&f.grid, &crosswalk, &green_signal());
        assert_eq!(veh.desired(), Displacement::forward(5));
    }

    #[test]
    fn yields_and_counts_a_conflict_for_a_pedestrian_in_the_swept_region() {
        let mut f = Fixture::blank(12, 6);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Straight);
        let mut veh = f.vehicle(id);
        veh.think(&f.grid, &far_crosswalk(), &red_signal());
        assert_eq!(veh.desired(), Displacement::forward(5));

        // The pedestrian arrives after the vehicle has decided to go.
        f.place_pedestrian(Cell::new(4, 2), Direction::West, 2);
        let step = veh.step(&mut f.grid, &f.entities, &far_crosswalk()).unwrap();
        assert_eq!(step, VehicleStep::Stayed { conflict: true });
        // The vehicle yielded: its driver cell is unchanged.
        assert_eq!(f.grid.get(Cell::new(1, 3)), Some(id));
    }

    #[test]
    fn exits_whole_when_the_driver_leaves_the_lane() {
        let mut f = Fixture::blank(8, 6);
        let id = place_vehicle(&mut f, Cell::new(6, 3), VehicleKind::Straight);
        let mut veh = f.vehicle(id);
        veh.think(&f.grid, &far_crosswalk(), &red_signal());
        let step = veh.step(&mut f.grid, &f.entities, &far_crosswalk()).unwrap();
        assert_eq!(step, VehicleStep::Exited);
        assert!(f.grid.occupied_cells().is_empty());
    }

    #[test]
    fn latches_crossing_on_entering_the_zone() {
        let mut f = Fixture::blank(12, 6);
        let crosswalk = Zone::new(4, 0, 6, 5);
        let id = place_vehicle(&mut f, Cell::new(1, 3), VehicleKind::Turning);
        let mut veh = f.vehicle(id);
        veh.think(&f.grid, &crosswalk, &green_signal());
        veh.step(&mut f.grid, &f.entities, &crosswalk).unwrap();
        assert!(veh.is_crossing());
        assert!(matches!(f.entities[id], Entity::Vehicle(_)));
    }
}
