use crate::direction::Direction;
use crate::displacement::Displacement;
use crate::entity::Entity;
use crate::error::GridError;
use crate::grid::{Cell, Grid};
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::vehicle::{Vehicle, VehicleKind, VehiclePart};
use crate::zone::Zone;
use crate::{EntityId, EntitySet};
use log::trace;
use smallvec::SmallVec;

/// An unbounded vehicle arrival queue feeding one lane of the carriageway.
///
/// Vehicles spawn with their rear on the lane's entry edge, centred
/// laterally, whenever the entry block (lane width x vehicle length) is
/// entirely clear. Entry is not signal-gated; only the crosswalk approach
/// is, inside the vehicle's own decision logic.
#[derive(Clone, Debug)]
pub struct VehicleLane {
    /// View anchored at the entry corner, facing down the lane; the rest
    /// of the entry edge lies to its right.
    entry: RelativeGrid,
    kind: VehicleKind,
    lane_width: u32,
    vehicle_width: u32,
    vehicle_length: u32,
    arrival_rate: f64,
    waiting: u32,
    generated: u64,
    placed: u64,
}

impl VehicleLane {
    /// Creates a lane over its zone. The entry corner is chosen so that
    /// `forward` leads into the zone and `right` spans its width.
    pub(crate) fn new(
        zone: Zone,
        facing: Direction,
        kind: VehicleKind,
        vehicle_width: u32,
        vehicle_length: u32,
        arrival_rate: f64,
    ) -> Self {
        let (corner, lane_width) = match facing {
            Direction::South => (Cell::new(zone.rows().min, zone.cols().max), zone.col_count()),
            Direction::North => (Cell::new(zone.rows().max, zone.cols().min), zone.col_count()),
            Direction::East => (Cell::new(zone.rows().min, zone.cols().min), zone.row_count()),
            Direction::West => (Cell::new(zone.rows().max, zone.cols().max), zone.row_count()),
        };
        Self {
            entry: RelativeGrid::new(corner, facing, zone),
            kind,
            lane_width,
            vehicle_width,
            vehicle_length,
            arrival_rate,
            waiting: 0,
            generated: 0,
            placed: 0,
        }
    }

    /// The direction vehicles travel down this lane.
    pub fn facing(&self) -> Direction {
        self.entry.facing()
    }

    /// The vehicle variant this lane spawns.
    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// Vehicles currently queued to enter.
    pub fn waiting(&self) -> u32 {
        self.waiting
    }

    /// Total arrivals drawn.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Total vehicles spawned onto the lane.
    pub fn placed(&self) -> u64 {
        self.placed
    }

    fn generate(&mut self, rng: &mut SimRng) {
        let arrivals = rng.poisson(self.arrival_rate);
        self.waiting += arrivals;
        self.generated += u64::from(arrivals);
    }

    /// Whether the entry block is entirely clear: no occupant on the entry
    /// edge or within a vehicle length beyond it, across the lane's width.
    fn entry_clear(&self, grid: &Grid<EntityId>) -> bool {
        (0..self.lane_width as i32).all(|side| {
            let offset = Displacement::right(side);
            !self.entry.is_filled(grid, offset)
                && self
                    .entry
                    .nearest_ahead(grid, offset, Some(self.vehicle_length - 1), |_| true)
                    .is_none()
        })
    }

    /// Spawns one queued vehicle, centred in the lane, rear on the entry
    /// edge, driver cell leading.
    fn place_one(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &mut EntitySet,
        rng: &mut SimRng,
    ) -> Result<(), GridError> {
        let offset = (self.lane_width - self.vehicle_width) / 2;
        let driver = self.entry.displaced(
            Displacement::right(offset as i32)
                + Displacement::forward(self.vehicle_length as i32 - 1),
        );
        let vehicle = Vehicle::new(
            driver,
            self.kind,
            self.vehicle_width,
            self.vehicle_length,
            rng,
        );
        let facing = vehicle.facing();
        let glyph = vehicle.glyph();
        trace!(
            "{:?} vehicle spawns with driver at {} facing {:?}",
            self.kind,
            driver.anchor(),
            facing
        );

        let id = entities.insert(Entity::Vehicle(vehicle));
        grid.fill(driver.anchor(), id)?;
        let mut parts: SmallVec<[EntityId; 8]> = SmallVec::new();
        for offset in Vehicle::footprint_offsets(self.vehicle_width, self.vehicle_length).skip(1) {
            let part = entities.insert(Entity::VehiclePart(VehiclePart::new(id, facing, glyph)));
            grid.fill(driver.absolute(offset), part)?;
            parts.push(part);
        }
        match &mut entities[id] {
            Entity::Vehicle(vehicle) => vehicle.set_parts(parts),
            _ => unreachable!(),
        }
        self.waiting -= 1;
        self.placed += 1;
        Ok(())
    }

    /// Runs one tick of the queue: generate, then place at most one
    /// vehicle if the entry block allows it.
    pub(crate) fn update(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &mut EntitySet,
        rng: &mut SimRng,
    ) -> Result<(), GridError> {
        self.generate(rng);
        if self.waiting > 0 && self.entry_clear(grid) {
            self.place_one(grid, entities, rng)?;
        }
        Ok(())
    }
}
