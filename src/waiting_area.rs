use crate::displacement::Displacement;
use crate::entity::Entity;
use crate::error::GridError;
use crate::grid::Grid;
use crate::pedestrian::Pedestrian;
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::signal::TrafficSignal;
use crate::util::rotated_range;
use crate::{EntityId, EntitySet};
use log::trace;

/// A bounded pedestrian arrival queue bound to one crosswalk entry edge.
///
/// Arrivals are drawn from a Poisson distribution each tick; the sidewalk
/// queue is finite, so arrivals beyond `capacity` are discarded. Waiting
/// pedestrians spawn onto free entry rows while the signal is green.
#[derive(Clone, Debug)]
pub struct WaitingArea {
    /// View anchored at the first entry row, facing the crossing direction;
    /// the remaining entry rows lie to its right.
    entry: RelativeGrid,
    /// Number of entry rows on the edge.
    rows: u32,
    arrival_rate: f64,
    capacity: u32,
    waiting: u32,
    generated: u64,
    placed: u64,
    discarded: u64,
}

impl WaitingArea {
    pub(crate) fn new(entry: RelativeGrid, rows: u32, arrival_rate: f64, capacity: u32) -> Self {
        Self {
            entry,
            rows,
            arrival_rate,
            capacity,
            waiting: 0,
            generated: 0,
            placed: 0,
            discarded: 0,
        }
    }

    /// Pedestrians currently queued, never more than the capacity.
    pub fn waiting(&self) -> u32 {
        self.waiting
    }

    /// Total arrivals drawn, including discarded overflow.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Total pedestrians spawned onto the grid.
    pub fn placed(&self) -> u64 {
        self.placed
    }

    /// Arrivals dropped because the queue was full.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Draws this tick's arrivals into the queue, discarding overflow.
    fn generate(&mut self, rng: &mut SimRng) {
        let arrivals = rng.poisson(self.arrival_rate);
        let accepted = arrivals.min(self.capacity - self.waiting);
        self.waiting += accepted;
        self.generated += u64::from(arrivals);
        self.discarded += u64::from(arrivals - accepted);
    }

    /// Whether some entry row admits a pedestrian. Oncoming-facing
    /// occupants do not block here; they contend at the move step instead.
    fn can_place(&self, grid: &Grid<EntityId>, entities: &EntitySet) -> bool {
        let facing_of = |id: EntityId| entities[id].facing();
        (0..self.rows as i32)
            .any(|row| !self.entry.is_obstructed(grid, Displacement::right(row), &facing_of))
    }

    /// Spawns one pedestrian onto a physically free entry row, scanning
    /// rows cyclically from a random start. Returns false when every row
    /// is physically occupied.
    fn place_one(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &mut EntitySet,
        rng: &mut SimRng,
    ) -> Result<bool, GridError> {
        let start = rng.gen_range(0..self.rows as usize);
        for row in rotated_range(self.rows as usize, start) {
            let offset = Displacement::right(row as i32);
            if self.entry.is_filled(grid, offset) {
                continue;
            }
            let pedestrian = Pedestrian::spawn(self.entry.displaced(offset), rng);
            trace!(
                "pedestrian spawns at {} facing {:?}",
                self.entry.absolute(offset),
                self.entry.facing()
            );
            let id = entities.insert(Entity::Pedestrian(pedestrian));
            self.entry.spawn(grid, offset, id)?;
            self.waiting -= 1;
            self.placed += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Runs one tick of the queue: always generates; places only while the
    /// signal is green (red halts new entries, not pedestrians already
    /// crossing).
    pub(crate) fn update(
        &mut self,
        grid: &mut Grid<EntityId>,
        entities: &mut EntitySet,
        signal: &TrafficSignal,
        rng: &mut SimRng,
    ) -> Result<(), GridError> {
        self.generate(rng);
        if !signal.is_green() {
            return Ok(());
        }
        while self.waiting > 0 && self.can_place(grid, entities) {
            if !self.place_one(grid, entities, rng)? {
                break;
            }
        }
        Ok(())
    }
}
