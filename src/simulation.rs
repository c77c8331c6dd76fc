use crate::config::Config;
use crate::direction::Direction;
use crate::entity::Entity;
use crate::error::{GridError, SimResult};
use crate::grid::{Cell, Grid};
use crate::pedestrian::Pedestrian;
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::signal::TrafficSignal;
use crate::vehicle::{Vehicle, VehicleKind, VehicleStep};
use crate::vehicle_lane::VehicleLane;
use crate::waiting_area::WaitingArea;
use crate::zone::Zone;
use crate::{EntityId, EntitySet};
use log::debug;
use slotmap::SecondaryMap;

/// A crosswalk simulation.
///
/// Owns the grid, the entity arena, the signal, both pedestrian waiting
/// areas, and the vehicle lanes, and drives them through discrete ticks.
/// Construction takes a seed (or a generator); two instances built from
/// the same configuration and seed evolve identically.
pub struct Simulation {
    /// The cell store; each occupied cell holds an entity id.
    grid: Grid<EntityId>,
    /// Every live road entity.
    entities: EntitySet,
    /// The crosswalk proper, where conflicts are possible.
    crosswalk: Zone,
    /// The crosswalk band plus both waiting areas; pedestrian bounds.
    walking_zone: Zone,
    /// The pedestrian signal.
    signal: TrafficSignal,
    /// The sidewalk queue feeding eastbound pedestrians.
    waiting_west: WaitingArea,
    /// The sidewalk queue feeding westbound pedestrians.
    waiting_east: WaitingArea,
    /// The vehicle lanes, west to east.
    lanes: Vec<VehicleLane>,
    /// The instance's deterministic generator.
    rng: SimRng,
    /// The current tick.
    tick: u64,
    /// Cumulative pedestrian-vehicle conflicts.
    conflicts: u64,
    /// Pedestrians that completed an eastbound crossing.
    crossed_east: u64,
    /// Pedestrians that completed a westbound crossing.
    crossed_west: u64,
}

impl Simulation {
    /// Creates a simulation from a configuration and a generator seed.
    pub fn new(config: &Config, seed: u64) -> SimResult<Self> {
        Self::with_rng(config, SimRng::seed_from(seed))
    }

    /// Creates a simulation from a configuration and an explicit generator.
    pub fn with_rng(config: &Config, rng: SimRng) -> SimResult<Self> {
        config.validate()?;
        let signal = if config.yellow_time == 0 {
            TrafficSignal::two_phase(config.signal_cycle, config.green_time)?
        } else {
            TrafficSignal::three_phase(config.signal_cycle, config.green_time, config.yellow_time)?
        };

        let walking_zone = config.walking_zone();
        let entry_rows = config.crosswalk_rows;
        let waiting_west = WaitingArea::new(
            RelativeGrid::new(
                Cell::new(walking_zone.rows().min, walking_zone.cols().min),
                Direction::East,
                walking_zone,
            ),
            entry_rows,
            config.pedestrian_arrival_rate,
            config.waiting_area_capacity,
        );
        let waiting_east = WaitingArea::new(
            RelativeGrid::new(
                Cell::new(walking_zone.rows().max, walking_zone.cols().max),
                Direction::West,
                walking_zone,
            ),
            entry_rows,
            config.pedestrian_arrival_rate,
            config.waiting_area_capacity,
        );

        // The outermost lanes carry turning traffic, interior lanes drive
        // straight through.
        let lanes = (0..config.vehicle_lanes)
            .map(|lane| {
                let kind = if lane == 0 || lane + 1 == config.vehicle_lanes {
                    VehicleKind::Turning
                } else {
                    VehicleKind::Straight
                };
                VehicleLane::new(
                    config.lane_zone(lane),
                    Direction::South,
                    kind,
                    config.vehicle_width,
                    config.vehicle_length,
                    config.vehicle_arrival_rate,
                )
            })
            .collect();

        Ok(Self {
            grid: Grid::new(config.total_rows(), config.total_cols()),
            entities: EntitySet::default(),
            crosswalk: config.crosswalk_zone(),
            walking_zone,
            signal,
            waiting_west,
            waiting_east,
            lanes,
            rng,
            tick: 0,
            conflicts: 0,
            crossed_east: 0,
            crossed_west: 0,
        })
    }

    /// Advances the simulation by one tick: signal, pedestrian arrivals,
    /// think phase, move phase, vehicle arrivals.
    ///
    /// A grid error aborts the tick; it indicates a broken modelling
    /// invariant, not a runtime condition to route around.
    pub fn step(&mut self) -> SimResult<()> {
        self.signal.update();
        self.waiting_west
            .update(&mut self.grid, &mut self.entities, &self.signal, &mut self.rng)?;
        self.waiting_east
            .update(&mut self.grid, &mut self.entities, &self.signal, &mut self.rng)?;
        self.think_phase();
        let conflicts = self.move_phase()?;
        if conflicts > 0 {
            debug!("tick {}: {} conflicts", self.tick, conflicts);
        }
        self.conflicts += conflicts;
        for lane in &mut self.lanes {
            lane.update(&mut self.grid, &mut self.entities, &mut self.rng)?;
        }
        self.tick += 1;
        Ok(())
    }

    /// Repeatedly ticks until the counter reaches `tick`. The sole entry
    /// point a batch driver needs.
    pub fn advance_to(&mut self, tick: u64) -> SimResult<()> {
        while self.tick < tick {
            self.step()?;
        }
        Ok(())
    }

    /// Lets every entity decide its displacement for this tick, visiting
    /// occupied cells in random order.
    fn think_phase(&mut self) {
        for cell in self.grid.occupied_in_random_order(&mut self.rng) {
            let Some(id) = self.grid.get(cell) else { continue };
            match self.entities[id].clone() {
                Entity::Pedestrian(mut pedestrian) => {
                    pedestrian.think(
                        &self.grid,
                        &self.entities,
                        &self.crosswalk,
                        &self.signal,
                        &mut self.rng,
                    );
                    self.entities[id] = Entity::Pedestrian(pedestrian);
                }
                Entity::Vehicle(mut vehicle) => {
                    vehicle.think(&self.grid, &self.crosswalk, &self.signal);
                    self.entities[id] = Entity::Vehicle(vehicle);
                }
                // Parts delegate all decisions to their owner.
                Entity::VehiclePart(_) => {}
            }
        }
    }

    /// Executes every entity's movement attempt, visiting occupied cells
    /// in random order and moving each entity at most once. Returns the
    /// tick's conflict tally.
    fn move_phase(&mut self) -> Result<u64, GridError> {
        let mut moved: SecondaryMap<EntityId, ()> = SecondaryMap::new();
        let mut conflicts = 0;
        for cell in self.grid.occupied_in_random_order(&mut self.rng) {
            let Some(occupant) = self.grid.get(cell) else { continue };
            // A footprint partner cell must not re-trigger its owner.
            let actor = match &self.entities[occupant] {
                Entity::VehiclePart(part) => part.owner(),
                _ => occupant,
            };
            if moved.insert(actor, ()).is_some() {
                continue;
            }
            match self.entities[actor].clone() {
                Entity::Pedestrian(mut pedestrian) => {
                    let step =
                        pedestrian.step(&mut self.grid, &self.entities, &self.crosswalk)?;
                    if step.conflict {
                        conflicts += 1;
                    }
                    if step.exited {
                        match pedestrian.facing() {
                            Direction::East => self.crossed_east += 1,
                            Direction::West => self.crossed_west += 1,
                            _ => {}
                        }
                        self.entities.remove(actor);
                    } else {
                        self.entities[actor] = Entity::Pedestrian(pedestrian);
                    }
                }
                Entity::Vehicle(mut vehicle) => {
                    match vehicle.step(&mut self.grid, &self.entities, &self.crosswalk)? {
                        VehicleStep::Stayed { conflict } => {
                            if conflict {
                                conflicts += 1;
                            }
                            self.entities[actor] = Entity::Vehicle(vehicle);
                        }
                        VehicleStep::Advanced => {
                            self.entities[actor] = Entity::Vehicle(vehicle);
                        }
                        VehicleStep::Exited => {
                            for part in vehicle.parts() {
                                self.entities.remove(*part);
                            }
                            self.entities.remove(actor);
                        }
                    }
                }
                Entity::VehiclePart(_) => unreachable!("part owners are vehicles"),
            }
        }
        Ok(conflicts)
    }

    /// The current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Cumulative pedestrian-vehicle conflicts since construction.
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    /// Pedestrians that completed an eastbound crossing.
    pub fn crossed_east(&self) -> u64 {
        self.crossed_east
    }

    /// Pedestrians that completed a westbound crossing.
    pub fn crossed_west(&self) -> u64 {
        self.crossed_west
    }

    /// The pedestrian signal.
    pub fn signal(&self) -> &TrafficSignal {
        &self.signal
    }

    /// The crosswalk proper.
    pub fn crosswalk_zone(&self) -> Zone {
        self.crosswalk
    }

    /// The crosswalk band including both waiting areas.
    pub fn walking_zone(&self) -> Zone {
        self.walking_zone
    }

    /// The whole grid as a zone, for renderers that draw everything.
    pub fn extent(&self) -> Zone {
        Zone::new(0, 0, self.grid.rows() - 1, self.grid.cols() - 1)
    }

    /// The westerly waiting area (feeding eastbound pedestrians).
    pub fn waiting_west(&self) -> &WaitingArea {
        &self.waiting_west
    }

    /// The easterly waiting area (feeding westbound pedestrians).
    pub fn waiting_east(&self) -> &WaitingArea {
        &self.waiting_east
    }

    /// The vehicle lanes, west to east.
    pub fn lanes(&self) -> &[VehicleLane] {
        &self.lanes
    }

    /// The entity occupying a cell, if any.
    pub fn entity_at(&self, cell: Cell) -> Option<&Entity> {
        self.grid.get(cell).map(|id| &self.entities[id])
    }

    /// Iterates over every cell of a zone with its occupant, row-major.
    /// Read-only; this is the rendering boundary.
    pub fn cells_in(&self, zone: Zone) -> impl Iterator<Item = (Cell, Option<&Entity>)> {
        zone.cells()
            .map(move |cell| (cell, self.grid.get(cell).map(|id| &self.entities[id])))
    }

    /// Returns an iterator over all the pedestrians in the simulation.
    pub fn iter_pedestrians(&self) -> impl Iterator<Item = &Pedestrian> {
        self.entities.values().filter_map(Entity::as_pedestrian)
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.entities.values().filter_map(Entity::as_vehicle)
    }
}
