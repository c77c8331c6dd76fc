//! ASCII scenario builders shared by the agent unit tests.
//!
//! A row like `"[] X> <Y []"` places an eastbound pedestrian labelled `X`
//! and a westbound one labelled `Y`; `[]` is an empty cell. Velocities
//! default to 1 unless overridden.

use crate::direction::Direction;
use crate::entity::Entity;
use crate::grid::{Cell, Grid};
use crate::pedestrian::Pedestrian;
use crate::relative::RelativeGrid;
use crate::rng::SimRng;
use crate::vehicle::{Vehicle, VehicleKind, VehiclePart};
use crate::zone::Zone;
use crate::{EntityId, EntitySet};
use smallvec::SmallVec;
use std::collections::HashMap;

pub(crate) struct Fixture {
    pub grid: Grid<EntityId>,
    pub entities: EntitySet,
    pub rng: SimRng,
    labels: HashMap<char, EntityId>,
}

impl Fixture {
    /// An empty grid of the given dimensions.
    pub fn blank(rows: u32, cols: u32) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            entities: EntitySet::default(),
            rng: SimRng::seed_from(1),
            labels: HashMap::new(),
        }
    }

    /// Builds a grid of pedestrians from ASCII rows.
    pub fn parse(rows: &[&str], velocities: &[(char, u32)]) -> Self {
        let cols = rows[0].split_whitespace().count();
        let mut fixture = Self::blank(rows.len() as u32, cols as u32);
        for (row, line) in rows.iter().enumerate() {
            for (col, token) in line.split_whitespace().enumerate() {
                if token == "[]" {
                    continue;
                }
                let (label, facing) = if let Some(label) = token.strip_suffix('>') {
                    (label, Direction::East)
                } else if let Some(label) = token.strip_prefix('<') {
                    (label, Direction::West)
                } else {
                    (token, Direction::East)
                };
                let label = label.chars().next().expect("label token is not empty");
                let velocity = velocities
                    .iter()
                    .find(|(l, _)| *l == label)
                    .map(|(_, v)| *v)
                    .unwrap_or(1);
                let id =
                    fixture.place_pedestrian(Cell::new(row as i32, col as i32), facing, velocity);
                fixture.labels.insert(label, id);
            }
        }
        fixture
    }

    /// A zone covering the whole grid.
    pub fn everywhere(&self) -> Zone {
        Zone::new(0, 0, self.grid.rows() - 1, self.grid.cols() - 1)
    }

    /// A working copy of a labelled pedestrian.
    pub fn pedestrian(&self, label: char) -> Pedestrian {
        match &self.entities[self.labels[&label]] {
            Entity::Pedestrian(pedestrian) => *pedestrian,
            other => panic!("label {label} is not a pedestrian: {other:?}"),
        }
    }

    /// A working copy of a vehicle by id.
    pub fn vehicle(&self, id: EntityId) -> Vehicle {
        match &self.entities[id] {
            Entity::Vehicle(vehicle) => vehicle.clone(),
            other => panic!("not a vehicle: {other:?}"),
        }
    }

    /// Places a pedestrian with a fixed velocity, bounded by the grid.
    pub fn place_pedestrian(&mut self, cell: Cell, facing: Direction, velocity: u32) -> EntityId {
        let view = RelativeGrid::new(cell, facing, self.everywhere());
        let id = self
            .entities
            .insert(Entity::Pedestrian(Pedestrian::with_velocity(view, velocity)));
        self.grid.fill(cell, id).unwrap();
        id
    }

    /// Places a vehicle footprint with its driver cell at `driver`,
    /// bounded by the grid.
    pub fn place_vehicle(
        &mut self,
        driver: Cell,
        facing: Direction,
        kind: VehicleKind,
        width: u32,
        length: u32,
    ) -> EntityId {
        let view = RelativeGrid::new(driver, facing, self.everywhere());
        let vehicle = Vehicle::new(view, kind, width, length, &mut self.rng);
        let glyph = vehicle.glyph();
        let id = self.entities.insert(Entity::Vehicle(vehicle));
        self.grid.fill(driver, id).unwrap();

        let mut parts: SmallVec<[EntityId; 8]> = SmallVec::new();
        for offset in Vehicle::footprint_offsets(width, length).skip(1) {
            let part = self
                .entities
                .insert(Entity::VehiclePart(VehiclePart::new(id, facing, glyph)));
            self.grid.fill(view.absolute(offset), part).unwrap();
            parts.push(part);
        }
        match &mut self.entities[id] {
            Entity::Vehicle(vehicle) => vehicle.set_parts(parts),
            _ => unreachable!(),
        }
        id
    }
}
