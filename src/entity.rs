use crate::direction::Direction;
use crate::pedestrian::Pedestrian;
use crate::vehicle::{Vehicle, VehiclePart};

/// Any agent occupying grid cells.
///
/// A closed set: pedestrians, vehicles (the driver cell of a footprint),
/// and vehicle parts (the remaining footprint cells, which delegate all
/// behaviour to their owning vehicle).
#[derive(Clone, Debug)]
pub enum Entity {
    Pedestrian(Pedestrian),
    Vehicle(Vehicle),
    VehiclePart(VehiclePart),
}

impl Entity {
    /// The direction the entity is facing. Immutable for its lifetime.
    pub fn facing(&self) -> Direction {
        match self {
            Entity::Pedestrian(p) => p.facing(),
            Entity::Vehicle(v) => v.facing(),
            Entity::VehiclePart(p) => p.facing(),
        }
    }

    /// Whether the entity has entered the crosswalk zone at some point.
    /// Parts carry no state of their own; query their owner instead.
    pub fn is_crossing(&self) -> bool {
        match self {
            Entity::Pedestrian(p) => p.is_crossing(),
            Entity::Vehicle(v) => v.is_crossing(),
            Entity::VehiclePart(_) => false,
        }
    }

    /// Whether the entity is part of a vehicle footprint.
    pub fn is_vehicle(&self) -> bool {
        matches!(self, Entity::Vehicle(_) | Entity::VehiclePart(_))
    }

    /// The entity's velocity class in cells per tick.
    pub fn velocity(&self) -> u32 {
        match self {
            Entity::Pedestrian(p) => p.velocity(),
            Entity::Vehicle(v) => v.velocity(),
            Entity::VehiclePart(_) => 0,
        }
    }

    /// The cosmetic glyph renderers draw for this entity.
    pub fn glyph(&self) -> char {
        match self {
            Entity::Pedestrian(p) => p.glyph(),
            Entity::Vehicle(v) => v.glyph(),
            Entity::VehiclePart(p) => p.glyph(),
        }
    }

    /// The pedestrian behind this entity, if it is one.
    pub fn as_pedestrian(&self) -> Option<&Pedestrian> {
        match self {
            Entity::Pedestrian(p) => Some(p),
            _ => None,
        }
    }

    /// The vehicle behind this entity, if it is a driver cell.
    pub fn as_vehicle(&self) -> Option<&Vehicle> {
        match self {
            Entity::Vehicle(v) => Some(v),
            _ => None,
        }
    }
}
