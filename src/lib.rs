pub use config::Config;
pub use direction::Direction;
pub use displacement::Displacement;
pub use entity::Entity;
pub use error::{ConfigError, GridError, SimError, SimResult};
pub use grid::{Cell, Grid};
pub use pedestrian::{Pedestrian, MAX_VELOCITY};
pub use relative::{MoveOutcome, RelativeGrid};
pub use rng::SimRng;
pub use signal::{SignalState, TrafficSignal};
pub use simulation::Simulation;
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleKind, VehiclePart, VEHICLE_VELOCITY};
pub use vehicle_lane::VehicleLane;
pub use waiting_area::WaitingArea;
pub use zone::Zone;
use slotmap::{new_key_type, SlotMap};

mod config;
mod direction;
mod displacement;
mod entity;
mod error;
#[cfg(test)]
mod fixtures;
mod grid;
mod pedestrian;
mod relative;
mod rng;
mod signal;
mod simulation;
mod util;
mod vehicle;
mod vehicle_lane;
mod waiting_area;
mod zone;

new_key_type! {
    /// Unique ID of a road entity (pedestrian, vehicle, or vehicle part).
    pub struct EntityId;
}

/// The arena holding every live road entity; the grid stores ids into it.
pub type EntitySet = SlotMap<EntityId, Entity>;
