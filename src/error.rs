//! Error types.
//!
//! Configuration errors are fatal at construction. Grid errors signal a
//! broken modelling invariant (double fill, clearing an empty cell) and
//! abort the offending tick; they always carry the offending coordinates.

use thiserror::Error;

/// An invariant violation in the cell store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// Attempted to fill an already occupied cell.
    #[error("attempted to fill an already occupied cell ({row}, {col})")]
    CellOccupied { row: i32, col: i32 },

    /// Attempted to clear or move out of an empty cell.
    #[error("attempted to use an empty cell ({row}, {col})")]
    CellEmpty { row: i32, col: i32 },

    /// Attempted to fill a cell outside the grid or its bounding zone.
    #[error("attempted to fill an out of bounds cell ({row}, {col})")]
    OutOfBounds { row: i32, col: i32 },
}

/// An invalid simulation configuration, rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The green (and yellow) phases must leave room for a red phase.
    #[error("signal phases exceed the cycle: green {green} + yellow {yellow} >= cycle {cycle}")]
    SignalPhaseOverflow { cycle: u32, green: u32, yellow: u32 },

    /// Every signal phase in the cycle must last at least one tick.
    #[error("signal phase duration must be at least one tick")]
    EmptySignalPhase,

    /// A vehicle must fit laterally inside its lane.
    #[error("vehicle width {vehicle} exceeds lane width {lane}")]
    VehicleWiderThanLane { vehicle: u32, lane: u32 },

    /// Arrival rates must be finite and non-negative.
    #[error("arrival rate must be finite and non-negative, got {rate}")]
    InvalidArrivalRate { rate: f64 },

    /// The grid must have at least one cell on each axis.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}

/// Any error the simulation can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Shorthand result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
