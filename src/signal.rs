use crate::error::ConfigError;
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The state of the pedestrian signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalState {
    Green,
    Yellow,
    Red,
}

/// A timed signal gating pedestrian entry into the crosswalk.
///
/// Two-phase signals cycle Green→Red; three-phase signals cycle
/// Green→Yellow→Red. While the pedestrian phase is green or yellow,
/// straight-through vehicles hold at the crosswalk stop line; red releases
/// them and halts new pedestrian entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrafficSignal {
    state: SignalState,
    /// Ticks remaining in the current state, always in `[1, duration]`.
    countdown: u32,
    green_time: u32,
    yellow_time: u32,
    red_time: u32,
}

impl TrafficSignal {
    /// Creates a two-phase (green/red) signal. The red phase lasts
    /// `cycle - green_time` ticks.
    pub fn two_phase(cycle: u32, green_time: u32) -> Result<Self, ConfigError> {
        Self::with_phases(cycle, green_time, 0)
    }

    /// Creates a three-phase (green/yellow/red) signal. The red phase lasts
    /// `cycle - green_time - yellow_time` ticks.
    pub fn three_phase(cycle: u32, green_time: u32, yellow_time: u32) -> Result<Self, ConfigError> {
        if yellow_time == 0 {
            return Err(ConfigError::EmptySignalPhase);
        }
        Self::with_phases(cycle, green_time, yellow_time)
    }

    fn with_phases(cycle: u32, green_time: u32, yellow_time: u32) -> Result<Self, ConfigError> {
        if green_time == 0 {
            return Err(ConfigError::EmptySignalPhase);
        }
        if green_time + yellow_time >= cycle {
            return Err(ConfigError::SignalPhaseOverflow {
                cycle,
                green: green_time,
                yellow: yellow_time,
            });
        }
        Ok(Self {
            state: SignalState::Green,
            countdown: green_time,
            green_time,
            yellow_time,
            red_time: cycle - green_time - yellow_time,
        })
    }

    /// Advances the signal timing by one tick.
    pub fn update(&mut self) {
        self.countdown -= 1;
        if self.countdown == 0 {
            let next = self.next_state();
            trace!("signal {:?} -> {:?}", self.state, next);
            self.state = next;
            self.countdown = self.duration(next);
        }
    }

    fn next_state(&self) -> SignalState {
        match self.state {
            SignalState::Green if self.yellow_time > 0 => SignalState::Yellow,
            SignalState::Green => SignalState::Red,
            SignalState::Yellow => SignalState::Red,
            SignalState::Red => SignalState::Green,
        }
    }

    fn duration(&self, state: SignalState) -> u32 {
        match state {
            SignalState::Green => self.green_time,
            SignalState::Yellow => self.yellow_time,
            SignalState::Red => self.red_time,
        }
    }

    /// The current state.
    pub fn state(&self) -> SignalState {
        self.state
    }

    /// Ticks remaining before the next transition.
    pub fn time_to_change(&self) -> u32 {
        self.countdown
    }

    pub fn is_green(&self) -> bool {
        self.state == SignalState::Green
    }

    pub fn is_yellow(&self) -> bool {
        self.state == SignalState::Yellow
    }

    pub fn is_red(&self) -> bool {
        self.state == SignalState::Red
    }
}
