use crate::error::ConfigError;
use crate::zone::Zone;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain-value configuration of the crossing layout and arrival process.
///
/// The core takes these as already-resolved numbers; reading them from an
/// environment or a file is an external loader's job. All derived geometry
/// (grid extent, crosswalk and lane zones) is computed from here once at
/// simulation construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Rows of the crosswalk band (its width in walking lanes).
    pub crosswalk_rows: u32,
    /// Columns of the crosswalk band (the carriageway's width).
    pub crosswalk_cols: u32,
    /// Columns of each sidewalk waiting area flanking the crosswalk.
    pub waiting_area_cols: u32,
    /// Number of vehicle lanes crossing the band.
    pub vehicle_lanes: u32,
    /// Vehicle footprint length, in cells along the travel axis.
    pub vehicle_length: u32,
    /// Vehicle footprint width, in cells across the lane.
    pub vehicle_width: u32,
    /// Signal cycle length in ticks.
    pub signal_cycle: u32,
    /// Green phase duration in ticks.
    pub green_time: u32,
    /// Yellow phase duration in ticks; zero makes a two-phase signal.
    pub yellow_time: u32,
    /// Mean pedestrian arrivals per tick at each waiting area.
    pub pedestrian_arrival_rate: f64,
    /// Mean vehicle arrivals per tick at each lane.
    pub vehicle_arrival_rate: f64,
    /// Maximum pedestrians queued at a waiting area.
    pub waiting_area_capacity: u32,
}

impl Default for Config {
    /// The original study's scenario: a six-lane, one-way carriageway under
    /// a 90-tick cycle with 50 ticks of pedestrian green.
    fn default() -> Self {
        Self {
            crosswalk_rows: 6,
            crosswalk_cols: 42,
            waiting_area_cols: 1,
            vehicle_lanes: 6,
            vehicle_length: 6,
            vehicle_width: 5,
            signal_cycle: 90,
            green_time: 50,
            yellow_time: 0,
            pedestrian_arrival_rate: 500.0 / 3600.0,
            vehicle_arrival_rate: 1400.0 / 21600.0,
            waiting_area_capacity: 100,
        }
    }
}

impl Config {
    /// Checks the geometric and stochastic parameters. Signal timing is
    /// validated by the signal's own constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crosswalk_rows == 0 || self.crosswalk_cols == 0 {
            return Err(ConfigError::DegenerateGeometry("empty crosswalk"));
        }
        if self.waiting_area_cols == 0 {
            return Err(ConfigError::DegenerateGeometry("no waiting area"));
        }
        if self.vehicle_lanes == 0 || self.vehicle_length == 0 || self.vehicle_width == 0 {
            return Err(ConfigError::DegenerateGeometry("no vehicle traffic"));
        }
        if self.lane_cols() == 0 {
            return Err(ConfigError::DegenerateGeometry(
                "more lanes than crosswalk columns",
            ));
        }
        if self.vehicle_width > self.lane_cols() {
            return Err(ConfigError::VehicleWiderThanLane {
                vehicle: self.vehicle_width,
                lane: self.lane_cols(),
            });
        }
        for rate in [self.pedestrian_arrival_rate, self.vehicle_arrival_rate] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::InvalidArrivalRate { rate });
            }
        }
        Ok(())
    }

    /// Total grid columns: the crosswalk flanked by both waiting areas.
    pub fn total_cols(&self) -> u32 {
        self.crosswalk_cols + 2 * self.waiting_area_cols
    }

    /// Total grid rows: a vehicle length of approach on either side of the
    /// crosswalk band.
    pub fn total_rows(&self) -> u32 {
        2 * self.vehicle_length + self.crosswalk_rows
    }

    /// Columns spanned by one vehicle lane.
    pub fn lane_cols(&self) -> u32 {
        if self.vehicle_lanes == 0 {
            return 0;
        }
        self.crosswalk_cols / self.vehicle_lanes
    }

    /// The crosswalk band including both waiting areas; pedestrians are
    /// confined to this zone.
    pub fn walking_zone(&self) -> Zone {
        let top = self.vehicle_length as i32;
        Zone::new(
            top,
            0,
            top + self.crosswalk_rows as i32 - 1,
            self.total_cols() as i32 - 1,
        )
    }

    /// The crosswalk proper: the band between the waiting areas, shared
    /// with vehicle traffic.
    pub fn crosswalk_zone(&self) -> Zone {
        let top = self.vehicle_length as i32;
        let left = self.waiting_area_cols as i32;
        Zone::new(
            top,
            left,
            top + self.crosswalk_rows as i32 - 1,
            left + self.crosswalk_cols as i32 - 1,
        )
    }

    /// The full-height zone of the given vehicle lane.
    pub fn lane_zone(&self, lane: u32) -> Zone {
        let left = (self.waiting_area_cols + lane * self.lane_cols()) as i32;
        Zone::new(
            0,
            left,
            self.total_rows() as i32 - 1,
            left + self.lane_cols() as i32 - 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    #[test]
    fn default_layout_is_valid_and_consistent() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.total_cols(), 44);
        assert_eq!(config.total_rows(), 18);
        assert_eq!(config.lane_cols(), 7);
        assert_eq!(config.walking_zone(), Zone::new(6, 0, 11, 43));
        assert_eq!(config.crosswalk_zone(), Zone::new(6, 1, 11, 42));
    }

    #[test]
    fn lane_zones_tile_the_crosswalk() {
        let config = Config::default();
        for lane in 0..config.vehicle_lanes {
            let zone = config.lane_zone(lane);
            assert_eq!(zone.col_count(), 7);
            assert_eq!(zone.row_count(), 18);
        }
        assert_eq!(config.lane_zone(0).cols().min, 1);
        assert_eq!(config.lane_zone(5).cols().max, 42);
        // Adjacent lanes do not overlap.
        assert!(!config
            .lane_zone(1)
            .contains(Cell::new(0, config.lane_zone(0).cols().max)));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut config = Config::default();
        config.vehicle_width = 9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::VehicleWiderThanLane { vehicle: 9, lane: 7 })
        ));

        let mut config = Config::default();
        config.pedestrian_arrival_rate = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidArrivalRate { .. })
        ));

        let mut config = Config::default();
        config.vehicle_lanes = 43;
        assert!(config.validate().is_err());
    }
}
