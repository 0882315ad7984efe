//! Search configuration
//!
//! Every table the searches read is passed in through [`SearchConfig`]; the
//! crate keeps no process-wide cost state. Configurations deserialize from
//! TOML, and any field left out falls back to its default:
//!
//! ```toml
//! access_mode = "walk"
//! max_transfers = 3
//!
//! [turn_costs]
//! drive_on_right = false
//!
//! [turn_costs.table.car]
//! straight = 0
//! right = 15
//! left = 40
//! u_turn = 120
//! ```

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::turns::TurnCostTable;
use crate::{Cost, Error, StreetMode, Time};

/// Turn classification tolerances and the per-mode penalty table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnCostConfig {
    /// Half-width, in radians, of the window around `π` classified as straight
    pub straight_tolerance: f64,
    /// Angles within this many radians of `0` or `2π` are U-turns
    pub u_turn_tolerance: f64,
    /// Right-hand traffic: left turns cross oncoming traffic
    pub drive_on_right: bool,
    pub table: TurnCostTable,
}

impl Default for TurnCostConfig {
    fn default() -> Self {
        Self {
            straight_tolerance: 0.15 * PI,
            u_turn_tolerance: 0.15 * PI,
            drive_on_right: true,
            table: TurnCostTable::default(),
        }
    }
}

impl TurnCostConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let in_range = |t: f64| t.is_finite() && (0.0..PI / 2.0).contains(&t);
        if !in_range(self.straight_tolerance) || !in_range(self.u_turn_tolerance) {
            return Err(Error::InvalidConfig(format!(
                "turn tolerances must lie in [0, π/2), got straight = {} and u_turn = {}",
                self.straight_tolerance, self.u_turn_tolerance
            )));
        }
        if let Some(car) = &self.table.car {
            if !car.is_monotonic() {
                return Err(Error::InvalidConfig(format!(
                    "car turn penalties must satisfy straight <= right <= left <= u_turn, got {car:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Weights that turn durations and boardings into generalized cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Added for every boarding
    pub board_cost: Cost,
    /// Added for every boarding after the first
    pub transfer_cost: Cost,
    pub walk_reluctance: f64,
    pub bicycle_reluctance: f64,
    pub car_reluctance: f64,
    pub wait_reluctance: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            board_cost: 60,
            transfer_cost: 120,
            walk_reluctance: 2.0,
            bicycle_reluctance: 1.5,
            car_reluctance: 1.0,
            wait_reluctance: 1.0,
        }
    }
}

impl CostModel {
    pub fn reluctance(&self, mode: StreetMode) -> f64 {
        match mode {
            StreetMode::Walk => self.walk_reluctance,
            StreetMode::Bicycle => self.bicycle_reluctance,
            StreetMode::Car => self.car_reluctance,
        }
    }

    /// Cost of moving `duration` seconds on the street network in `mode`
    pub fn street_cost(&self, mode: StreetMode, duration: Time) -> Cost {
        scale(duration, self.reluctance(mode))
    }

    pub fn wait_cost(&self, duration: Time) -> Cost {
        scale(duration, self.wait_reluctance)
    }

    fn validate(&self) -> Result<(), Error> {
        let weights = [
            self.walk_reluctance,
            self.bicycle_reluctance,
            self.car_reluctance,
            self.wait_reluctance,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidConfig(
                "reluctance factors must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(duration: Time, factor: f64) -> Cost {
    if duration == Time::MAX {
        return Cost::MAX;
    }
    // `as` saturates at Cost::MAX
    (f64::from(duration) * factor).round() as Cost
}

/// Cruising speeds in metres per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub walk_mps: f64,
    pub bicycle_mps: f64,
    pub car_mps: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            walk_mps: 1.3,
            bicycle_mps: 4.0,
            car_mps: 11.0,
        }
    }
}

impl SpeedConfig {
    pub fn speed_mps(&self, mode: StreetMode) -> f64 {
        match mode {
            StreetMode::Walk => self.walk_mps,
            StreetMode::Bicycle => self.bicycle_mps,
            StreetMode::Car => self.car_mps,
        }
    }

    fn validate(&self) -> Result<(), Error> {
        for mode in StreetMode::ALL {
            let speed = self.speed_mps(mode);
            if !speed.is_finite() || speed <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{mode} speed must be positive, got {speed}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a single routing request needs besides the model itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub turn_costs: TurnCostConfig,
    pub cost_model: CostModel,
    pub speeds: SpeedConfig,
    /// Mode used to reach the first stop and leave the last one
    pub access_mode: StreetMode,
    pub max_access_time: Time,
    pub max_egress_time: Time,
    pub max_transfers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            turn_costs: TurnCostConfig::default(),
            cost_model: CostModel::default(),
            speeds: SpeedConfig::default(),
            access_mode: StreetMode::Walk,
            max_access_time: 1200,
            max_egress_time: 1200,
            max_transfers: 3,
        }
    }
}

impl SearchConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        let config: SearchConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.turn_costs.validate()?;
        self.cost_model.validate()?;
        self.speeds.validate()
    }
}
