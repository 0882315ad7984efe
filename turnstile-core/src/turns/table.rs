use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::TurnCostError;
use crate::{Cost, StreetMode};

/// Geometric class of a manoeuvre at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    Straight,
    Right,
    Left,
    UTurn,
}

impl TurnType {
    /// Classifies a turn angle in `[0, 2π)`. U-turns are checked before
    /// straight, so overlapping tolerances can never make a reversal look
    /// like a continuation.
    pub fn from_angle(angle: f64, straight_tolerance: f64, u_turn_tolerance: f64) -> Self {
        if angle < u_turn_tolerance || angle > TAU - u_turn_tolerance {
            TurnType::UTurn
        } else if (angle - PI).abs() <= straight_tolerance {
            TurnType::Straight
        } else if angle < PI {
            TurnType::Right
        } else {
            TurnType::Left
        }
    }

    /// Same manoeuvre seen under the opposite traffic side
    #[must_use]
    pub fn mirrored(self) -> Self {
        match self {
            TurnType::Right => TurnType::Left,
            TurnType::Left => TurnType::Right,
            other => other,
        }
    }
}

/// Penalties of one travel mode, in seconds-equivalent cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPenalties {
    pub straight: Cost,
    pub right: Cost,
    pub left: Cost,
    pub u_turn: Cost,
}

impl TurnPenalties {
    pub const FREE: Self = Self {
        straight: 0,
        right: 0,
        left: 0,
        u_turn: 0,
    };

    pub fn get(&self, turn: TurnType) -> Cost {
        match turn {
            TurnType::Straight => self.straight,
            TurnType::Right => self.right,
            TurnType::Left => self.left,
            TurnType::UTurn => self.u_turn,
        }
    }

    /// Cheapest penalty any turn can incur
    pub fn min(&self) -> Cost {
        self.straight.min(self.right).min(self.left).min(self.u_turn)
    }

    pub fn is_free(&self) -> bool {
        *self == Self::FREE
    }

    /// `straight <= right <= left <= u_turn`
    pub fn is_monotonic(&self) -> bool {
        self.straight <= self.right && self.right <= self.left && self.left <= self.u_turn
    }
}

/// `(TurnType, StreetMode) -> Cost` lookup
///
/// A mode without an entry is unsupported; asking for it is an error
/// rather than a silent zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnCostTable {
    pub walk: Option<TurnPenalties>,
    pub bicycle: Option<TurnPenalties>,
    pub car: Option<TurnPenalties>,
}

impl Default for TurnCostTable {
    fn default() -> Self {
        Self {
            walk: Some(TurnPenalties::FREE),
            bicycle: Some(TurnPenalties {
                straight: 0,
                right: 2,
                left: 8,
                u_turn: 20,
            }),
            car: Some(TurnPenalties {
                straight: 0,
                right: 10,
                left: 30,
                u_turn: 90,
            }),
        }
    }
}

impl TurnCostTable {
    /// Table without any mode
    pub fn empty() -> Self {
        Self {
            walk: None,
            bicycle: None,
            car: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: StreetMode, penalties: TurnPenalties) -> Self {
        *self.slot_mut(mode) = Some(penalties);
        self
    }

    pub fn penalties(&self, mode: StreetMode) -> Result<&TurnPenalties, TurnCostError> {
        match mode {
            StreetMode::Walk => self.walk.as_ref(),
            StreetMode::Bicycle => self.bicycle.as_ref(),
            StreetMode::Car => self.car.as_ref(),
        }
        .ok_or(TurnCostError::UnsupportedMode(mode))
    }

    pub fn cost(&self, turn: TurnType, mode: StreetMode) -> Result<Cost, TurnCostError> {
        self.penalties(mode).map(|p| p.get(turn))
    }

    fn slot_mut(&mut self, mode: StreetMode) -> &mut Option<TurnPenalties> {
        match mode {
            StreetMode::Walk => &mut self.walk,
            StreetMode::Bicycle => &mut self.bicycle,
            StreetMode::Car => &mut self.car,
        }
    }
}
