//! Street network components - nodes, edges and travel modes

use std::fmt;
use std::ops::BitOr;

use geo::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::Time;
use crate::config::SpeedConfig;

/// Travel mode on the street network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreetMode {
    Walk,
    Bicycle,
    Car,
}

impl StreetMode {
    pub const ALL: [StreetMode; 3] = [StreetMode::Walk, StreetMode::Bicycle, StreetMode::Car];

    const fn bit(self) -> u8 {
        match self {
            StreetMode::Walk => 0b001,
            StreetMode::Bicycle => 0b010,
            StreetMode::Car => 0b100,
        }
    }
}

impl fmt::Display for StreetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreetMode::Walk => "walk",
            StreetMode::Bicycle => "bicycle",
            StreetMode::Car => "car",
        };
        f.write_str(name)
    }
}

/// Set of modes allowed to traverse an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ModePermissions(u8);

impl ModePermissions {
    pub const NONE: Self = Self(0);
    pub const WALK: Self = Self(StreetMode::Walk.bit());
    pub const BICYCLE: Self = Self(StreetMode::Bicycle.bit());
    pub const CAR: Self = Self(StreetMode::Car.bit());
    pub const ALL: Self = Self(0b111);

    pub fn allows(self, mode: StreetMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[must_use]
    pub fn with(self, mode: StreetMode) -> Self {
        Self(self.0 | mode.bit())
    }
}

impl BitOr for ModePermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromIterator<StreetMode> for ModePermissions {
    fn from_iter<I: IntoIterator<Item = StreetMode>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// Node coordinates, x = longitude and y = latitude
    pub geometry: Point<f64>,
}

/// Directed street edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Length in metres
    pub length_m: f64,
    /// Modes allowed on this edge
    pub permissions: ModePermissions,
    /// Geometry oriented from the edge origin to its destination
    pub geometry: LineString<f64>,
}

impl StreetEdge {
    pub fn allows(&self, mode: StreetMode) -> bool {
        self.permissions.allows(mode)
    }

    /// Traversal time in whole seconds, rounded up
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn traversal_time(&self, mode: StreetMode, speeds: &SpeedConfig) -> Time {
        let speed = speeds.speed_mps(mode);
        if speed <= 0.0 {
            return Time::MAX;
        }
        (self.length_m / speed).ceil() as Time
    }
}
