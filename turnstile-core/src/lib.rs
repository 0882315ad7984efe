//! Cost-and-pruning core of a multimodal trip search.
//!
//! Two pieces do the real work:
//!
//! * [`turns`] turns the geometry of an intersection into a mode-specific
//!   turn penalty.
//! * [`heuristic`] runs a reverse pass from the destination and produces
//!   admissible lower bounds on remaining time, boardings and generalized
//!   cost for every stop and street vertex.
//!
//! [`routing`] holds the forward searches that consume both.

pub mod config;
pub mod error;
pub mod heuristic;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod turns;

pub use config::{CostModel, SearchConfig, SpeedConfig, TurnCostConfig};
pub use error::Error;
pub use heuristic::{
    Criteria, Destination, DestinationHeuristic, EgressLeg, HeuristicProvider, HeuristicTable,
    Location,
};
pub use model::{
    PublicTransitData, StreetGraph, TransitModel,
    streets::{ModePermissions, StreetMode},
    transit::types::{Cost, RaptorStopId, RouteId, StopTime, Time},
};
pub use turns::{TurnCostCalculator, TurnCostError, TurnCostTable, TurnPenalties, TurnType};

/// Street graph vertex handle
pub type StreetNodeId = petgraph::graph::NodeIndex;
/// Directed street edge handle
pub type StreetEdgeId = petgraph::graph::EdgeIndex;

/// Latest admissible time value: two service days in seconds
pub const MAX_SEARCH_TIME: Time = 86400 * 2;
