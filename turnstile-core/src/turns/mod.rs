//! Turn costs on the street network
//!
//! [`angle`] measures the turn between two directed edges meeting at a
//! vertex, [`TurnType`] classifies it and [`TurnCostTable`] prices it per
//! travel mode. [`TurnCostCalculator`] chains the three for the searches.

pub mod angle;
mod calculator;
mod table;

use petgraph::graph::EdgeIndex;
use thiserror::Error;

use crate::StreetMode;

pub use angle::turn_angle;
pub use calculator::TurnCostCalculator;
pub use table::{TurnCostTable, TurnPenalties, TurnType};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurnCostError {
    /// A segment of the edge collapses onto the turn vertex. Only this
    /// transition is affected; searches skip it.
    #[error("edge {0:?} has no segment of non-zero length at the turn vertex")]
    DegenerateGeometry(EdgeIndex),
    /// The incoming edge does not end where the outgoing edge starts
    #[error("edge {incoming:?} does not end where edge {outgoing:?} starts")]
    DisconnectedEdges {
        incoming: EdgeIndex,
        outgoing: EdgeIndex,
    },
    #[error("no turn costs configured for mode {0}")]
    UnsupportedMode(StreetMode),
    #[error("edge {0} does not exist in the street graph")]
    UnknownEdge(usize),
}
