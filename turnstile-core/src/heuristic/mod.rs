//! Destination heuristics
//!
//! A reverse pass from the destination assigns every stop and street vertex
//! three lower bounds: remaining travel time, remaining boardings and
//! remaining generalized cost. Forward searches drop labels that cannot beat
//! their incumbent even under these optimistic bounds.
//!
//! Bounds stay admissible because the reverse pass only ever
//! under-approximates what the forward searches charge: rides use the
//! fastest trip per hop, waiting is free, and neither transfer surcharges
//! nor turns beyond the cheapest one are counted.

mod destination;
mod provider;

pub use destination::{Criteria, DestinationHeuristic, HeuristicTable, Location};
pub use provider::{Destination, EgressLeg, HeuristicProvider};
