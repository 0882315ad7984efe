//! Street network searches
//!
//! [`turn_aware_search`] is the forward access search: an edge-based
//! Dijkstra that charges a turn penalty on every edge-to-edge transition.
//! [`reverse_egress_search`] walks backwards from a destination vertex and
//! collects the egress legs of the transit search.

mod reverse;
mod state;
mod turn_aware;

pub use reverse::reverse_egress_search;
pub use turn_aware::{StreetLabel, StreetSearchLimits, StreetSearchResult, turn_aware_search};
