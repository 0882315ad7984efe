//! RAPTOR (Round-bAsed Public Transit Optimized Router) with destination
//! pruning

mod pruned_raptor;
mod range_raptor;
mod state;

pub use pruned_raptor::{AccessLeg, RaptorRequest, RaptorResult, SearchStats, pruned_raptor};
pub use range_raptor::{
    RangeJourney, RangeRequest, RangeSearchResult, candidate_departures, range_search,
};
pub use state::{RaptorError, find_earliest_trip};
