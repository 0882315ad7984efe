// Re-export key components
pub use crate::config::{CostModel, SearchConfig, SpeedConfig, TurnCostConfig};
pub use crate::heuristic::{
    Criteria, Destination, DestinationHeuristic, EgressLeg, HeuristicProvider, HeuristicTable,
    Location,
};
pub use crate::model::transit::TransitDataBuilder;
pub use crate::model::{PublicTransitData, StreetGraph, TransitModel};
pub use crate::routing::raptor::{
    AccessLeg, RaptorError, RaptorRequest, RaptorResult, RangeJourney, RangeRequest,
    RangeSearchResult, pruned_raptor, range_search,
};
pub use crate::routing::street::{
    StreetSearchLimits, StreetSearchResult, reverse_egress_search, turn_aware_search,
};
pub use crate::turns::{TurnCostCalculator, TurnCostError, TurnType};

// Core types for the street network
pub use crate::{ModePermissions, StreetEdgeId, StreetMode, StreetNodeId};

// Core types for transit routing
pub use crate::{Cost, RaptorStopId, RouteId, StopTime, Time};
