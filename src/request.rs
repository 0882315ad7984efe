use geo::Point;
use log::{debug, info};
use serde::Serialize;

use turnstile_core::prelude::*;
use turnstile_core::{Error, StreetNodeId};

/// Read-only context shared by every request against one model and
/// configuration. Route bounds are computed once here and reused by each
/// heuristic build.
pub struct RequestContext<'a> {
    model: &'a TransitModel,
    config: &'a SearchConfig,
    provider: HeuristicProvider<'a>,
}

/// Outcome of one origin-destination range query
#[derive(Debug, Clone, Serialize)]
pub struct TripPlan {
    pub access_stops: usize,
    pub egress_stops: usize,
    /// Access search expansions dropped because the vertex cannot reach
    /// the destination
    pub pruned_street_labels: usize,
    pub result: RangeSearchResult,
}

impl TripPlan {
    pub fn as_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<'a> RequestContext<'a> {
    pub fn new(model: &'a TransitModel, config: &'a SearchConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            provider: HeuristicProvider::new(model, config),
        })
    }

    pub fn model(&self) -> &TransitModel {
        self.model
    }

    /// Access search from `origin` within the access time limit. Vertices
    /// the table marks as unable to reach the destination are not entered.
    pub fn access_search(
        &self,
        origin: StreetNodeId,
        heuristics: &HeuristicTable,
    ) -> Result<StreetSearchResult, Error> {
        let calculator = TurnCostCalculator::new(&self.model.street_graph, &self.config.turn_costs);
        let limits = StreetSearchLimits {
            heuristic: Some((heuristics, Cost::MAX)),
            ..StreetSearchLimits::with_max_time(self.config.max_access_time)
        };
        Ok(turn_aware_search(
            self.model,
            &calculator,
            self.config,
            origin,
            self.config.access_mode,
            &limits,
        )?)
    }

    /// Range query from a street vertex to a stop or vertex over every
    /// departure in `departure_range`
    pub fn plan(
        &self,
        origin: StreetNodeId,
        destination: Location,
        departure_range: (Time, Time),
    ) -> Result<TripPlan, Error> {
        let destination = match destination {
            Location::Stop(stop) => Destination::stop(stop),
            Location::Vertex(node) => self.provider.destination_at(node),
        };
        let heuristics = self.provider.build(&destination);
        let street = self.access_search(origin, &heuristics)?;
        let access = street.access_legs(&self.model.transit_data);
        debug!(
            "Planning from vertex {}: {} access stops, {} egress stops, {} stops can reach the destination",
            origin.index(),
            access.len(),
            destination.egress.len(),
            heuristics.num_reachable_stops()
        );

        let result = range_search(
            &self.model.transit_data,
            &heuristics,
            &RangeRequest {
                access: &access,
                egress: &destination.egress,
                departure_range,
                max_transfers: self.config.max_transfers,
                max_cost: None,
                costs: &self.config.cost_model,
            },
        )?;
        Ok(TripPlan {
            access_stops: access.len(),
            egress_stops: destination.egress.len(),
            pruned_street_labels: street.pruned,
            result,
        })
    }

    /// Like [`RequestContext::plan`], snapping both points to the nearest
    /// street vertex first
    pub fn plan_between(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        departure_range: (Time, Time),
    ) -> Result<TripPlan, Error> {
        let origin = self.snap(origin)?;
        let destination = self.snap(destination)?;
        info!(
            "Snapped request to vertices {} -> {}",
            origin.index(),
            destination.index()
        );
        self.plan(origin, Location::Vertex(destination), departure_range)
    }

    fn snap(&self, point: Point<f64>) -> Result<StreetNodeId, Error> {
        match self.model.street_graph.nearest_node(&point) {
            Some((node, distance)) if distance <= self.model.meta.max_snap_distance_m => Ok(node),
            _ => Err(Error::NoPointsFound),
        }
    }
}
