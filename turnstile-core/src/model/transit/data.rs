//! Flat timetable arena searched by RAPTOR

use itertools::Itertools;
use petgraph::graph::NodeIndex;

use super::types::{RaptorStopId, Route, RouteId, Stop, StopTime, Time, Transfer};
use crate::routing::raptor::RaptorError;

/// Every per-route and per-stop list is a window into one shared vector.
/// Assembled by [`super::TransitDataBuilder`].
#[derive(Debug, Clone, Default)]
pub struct PublicTransitData {
    pub routes: Vec<Route>,
    /// Stop sequence of every pattern, back to back
    pub route_stops: Vec<RaptorStopId>,
    /// Row-major trips of every pattern
    pub stop_times: Vec<StopTime>,
    pub stops: Vec<Stop>,
    /// Patterns serving each stop
    pub stop_routes: Vec<RouteId>,
    /// Outgoing foot transfers of each stop
    pub transfers: Vec<Transfer>,
    /// Street vertex linked to each stop
    pub stop_nodes: Vec<Option<NodeIndex>>,
}

fn window<T>(items: &[T], start: usize, len: usize) -> Option<&[T]> {
    items.get(start..start.checked_add(len)?)
}

impl PublicTransitData {
    /// Sorted, deduplicated departures from `source` within
    /// `[min_departure, max_departure]` over every pattern that can be
    /// boarded there.
    pub(crate) fn get_source_departures(
        &self,
        source: RaptorStopId,
        min_departure: Time,
        max_departure: Time,
    ) -> Result<Vec<Time>, RaptorError> {
        self.validate_stop(source)?;
        let mut departures = Vec::new();

        for &route_id in self.routes_for_stop(source) {
            let stops = self.get_route_stops(route_id)?;
            // Loop patterns may visit the stop twice; the last stop is
            // alight-only
            let positions = stops
                .split_last()
                .map_or(&[][..], |(_, boardable)| boardable)
                .iter()
                .positions(|&stop| stop == source)
                .collect_vec();

            for trip_idx in 0..self.routes[route_id].num_trips {
                let trip = self.get_trip(route_id, trip_idx)?;
                departures.extend(
                    positions
                        .iter()
                        .map(|&pos| trip[pos].departure)
                        .filter(|departure| (min_departure..=max_departure).contains(departure)),
                );
            }
        }

        departures.sort_unstable();
        departures.dedup();
        Ok(departures)
    }

    pub(crate) fn validate_stop(&self, stop: RaptorStopId) -> Result<(), RaptorError> {
        if stop < self.stops.len() {
            Ok(())
        } else {
            Err(RaptorError::InvalidStop)
        }
    }

    pub(crate) fn get_route_stops(&self, route_id: RouteId) -> Result<&[RaptorStopId], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;
        window(&self.route_stops, route.stops_start, route.num_stops)
            .ok_or(RaptorError::InvalidRoute)
    }

    /// Stop times of one trip, one entry per pattern position
    pub(crate) fn get_trip(
        &self,
        route_id: RouteId,
        trip_idx: usize,
    ) -> Result<&[StopTime], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;
        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }
        let start = route.trips_start + trip_idx * route.num_stops;
        window(&self.stop_times, start, route.num_stops).ok_or(RaptorError::InvalidRoute)
    }

    pub(crate) fn get_stop_transfers(&self, stop: RaptorStopId) -> Result<&[Transfer], RaptorError> {
        let record = self.stops.get(stop).ok_or(RaptorError::InvalidStop)?;
        window(&self.transfers, record.transfers_start, record.transfers_len)
            .ok_or(RaptorError::InvalidStop)
    }

    pub(crate) fn routes_for_stop(&self, stop: RaptorStopId) -> &[RouteId] {
        self.stops
            .get(stop)
            .and_then(|record| window(&self.stop_routes, record.routes_start, record.routes_len))
            .unwrap_or(&[])
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Street vertex the stop is linked to, if any
    pub fn stop_node(&self, stop: RaptorStopId) -> Option<NodeIndex> {
        self.stop_nodes.get(stop).copied().flatten()
    }
}
