//! In-memory assembly of [`PublicTransitData`] from already validated
//! schedules.

use geo::Point;
use itertools::Itertools;
use log::debug;

use super::data::PublicTransitData;
use super::types::{RaptorStopId, Route, RouteId, Stop, StopTime, Time, Transfer};
use crate::Error;

struct RawRoute {
    route_id: String,
    stops: Vec<RaptorStopId>,
    trips: Vec<Vec<StopTime>>,
}

/// Collects stops, patterns, trips and transfers, then lays them out in the
/// flat RAPTOR format.
#[derive(Default)]
pub struct TransitDataBuilder {
    stops: Vec<(String, Point<f64>)>,
    routes: Vec<RawRoute>,
    transfers: Vec<(RaptorStopId, Transfer)>,
}

impl TransitDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, stop_id: impl Into<String>, geometry: Point<f64>) -> RaptorStopId {
        self.stops.push((stop_id.into(), geometry));
        self.stops.len() - 1
    }

    /// Adds a pattern visiting `stops` in order
    pub fn add_route(
        &mut self,
        route_id: impl Into<String>,
        stops: Vec<RaptorStopId>,
    ) -> Result<RouteId, Error> {
        let route_id = route_id.into();
        if stops.len() < 2 {
            return Err(Error::InvalidData(format!(
                "route {route_id} must visit at least two stops"
            )));
        }
        if let Some(&stop) = stops.iter().find(|&&stop| stop >= self.stops.len()) {
            return Err(Error::InvalidData(format!(
                "route {route_id} references unknown stop {stop}"
            )));
        }
        self.routes.push(RawRoute {
            route_id,
            stops,
            trips: Vec::new(),
        });
        Ok(self.routes.len() - 1)
    }

    /// Adds a trip to a pattern, one `StopTime` per pattern stop
    pub fn add_trip(&mut self, route: RouteId, times: Vec<StopTime>) -> Result<(), Error> {
        let raw = self
            .routes
            .get_mut(route)
            .ok_or_else(|| Error::InvalidData(format!("unknown route {route}")))?;

        if times.len() != raw.stops.len() {
            return Err(Error::InvalidData(format!(
                "trip on route {} has {} stop times for {} stops",
                raw.route_id,
                times.len(),
                raw.stops.len()
            )));
        }
        let ordered = times.iter().all(|st| st.arrival <= st.departure)
            && times
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.departure <= b.arrival);
        if !ordered {
            return Err(Error::InvalidData(format!(
                "trip on route {} goes back in time",
                raw.route_id
            )));
        }

        raw.trips.push(times);
        Ok(())
    }

    /// Adds a one-way walking transfer
    pub fn add_transfer(
        &mut self,
        from: RaptorStopId,
        to: RaptorStopId,
        duration: Time,
    ) -> Result<(), Error> {
        if from >= self.stops.len() || to >= self.stops.len() {
            return Err(Error::InvalidData(format!(
                "transfer {from} -> {to} references an unknown stop"
            )));
        }
        self.transfers.push((
            from,
            Transfer {
                target_stop: to,
                duration,
            },
        ));
        Ok(())
    }

    pub fn build(self) -> Result<PublicTransitData, Error> {
        let num_stops = self.stops.len();
        let mut data = PublicTransitData::default();
        let mut routes_by_stop: Vec<Vec<RouteId>> = vec![Vec::new(); num_stops];

        for (route_idx, mut raw) in self.routes.into_iter().enumerate() {
            // Trip search is a binary search, so trips must be sorted and
            // must not overtake each other.
            raw.trips.sort_by_key(|trip| trip[0].departure);
            let overtakes = raw.trips.iter().tuple_windows().any(|(earlier, later)| {
                earlier
                    .iter()
                    .zip(later)
                    .any(|(a, b)| a.departure > b.departure || a.arrival > b.arrival)
            });
            if overtakes {
                return Err(Error::InvalidData(format!(
                    "trips of route {} overtake each other",
                    raw.route_id
                )));
            }

            data.routes.push(Route {
                route_id: raw.route_id,
                num_trips: raw.trips.len(),
                num_stops: raw.stops.len(),
                stops_start: data.route_stops.len(),
                trips_start: data.stop_times.len(),
            });
            for &stop in raw.stops.iter().unique() {
                routes_by_stop[stop].push(route_idx);
            }
            data.route_stops.extend(raw.stops);
            data.stop_times.extend(raw.trips.into_iter().flatten());
        }

        let mut transfers = self.transfers;
        transfers.sort_by_key(|&(from, transfer)| (from, transfer.target_stop));
        let transfers_by_stop = transfers.into_iter().into_group_map();

        for (stop_idx, (stop_id, geometry)) in self.stops.into_iter().enumerate() {
            let routes_start = data.stop_routes.len();
            data.stop_routes.extend(&routes_by_stop[stop_idx]);

            let transfers_start = data.transfers.len();
            if let Some(stop_transfers) = transfers_by_stop.get(&stop_idx) {
                data.transfers.extend(stop_transfers);
            }

            data.stops.push(Stop {
                stop_id,
                geometry,
                routes_start,
                routes_len: routes_by_stop[stop_idx].len(),
                transfers_start,
                transfers_len: data.transfers.len() - transfers_start,
            });
        }
        data.stop_nodes = vec![None; num_stops];

        debug!(
            "Assembled transit data: {} stops, {} routes, {} transfers",
            data.stops.len(),
            data.routes.len(),
            data.transfers.len()
        );
        Ok(data)
    }
}
