use fixedbitset::FixedBitSet;
use thiserror::Error;

use crate::{Cost, MAX_SEARCH_TIME, PublicTransitData, RaptorStopId, RouteId, Time};

#[derive(Debug)]
pub(crate) struct RaptorState {
    // Per round and stop: earliest arrival and the generalized cost of the
    // label that achieves it.
    pub(crate) arrival_times: Vec<Vec<Time>>,
    pub(crate) costs: Vec<Vec<Cost>>,
    pub(crate) marked_stops: Vec<FixedBitSet>,
    // Earliest arrival over all rounds
    pub(crate) best_arrival: Vec<Time>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaptorError {
    #[error("Invalid stop ID")]
    InvalidStop,
    #[error("Invalid route ID")]
    InvalidRoute,
    #[error("Invalid trip index")]
    InvalidTrip,
    #[error("Invalid time value")]
    InvalidTime,
    #[error("Maximum transfers exceeded")]
    MaxTransfersExceeded,
}

impl RaptorState {
    pub(crate) fn new(num_stops: usize, max_rounds: usize) -> Self {
        RaptorState {
            arrival_times: vec![vec![Time::MAX; num_stops]; max_rounds],
            costs: vec![vec![Cost::MAX; num_stops]; max_rounds],
            marked_stops: (0..max_rounds)
                .map(|_| FixedBitSet::with_capacity(num_stops))
                .collect(),
            best_arrival: vec![Time::MAX; num_stops],
        }
    }

    /// Stores the label if it is the earliest in its round. Returns true
    /// only when it also beats every earlier round.
    pub(crate) fn update(
        &mut self,
        round: usize,
        stop: RaptorStopId,
        arrival: Time,
        cost: Cost,
    ) -> Result<bool, RaptorError> {
        if round >= self.arrival_times.len() {
            return Err(RaptorError::MaxTransfersExceeded);
        }
        if stop >= self.best_arrival.len() {
            return Err(RaptorError::InvalidStop);
        }
        if arrival < self.arrival_times[round][stop] {
            self.arrival_times[round][stop] = arrival;
            self.costs[round][stop] = cost;

            if arrival < self.best_arrival[stop] {
                self.best_arrival[stop] = arrival;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn validate_time(time: Time) -> Result<(), RaptorError> {
    if time > MAX_SEARCH_TIME {
        Err(RaptorError::InvalidTime)
    } else {
        Ok(())
    }
}

/// Index of the first trip of `route_id` leaving position `stop_idx` at or
/// after `earliest_board`. Trips never overtake, so departures at any
/// position are sorted by trip index.
pub fn find_earliest_trip(
    data: &PublicTransitData,
    route_id: RouteId,
    stop_idx: usize,
    earliest_board: Time,
) -> Option<usize> {
    let route = data.routes.get(route_id)?;
    if stop_idx >= route.num_stops {
        return None;
    }
    let departure = |trip: usize| {
        data.stop_times
            .get(route.trips_start + trip * route.num_stops + stop_idx)
            .map(|stop_time| stop_time.departure)
    };

    let (mut low, mut high) = (0, route.num_trips);
    while low < high {
        let mid = low + (high - low) / 2;
        if departure(mid)? < earliest_board {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    (low < route.num_trips).then_some(low)
}
