use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use log::trace;

use super::state::{RaptorError, RaptorState, find_earliest_trip, validate_time};
use crate::config::CostModel;
use crate::heuristic::{Criteria, EgressLeg, HeuristicTable, Location};
use crate::model::transit::types::{StopTime, Transfer};
use crate::{Cost, PublicTransitData, RaptorStopId, RouteId, StreetMode, Time};

/// Street connection from the origin to a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessLeg {
    pub stop: RaptorStopId,
    pub duration: Time,
    pub cost: Cost,
}

/// One single-departure search
#[derive(Debug, Clone, Copy)]
pub struct RaptorRequest<'a> {
    pub access: &'a [AccessLeg],
    pub egress: &'a [EgressLeg],
    pub departure_time: Time,
    /// A journey boards at most `max_transfers + 1` vehicles
    pub max_transfers: usize,
    /// Labels that cannot stay within this cost are not expanded
    pub max_cost: Option<Cost>,
    pub costs: &'a CostModel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub rounds: usize,
    pub marked: usize,
    /// Improved labels the heuristic kept from being marked
    pub pruned: usize,
}

/// Earliest arrival at the destination and the cost of reaching it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaptorResult {
    pub arrival_time: Option<Time>,
    pub boardings: usize,
    pub cost: Option<Cost>,
    pub stats: SearchStats,
}

impl RaptorResult {
    pub fn transfers(&self) -> usize {
        self.boardings.saturating_sub(1)
    }
}

/// Incumbent destination label
#[derive(Debug, Clone, Copy)]
struct Incumbent {
    arrival: Time,
    cost: Cost,
    round: usize,
}

/// Decides whether an improved stop label is worth expanding
struct Pruner<'a> {
    heuristics: &'a HeuristicTable,
    last_round: usize,
    max_cost: Option<Cost>,
}

impl Pruner<'_> {
    /// Labels that cannot finish within the cost limit are never stored, so
    /// they cannot shadow a slower but cheaper label at the same stop.
    fn within_budget(&self, stop: RaptorStopId, cost: Cost) -> bool {
        self.max_cost.is_none_or(|max| {
            cost.saturating_add(self.heuristics.stop(stop).min_cost) <= max
        })
    }

    fn is_promising(
        &self,
        round: usize,
        stop: RaptorStopId,
        arrival: Time,
        cost: Cost,
        best_arrival: Time,
    ) -> bool {
        let boardings = u32::try_from(round).unwrap_or(u32::MAX);
        let accumulated = Criteria::new(arrival, boardings, cost);
        let best = Criteria::new(
            best_arrival,
            u32::try_from(self.last_round + 1).unwrap_or(u32::MAX),
            self.max_cost.map_or(Cost::MAX, |max| max.saturating_add(1)),
        );
        !self
            .heuristics
            .can_prune(Location::Stop(stop), accumulated, best)
    }
}

/// Boarded trip while scanning a route
#[derive(Debug, Clone, Copy)]
struct Boarded<'a> {
    trip_idx: usize,
    trip: &'a [StopTime],
    /// Label cost at any later stop is `base + arrival`
    base: i64,
}

impl Boarded<'_> {
    fn cost_at(&self, arrival: Time) -> Cost {
        let cost = self.base + i64::from(arrival);
        Cost::try_from(cost.max(0)).unwrap_or(Cost::MAX)
    }
}

/// RAPTOR for one departure time from access legs to egress legs.
///
/// Round `k` holds labels after `k` boardings. An improved label is only
/// marked for the next round when its destination bounds show it can still
/// beat the incumbent arrival, fit in the remaining rounds and, if a cost
/// limit is set, stay within it.
#[allow(clippy::too_many_lines)]
pub fn pruned_raptor(
    data: &PublicTransitData,
    heuristics: &HeuristicTable,
    request: &RaptorRequest<'_>,
) -> Result<RaptorResult, RaptorError> {
    validate_time(request.departure_time)?;
    for stop in request
        .access
        .iter()
        .map(|leg| leg.stop)
        .chain(request.egress.iter().map(|leg| leg.stop))
    {
        data.validate_stop(stop)?;
    }

    let num_stops = data.num_stops();
    let max_rounds = request.max_transfers + 2;
    let mut state = RaptorState::new(num_stops, max_rounds);
    let mut stats = SearchStats::default();
    let mut best = Incumbent {
        arrival: Time::MAX,
        cost: Cost::MAX,
        round: 0,
    };
    let pruner = Pruner {
        heuristics,
        last_round: max_rounds - 1,
        max_cost: request.max_cost,
    };

    // Round 0: access legs
    for leg in request.access {
        if !pruner.within_budget(leg.stop, leg.cost) {
            continue;
        }
        let arrival = request.departure_time.saturating_add(leg.duration);
        if state.update(0, leg.stop, arrival, leg.cost)? {
            mark(&mut state, &mut stats, &pruner, 0, leg.stop, best.arrival);
        }
    }
    process_foot_paths(data, request.costs, &pruner, &mut state, &mut stats, 0, best.arrival)?;
    update_incumbent(&state, request, 0, &mut best);

    for round in 1..max_rounds {
        let prev_round = round - 1;
        if state.marked_stops[prev_round].is_clear() {
            break;
        }
        stats.rounds = round;

        let mut queue = create_route_queue(data, &state.marked_stops[prev_round])?;
        state.marked_stops[prev_round].clear();

        while let Some((route_id, start_pos)) = queue.pop_front() {
            let stops = data.get_route_stops(route_id)?;
            let mut boarded: Option<Boarded<'_>> = None;

            for (pos, &stop) in stops.iter().enumerate().skip(start_pos) {
                if let Some(current) = boarded {
                    let arrival = current.trip[pos].arrival;
                    let cost = current.cost_at(arrival);
                    if arrival < best.arrival
                        && pruner.within_budget(stop, cost)
                        && state.update(round, stop, arrival, cost)?
                    {
                        mark(&mut state, &mut stats, &pruner, round, stop, best.arrival);
                    }
                }

                // Board here, or switch to an earlier trip
                let prev_arrival = state.arrival_times[prev_round][stop];
                if prev_arrival == Time::MAX || pos + 1 == stops.len() {
                    continue;
                }
                if boarded.is_some_and(|current| prev_arrival >= current.trip[pos].departure) {
                    continue;
                }
                let Some(trip_idx) = find_earliest_trip(data, route_id, pos, prev_arrival) else {
                    continue;
                };
                if boarded.is_some_and(|current| current.trip_idx == trip_idx) {
                    continue;
                }
                let trip = data.get_trip(route_id, trip_idx)?;
                let departure = trip[pos].departure;
                let surcharge = if round > 1 {
                    request.costs.transfer_cost
                } else {
                    0
                };
                let boarding_cost = i64::from(state.costs[prev_round][stop])
                    + i64::from(request.costs.wait_cost(departure - prev_arrival))
                    + i64::from(request.costs.board_cost)
                    + i64::from(surcharge);
                boarded = Some(Boarded {
                    trip_idx,
                    trip,
                    base: boarding_cost - i64::from(departure),
                });
            }
        }

        process_foot_paths(
            data,
            request.costs,
            &pruner,
            &mut state,
            &mut stats,
            round,
            best.arrival,
        )?;
        update_incumbent(&state, request, round, &mut best);
    }

    trace!(
        "RAPTOR at {}: {} rounds, {} marked, {} pruned",
        request.departure_time, stats.rounds, stats.marked, stats.pruned
    );
    let found = best.arrival != Time::MAX;
    Ok(RaptorResult {
        arrival_time: found.then_some(best.arrival),
        boardings: best.round,
        cost: found.then_some(best.cost),
        stats,
    })
}

/// Marks a freshly improved label unless its bounds rule it out
fn mark(
    state: &mut RaptorState,
    stats: &mut SearchStats,
    pruner: &Pruner<'_>,
    round: usize,
    stop: RaptorStopId,
    best_arrival: Time,
) {
    let arrival = state.arrival_times[round][stop];
    let cost = state.costs[round][stop];
    if pruner.is_promising(round, stop, arrival, cost, best_arrival) {
        state.marked_stops[round].insert(stop);
        stats.marked += 1;
    } else {
        stats.pruned += 1;
    }
}

/// Walks the transfers of every stop marked in `round`
fn process_foot_paths(
    data: &PublicTransitData,
    costs: &CostModel,
    pruner: &Pruner<'_>,
    state: &mut RaptorState,
    stats: &mut SearchStats,
    round: usize,
    best_arrival: Time,
) -> Result<(), RaptorError> {
    let current_marks: Vec<RaptorStopId> = state.marked_stops[round].ones().collect();
    for stop in current_marks {
        let arrival = state.arrival_times[round][stop];
        let cost = state.costs[round][stop];
        for &Transfer {
            target_stop,
            duration,
        } in data.get_stop_transfers(stop)?
        {
            let new_time = arrival.saturating_add(duration);
            let new_cost = cost.saturating_add(costs.street_cost(StreetMode::Walk, duration));
            if new_time >= best_arrival || !pruner.within_budget(target_stop, new_cost) {
                continue;
            }
            if state.update(round, target_stop, new_time, new_cost)? {
                mark(state, stats, pruner, round, target_stop, best_arrival);
            }
        }
    }
    Ok(())
}

/// Routes serving a marked stop, each with the first marked position
fn create_route_queue(
    data: &PublicTransitData,
    marked_stops: &FixedBitSet,
) -> Result<VecDeque<(RouteId, usize)>, RaptorError> {
    let mut queue = VecDeque::new();

    for route_id in 0..data.num_routes() {
        let stops = data.get_route_stops(route_id)?;
        if let Some(pos) = stops.iter().position(|&stop| marked_stops.contains(stop)) {
            queue.push_back((route_id, pos));
        }
    }

    Ok(queue)
}

fn update_incumbent(
    state: &RaptorState,
    request: &RaptorRequest<'_>,
    round: usize,
    best: &mut Incumbent,
) {
    for leg in request.egress {
        let arrival = state.arrival_times[round][leg.stop];
        if arrival == Time::MAX {
            continue;
        }
        let total_arrival = arrival.saturating_add(leg.duration);
        let total_cost = state.costs[round][leg.stop].saturating_add(leg.cost);
        if request.max_cost.is_some_and(|max| total_cost > max) {
            continue;
        }
        if total_arrival < best.arrival || (total_arrival == best.arrival && total_cost < best.cost)
        {
            *best = Incumbent {
                arrival: total_arrival,
                cost: total_cost,
                round,
            };
        }
    }
}
