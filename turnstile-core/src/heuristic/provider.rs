use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use itertools::Itertools;
use log::{debug, warn};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;

use super::destination::{DestinationHeuristic, HeuristicTable, Location};
use crate::model::streets::StreetEdge;
use crate::routing::street::reverse_egress_search;
use crate::turns::TurnCostCalculator;
use crate::{
    Cost, PublicTransitData, RaptorStopId, RouteId, SearchConfig, StreetMode, Time, TransitModel,
};

/// Walking connection from a stop to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgressLeg {
    pub stop: RaptorStopId,
    pub duration: Time,
    pub cost: Cost,
}

/// Where a request ends: the stops it can be left from, plus the street
/// vertex it ends at when it does not end at a stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub egress: Vec<EgressLeg>,
    pub vertex: Option<NodeIndex>,
}

impl Destination {
    /// Destination that is the stop itself
    pub fn stop(stop: RaptorStopId) -> Self {
        Self {
            egress: vec![EgressLeg {
                stop,
                duration: 0,
                cost: 0,
            }],
            vertex: None,
        }
    }
}

/// Fastest ride between consecutive stops of one pattern over all its trips
#[derive(Debug, Clone)]
struct RouteBounds {
    /// `hops[k]`: stop `k` departure to stop `k + 1` arrival
    hops: Vec<Time>,
    /// `dwells[k]`: time spent standing at stop `k`
    dwells: Vec<Time>,
}

impl RouteBounds {
    fn new(data: &PublicTransitData, route_id: RouteId) -> Self {
        let num_stops = data.routes[route_id].num_stops;
        let mut hops = vec![Time::MAX; num_stops.saturating_sub(1)];
        let mut dwells = vec![Time::MAX; num_stops];

        for trip_idx in 0..data.routes[route_id].num_trips {
            let Ok(trip) = data.get_trip(route_id, trip_idx) else {
                continue;
            };
            for (k, (from, to)) in trip.iter().tuple_windows().enumerate() {
                hops[k] = hops[k].min(to.arrival.saturating_sub(from.departure));
            }
            for (k, stop_time) in trip.iter().enumerate() {
                dwells[k] = dwells[k].min(stop_time.departure.saturating_sub(stop_time.arrival));
            }
        }
        Self { hops, dwells }
    }

    /// Yields `(position, ride bound)` for every position before `alight`,
    /// walking backwards along the pattern.
    fn rides_to(&self, alight: usize) -> impl Iterator<Item = (usize, Time)> + '_ {
        let mut ride: Time = 0;
        (0..alight).rev().map_while(move |board| {
            if board + 1 < alight {
                ride = ride.saturating_add(self.dwells[board + 1]);
            }
            ride = ride.saturating_add(self.hops[board]);
            (ride != Time::MAX).then_some((board, ride))
        })
    }
}

/// Reverse search state, ordered as a min-heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Queued<N> {
    value: Reverse<u32>,
    node: N,
}

impl<N> Queued<N> {
    fn new(value: u32, node: N) -> Self {
        Self {
            value: Reverse(value),
            node,
        }
    }
}

/// Street label: `seed` is set while the path has no edge yet, so the
/// first turn is not charged at the vertex a path ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct StreetKey {
    node: NodeIndex,
    seed: bool,
}

/// Builds destination heuristics for one transit model.
///
/// Construction precomputes everything that does not depend on the
/// destination; each [`HeuristicProvider::build`] then runs the reverse
/// passes for one destination.
pub struct HeuristicProvider<'a> {
    model: &'a TransitModel,
    config: &'a SearchConfig,
    route_bounds: Vec<RouteBounds>,
    /// `(route, position)` of every visit of a stop by a pattern
    stop_visits: Vec<Vec<(RouteId, usize)>>,
    /// Transfers indexed by their target stop, as `(source, duration)`
    incoming_transfers: Vec<Vec<(RaptorStopId, Time)>>,
}

impl<'a> HeuristicProvider<'a> {
    pub fn new(model: &'a TransitModel, config: &'a SearchConfig) -> Self {
        let data = &model.transit_data;
        let route_bounds: Vec<RouteBounds> = (0..data.num_routes())
            .into_par_iter()
            .map(|route_id| RouteBounds::new(data, route_id))
            .collect();

        let mut stop_visits = vec![Vec::new(); data.num_stops()];
        for route_id in 0..data.num_routes() {
            let Ok(stops) = data.get_route_stops(route_id) else {
                continue;
            };
            for (position, &stop) in stops.iter().enumerate() {
                stop_visits[stop].push((route_id, position));
            }
        }

        let mut incoming_transfers = vec![Vec::new(); data.num_stops()];
        for source in 0..data.num_stops() {
            for transfer in data.get_stop_transfers(source).unwrap_or(&[]) {
                if let Some(incoming) = incoming_transfers.get_mut(transfer.target_stop) {
                    incoming.push((source, transfer.duration));
                }
            }
        }

        debug!(
            "Heuristic provider ready: {} route bounds, {} stops",
            route_bounds.len(),
            stop_visits.len()
        );
        Self {
            model,
            config,
            route_bounds,
            stop_visits,
            incoming_transfers,
        }
    }

    /// Bounds for a destination that is a stop
    pub fn build_for_stop(&self, stop: RaptorStopId) -> HeuristicTable {
        self.build(&Destination::stop(stop))
    }

    /// Bounds for a stop or a street vertex; egress legs of a vertex come
    /// from a reverse walk bounded by the maximum egress time.
    pub fn build_for_location(&self, location: Location) -> HeuristicTable {
        match location {
            Location::Stop(stop) => self.build_for_stop(stop),
            Location::Vertex(node) => self.build(&self.destination_at(node)),
        }
    }

    /// Destination at a street vertex together with its egress legs
    pub fn destination_at(&self, node: NodeIndex) -> Destination {
        Destination {
            egress: reverse_egress_search(self.model, self.config, node),
            vertex: Some(node),
        }
    }

    pub fn build(&self, destination: &Destination) -> HeuristicTable {
        let num_stops = self.model.transit_data.num_stops();
        let egress: Vec<EgressLeg> = destination
            .egress
            .iter()
            .filter(|leg| {
                let known = leg.stop < num_stops;
                if !known {
                    warn!("Ignoring egress leg from unknown stop {}", leg.stop);
                }
                known
            })
            .copied()
            .collect();

        let (time, (cost, transfers)) = rayon::join(
            || self.stop_time_bounds(&egress),
            || {
                rayon::join(
                    || self.stop_cost_bounds(&egress),
                    || self.stop_transfer_bounds(&egress),
                )
            },
        );
        let stops: Vec<DestinationHeuristic> = time
            .into_iter()
            .zip(transfers)
            .zip(cost)
            .map(|((min_travel_time, min_transfers), min_cost)| {
                if min_travel_time == Time::MAX {
                    DestinationHeuristic::UNREACHABLE
                } else {
                    DestinationHeuristic {
                        min_travel_time,
                        min_transfers,
                        min_cost,
                    }
                }
            })
            .collect();

        let vertices = self.vertex_bounds(&stops, destination.vertex);
        let table = HeuristicTable::new(stops, vertices);
        debug!(
            "Heuristic table: {} reachable stops, {} reachable vertices",
            table.num_reachable_stops(),
            table.num_reachable_vertices()
        );
        table
    }

    fn stop_time_bounds(&self, egress: &[EgressLeg]) -> Vec<Time> {
        let seeds = egress.iter().map(|leg| (leg.stop, leg.duration));
        self.reverse_stop_dijkstra(seeds, |duration| duration, |ride| ride)
    }

    fn stop_cost_bounds(&self, egress: &[EgressLeg]) -> Vec<Cost> {
        let cost_model = &self.config.cost_model;
        let seeds = egress.iter().map(|leg| (leg.stop, leg.cost));
        self.reverse_stop_dijkstra(
            seeds,
            |duration| cost_model.street_cost(StreetMode::Walk, duration),
            |ride| ride.saturating_add(cost_model.board_cost),
        )
    }

    /// Shared reverse Dijkstra over transfers and rides. Waiting is free,
    /// so each ride weighs its fastest possible duration.
    fn reverse_stop_dijkstra(
        &self,
        seeds: impl Iterator<Item = (RaptorStopId, u32)>,
        transfer_weight: impl Fn(Time) -> u32,
        ride_weight: impl Fn(Time) -> u32,
    ) -> Vec<u32> {
        let data = &self.model.transit_data;
        let mut best = vec![u32::MAX; data.num_stops()];
        let mut heap = BinaryHeap::new();
        for (stop, value) in seeds {
            if value < best[stop] {
                best[stop] = value;
                heap.push(Queued::new(value, stop));
            }
        }

        while let Some(Queued {
            value: Reverse(value),
            node: stop,
        }) = heap.pop()
        {
            if value > best[stop] {
                continue;
            }
            let mut relax = |source: RaptorStopId, weight: u32| {
                let candidate = value.saturating_add(weight);
                if candidate < best[source] {
                    best[source] = candidate;
                    heap.push(Queued::new(candidate, source));
                }
            };

            for &(source, duration) in &self.incoming_transfers[stop] {
                relax(source, transfer_weight(duration));
            }
            for &(route_id, alight) in &self.stop_visits[stop] {
                let Ok(route_stops) = data.get_route_stops(route_id) else {
                    continue;
                };
                for (board, ride) in self.route_bounds[route_id].rides_to(alight) {
                    relax(route_stops[board], ride_weight(ride));
                }
            }
        }
        best
    }

    /// Fewest boardings, as a 0-1 BFS: transfers are free, boarding costs one
    fn stop_transfer_bounds(&self, egress: &[EgressLeg]) -> Vec<u32> {
        let data = &self.model.transit_data;
        let mut best = vec![u32::MAX; data.num_stops()];
        let mut queue = VecDeque::new();
        for leg in egress {
            best[leg.stop] = 0;
            queue.push_back((0, leg.stop));
        }

        while let Some((boardings, stop)) = queue.pop_front() {
            if boardings > best[stop] {
                continue;
            }
            for &(source, _) in &self.incoming_transfers[stop] {
                if boardings < best[source] {
                    best[source] = boardings;
                    queue.push_front((boardings, source));
                }
            }
            let next = boardings + 1;
            for &(route_id, alight) in &self.stop_visits[stop] {
                let Ok(route_stops) = data.get_route_stops(route_id) else {
                    continue;
                };
                for (board, _) in self.route_bounds[route_id].rides_to(alight) {
                    let source = route_stops[board];
                    if next < best[source] {
                        best[source] = next;
                        queue.push_back((next, source));
                    }
                }
            }
        }
        best
    }

    /// Street phase: every vertex either walks straight to the destination
    /// vertex or walks to a linked stop and continues from there.
    fn vertex_bounds(
        &self,
        stops: &[DestinationHeuristic],
        destination: Option<NodeIndex>,
    ) -> Vec<DestinationHeuristic> {
        let data = &self.model.transit_data;
        let mut seeds: Vec<(NodeIndex, DestinationHeuristic)> = stops
            .iter()
            .enumerate()
            .filter(|(_, bound)| bound.is_reachable())
            .filter_map(|(stop, bound)| data.stop_node(stop).map(|node| (node, *bound)))
            .collect();
        if let Some(node) = destination {
            if self.model.street_graph.node(node).is_some() {
                seeds.push((node, DestinationHeuristic::ZERO));
            } else {
                warn!("Destination vertex {} is not in the street graph", node.index());
            }
        }

        let mode = self.config.access_mode;
        let speeds = &self.config.speeds;
        let cost_model = &self.config.cost_model;
        let min_turn = TurnCostCalculator::new(&self.model.street_graph, &self.config.turn_costs)
            .min_penalty(mode);

        let time_seeds: Vec<_> = seeds.iter().map(|(n, h)| (*n, h.min_travel_time)).collect();
        let cost_seeds: Vec<_> = seeds.iter().map(|(n, h)| (*n, h.min_cost)).collect();
        let transfer_seeds: Vec<_> = seeds.iter().map(|(n, h)| (*n, h.min_transfers)).collect();

        let (time, (cost, transfers)) = rayon::join(
            || self.reverse_street_dijkstra(&time_seeds, |e| e.traversal_time(mode, speeds), 0),
            || {
                rayon::join(
                    || {
                        self.reverse_street_dijkstra(
                            &cost_seeds,
                            |e| cost_model.street_cost(mode, e.traversal_time(mode, speeds)),
                            min_turn,
                        )
                    },
                    || self.reverse_street_dijkstra(&transfer_seeds, |_| 0, 0),
                )
            },
        );

        time.into_iter()
            .zip(transfers)
            .zip(cost)
            .map(|((min_travel_time, min_transfers), min_cost)| {
                if min_travel_time == Time::MAX {
                    DestinationHeuristic::UNREACHABLE
                } else {
                    DestinationHeuristic {
                        min_travel_time,
                        min_transfers,
                        min_cost,
                    }
                }
            })
            .collect()
    }

    /// Reverse Dijkstra over the edges the access mode may use. `turn` is
    /// charged at every vertex a path passes through, but not at the vertex
    /// it ends on.
    fn reverse_street_dijkstra(
        &self,
        seeds: &[(NodeIndex, u32)],
        edge_weight: impl Fn(&StreetEdge) -> u32,
        turn: u32,
    ) -> Vec<u32> {
        let streets = &self.model.street_graph;
        let mode = self.config.access_mode;
        // Index 0 holds labels with at least one edge, index 1 seed labels
        let mut best = vec![[u32::MAX; 2]; streets.node_count()];
        let mut heap = BinaryHeap::new();
        for &(node, value) in seeds {
            if value < best[node.index()][1] {
                best[node.index()][1] = value;
                heap.push(Queued::new(value, StreetKey { node, seed: true }));
            }
        }

        while let Some(Queued {
            value: Reverse(value),
            node: key,
        }) = heap.pop()
        {
            if value > best[key.node.index()][usize::from(key.seed)] {
                continue;
            }
            let through = if key.seed { 0 } else { turn };
            for edge in streets.in_edges(key.node) {
                if !edge.weight().allows(mode) {
                    continue;
                }
                let source = edge.source();
                let candidate = value
                    .saturating_add(edge_weight(edge.weight()))
                    .saturating_add(through);
                if candidate < best[source.index()][0] {
                    best[source.index()][0] = candidate;
                    heap.push(Queued::new(
                        candidate,
                        StreetKey {
                            node: source,
                            seed: false,
                        },
                    ));
                }
            }
        }
        best.into_iter().map(|[path, seed]| path.min(seed)).collect()
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::config::CostModel;
    use crate::model::streets::ModePermissions;
    use crate::StreetGraph;
    use crate::model::StopTime;
    use crate::model::transit::TransitDataBuilder;
    use crate::routing::street::{StreetSearchLimits, turn_aware_search};

    fn stop_times(times: &[(Time, Time)]) -> Vec<StopTime> {
        times.iter().map(|&(a, d)| StopTime::new(a, d)).collect()
    }

    /// Stops A..F, destination F.
    ///
    /// * R1: A -> B -> C -> D, two trips, the later one faster
    /// * R2: C -> F, express
    /// * R3: D -> E -> F, slow
    /// * transfer B -> C (60 s) and E -> F (300 s)
    /// * G is served by nothing
    fn timetable() -> PublicTransitData {
        let mut b = TransitDataBuilder::new();
        let stops: Vec<_> = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .enumerate()
            .map(|(i, name)| b.add_stop(*name, Point::new(0.001 * i as f64, 0.0)))
            .collect();
        let &[a, bs, c, d, e, f, _g] = stops.as_slice() else {
            unreachable!()
        };

        let r1 = b.add_route("R1", vec![a, bs, c, d]).unwrap();
        b.add_trip(r1, stop_times(&[(0, 0), (300, 320), (600, 610), (900, 900)]))
            .unwrap();
        b.add_trip(
            r1,
            stop_times(&[(100, 100), (340, 350), (620, 630), (900, 900)]),
        )
        .unwrap();

        let r2 = b.add_route("R2", vec![c, f]).unwrap();
        b.add_trip(r2, stop_times(&[(700, 700), (1000, 1000)])).unwrap();
        b.add_trip(r2, stop_times(&[(1300, 1300), (1500, 1500)])).unwrap();

        let r3 = b.add_route("R3", vec![d, e, f]).unwrap();
        b.add_trip(r3, stop_times(&[(950, 950), (1400, 1400), (1900, 1900)]))
            .unwrap();

        b.add_transfer(bs, c, 60).unwrap();
        b.add_transfer(e, f, 300).unwrap();
        b.build().unwrap()
    }

    fn model() -> TransitModel {
        TransitModel::new(StreetGraph::new(), timetable())
    }

    #[test]
    fn route_bounds_take_fastest_trip_per_hop() {
        let data = timetable();
        let bounds = RouteBounds::new(&data, 0);
        assert_eq!(bounds.hops, vec![240, 270, 270]);
        assert_eq!(bounds.dwells, vec![0, 10, 10, 0]);
        // D is position 3; rides back to C, B and A
        let rides: Vec<_> = bounds.rides_to(3).collect();
        assert_eq!(rides, vec![(2, 270), (1, 270 + 10 + 270), (0, 550 + 10 + 240)]);
    }

    #[test]
    fn stop_bounds_on_small_network() {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = model();
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);
        let table = provider.build_for_stop(5);

        assert_eq!(table.stop(5), DestinationHeuristic::ZERO);
        // E walks in 300 s, but riding R3 is cheaper than walking
        let e = table.stop(4);
        assert_eq!(e.min_travel_time, 300);
        assert_eq!(e.min_transfers, 0);
        assert!(config.cost_model.street_cost(StreetMode::Walk, 300) > 500 + 60);
        assert_eq!(e.min_cost, 500 + config.cost_model.board_cost);
        // C rides the express
        let c = table.stop(2);
        assert_eq!(c.min_travel_time, 200);
        assert_eq!(c.min_transfers, 1);
        assert_eq!(c.min_cost, 200 + config.cost_model.board_cost);
        // B walks to C
        assert_eq!(table.stop(1).min_travel_time, 260);
        assert_eq!(table.stop(1).min_transfers, 1);
        // A rides R1 to B, walks to C and takes R2
        assert_eq!(table.stop(0).min_transfers, 2);
        assert_eq!(table.stop(0).min_travel_time, 240 + 60 + 200);
        // G is isolated
        assert_eq!(table.stop(6), DestinationHeuristic::UNREACHABLE);
        assert_eq!(table.get(Location::Stop(42)), DestinationHeuristic::UNREACHABLE);
    }

    #[test]
    fn unreachable_destination_leaves_everything_unreachable() {
        let model = model();
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);
        // Nothing leads to A
        let table = provider.build_for_stop(0);
        assert_eq!(table.stop(0), DestinationHeuristic::ZERO);
        for stop in 1..7 {
            assert_eq!(table.stop(stop), DestinationHeuristic::UNREACHABLE);
        }
        assert_eq!(table.num_reachable_stops(), 1);
    }

    #[test]
    fn rebuilding_gives_identical_tables() {
        let model = model();
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);
        let first = provider.build_for_stop(5);
        let second = provider.build_for_stop(5);
        assert_eq!(first, second);
        assert_eq!(
            first,
            HeuristicProvider::new(&model, &config).build_for_stop(5)
        );
    }

    /// Best journey values over every possible itinerary, found by brute
    /// force. Each field is minimised independently.
    #[derive(Debug, Clone, Copy)]
    struct Exhaustive {
        time: Time,
        boardings: u32,
        cost: Cost,
    }

    #[allow(clippy::too_many_arguments)]
    fn explore(
        data: &PublicTransitData,
        costs: &CostModel,
        target: RaptorStopId,
        stop: RaptorStopId,
        now: Time,
        start: Time,
        boardings: u32,
        cost: Cost,
        moves: u32,
        best: &mut Exhaustive,
    ) {
        if stop == target {
            best.time = best.time.min(now - start);
            best.boardings = best.boardings.min(boardings);
            best.cost = best.cost.min(cost);
        }
        if moves == 0 {
            return;
        }
        for transfer in data.get_stop_transfers(stop).unwrap() {
            explore(
                data,
                costs,
                target,
                transfer.target_stop,
                now + transfer.duration,
                start,
                boardings,
                cost + costs.street_cost(StreetMode::Walk, transfer.duration),
                moves - 1,
                best,
            );
        }
        for &route_id in data.routes_for_stop(stop) {
            let stops = data.get_route_stops(route_id).unwrap();
            for board in (0..stops.len()).filter(|&p| stops[p] == stop) {
                for trip_idx in 0..data.routes[route_id].num_trips {
                    let trip = data.get_trip(route_id, trip_idx).unwrap();
                    if trip[board].departure < now {
                        continue;
                    }
                    let surcharge = if boardings > 0 { costs.transfer_cost } else { 0 };
                    let boarded = cost
                        + costs.wait_cost(trip[board].departure - now)
                        + costs.board_cost
                        + surcharge;
                    for alight in board + 1..stops.len() {
                        explore(
                            data,
                            costs,
                            target,
                            stops[alight],
                            trip[alight].arrival,
                            start,
                            boardings + 1,
                            boarded + (trip[alight].arrival - trip[board].departure),
                            moves - 1,
                            best,
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn bounds_never_exceed_exhaustive_search() {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = model();
        let data = &model.transit_data;
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);

        for target in 0..data.num_stops() {
            let table = provider.build_for_stop(target);
            for origin in 0..data.num_stops() {
                let mut reached = false;
                for start in (0..=1400).step_by(50) {
                    let mut best = Exhaustive {
                        time: Time::MAX,
                        boardings: u32::MAX,
                        cost: Cost::MAX,
                    };
                    explore(
                        data,
                        &config.cost_model,
                        target,
                        origin,
                        start,
                        start,
                        0,
                        0,
                        5,
                        &mut best,
                    );
                    if best.time == Time::MAX {
                        continue;
                    }
                    reached = true;
                    let bound = table.stop(origin);
                    assert!(bound.min_travel_time <= best.time, "{origin}->{target} time");
                    assert!(bound.min_transfers <= best.boardings, "{origin}->{target} boardings");
                    assert!(bound.min_cost <= best.cost, "{origin}->{target} cost");
                }
                if reached {
                    assert!(table.stop(origin).is_reachable());
                }
            }
        }
    }

    /// Street line w0 - w1 - w2 - w3 with stop F linked to w3, plus a
    /// car-only spur w1 -> w4.
    fn street_model() -> (TransitModel, Vec<NodeIndex>) {
        let mut streets = StreetGraph::new();
        let nodes: Vec<_> = (0..5)
            .map(|i| streets.add_node(Point::new(0.002 * f64::from(i), 0.001)))
            .collect();
        for pair in nodes[..4].windows(2) {
            streets
                .add_street_pair(pair[0], pair[1], ModePermissions::ALL)
                .unwrap();
        }
        streets
            .add_street_pair(nodes[1], nodes[4], ModePermissions::CAR)
            .unwrap();

        let mut model = TransitModel::new(streets, timetable());
        model.link_stop(5, nodes[3]).unwrap();
        (model, nodes)
    }

    #[test]
    fn vertices_inherit_stop_bounds_through_the_street() {
        let (model, nodes) = street_model();
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);
        let table = provider.build_for_stop(5);
        let speeds = &config.speeds;

        let edge = |from: usize, to: usize| {
            let edge = model
                .street_graph
                .out_edges(nodes[from])
                .find(|e| e.target() == nodes[to])
                .unwrap();
            edge.weight().traversal_time(StreetMode::Walk, speeds)
        };
        assert_eq!(table.vertex(nodes[3]), DestinationHeuristic::ZERO);
        let w2 = table.vertex(nodes[2]);
        assert_eq!(w2.min_travel_time, edge(2, 3));
        assert_eq!(w2.min_transfers, 0);
        assert_eq!(
            table.vertex(nodes[0]).min_travel_time,
            edge(0, 1) + edge(1, 2) + edge(2, 3)
        );
        // Walking is not allowed on the spur
        assert_eq!(table.vertex(nodes[4]), DestinationHeuristic::UNREACHABLE);
    }

    #[test]
    fn turn_penalties_enter_vertex_cost_bounds() {
        let (model, nodes) = street_model();
        let config = SearchConfig {
            access_mode: StreetMode::Car,
            ..SearchConfig::default()
        };
        let turns = crate::TurnPenalties {
            straight: 5,
            right: 10,
            left: 30,
            u_turn: 90,
        };
        let mut with_turns = config.clone();
        with_turns.turn_costs.table.car = Some(turns);

        let plain = HeuristicProvider::new(&model, &config).build_for_stop(5);
        let turned = HeuristicProvider::new(&model, &with_turns).build_for_stop(5);
        let plain_cost = |i: usize| plain.vertex(nodes[i]).min_cost;
        let turned_cost = |i: usize| turned.vertex(nodes[i]).min_cost;

        // No vertex to pass through
        assert_eq!(turned_cost(2), plain_cost(2));
        // Through w2
        assert_eq!(turned_cost(1), plain_cost(1) + 5);
        // Through w1 and w2, from either end of the spur
        assert_eq!(turned_cost(0), plain_cost(0) + 10);
        assert_eq!(turned_cost(4), plain_cost(4) + 10);
    }

    #[test]
    fn vertex_destination_walks_to_stops() {
        let (model, nodes) = street_model();
        let config = SearchConfig::default();
        let provider = HeuristicProvider::new(&model, &config);
        let destination = provider.destination_at(nodes[2]);
        assert_eq!(destination.vertex, Some(nodes[2]));
        assert_eq!(destination.egress.len(), 1);
        assert_eq!(destination.egress[0].stop, 5);

        let table = provider.build_for_location(Location::Vertex(nodes[2]));
        assert_eq!(table.vertex(nodes[2]), DestinationHeuristic::ZERO);
        assert_eq!(table.stop(5).min_travel_time, destination.egress[0].duration);
        // C reaches F by transit, then walks back along the street
        assert_eq!(
            table.stop(2).min_travel_time,
            200 + destination.egress[0].duration
        );
    }

    /// 5 x 5 grid with one-way rows alternating east and west, column 1
    /// one-way north, column 3 one-way south and the other columns two-way.
    /// Stops A..F sit on scattered vertices; G stays unlinked.
    fn one_way_grid() -> (TransitModel, Vec<Vec<NodeIndex>>) {
        let mut streets = StreetGraph::new();
        let grid: Vec<Vec<NodeIndex>> = (0..5)
            .map(|row| {
                (0..5)
                    .map(|col| {
                        streets.add_node(Point::new(
                            10.0 + 0.002 * f64::from(col),
                            50.0 + 0.002 * f64::from(row),
                        ))
                    })
                    .collect()
            })
            .collect();
        for (row, nodes) in grid.iter().enumerate() {
            for pair in nodes.windows(2) {
                let (from, to) = if row % 2 == 0 {
                    (pair[0], pair[1])
                } else {
                    (pair[1], pair[0])
                };
                streets.add_edge(from, to, ModePermissions::ALL).unwrap();
            }
        }
        for col in 0..5 {
            for row in 0..4 {
                let (south, north) = (grid[row][col], grid[row + 1][col]);
                let added = match col {
                    1 => streets.add_edge(south, north, ModePermissions::ALL).map(|_| ()),
                    3 => streets.add_edge(north, south, ModePermissions::ALL).map(|_| ()),
                    _ => streets
                        .add_street_pair(south, north, ModePermissions::ALL)
                        .map(|_| ()),
                };
                added.unwrap();
            }
        }

        let mut model = TransitModel::new(streets, timetable());
        for (stop, (row, col)) in [(0, 0), (1, 2), (2, 4), (4, 1), (3, 3), (4, 4)]
            .into_iter()
            .enumerate()
        {
            model.link_stop(stop, grid[row][col]).unwrap();
        }
        (model, grid)
    }

    #[test]
    fn vertex_bounds_never_exceed_street_search() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (model, grid) = one_way_grid();
        let mut config = SearchConfig {
            access_mode: StreetMode::Car,
            ..SearchConfig::default()
        };
        config.turn_costs.table.car = Some(crate::TurnPenalties {
            straight: 7,
            right: 20,
            left: 60,
            u_turn: 200,
        });
        let destination = grid[2][2];
        let provider = HeuristicProvider::new(&model, &config);
        let table = provider.build_for_location(Location::Vertex(destination));
        let calculator = TurnCostCalculator::new(&model.street_graph, &config.turn_costs);
        let data = &model.transit_data;

        let mut checked = 0;
        for &origin in grid.iter().flatten() {
            let search = turn_aware_search(
                &model,
                &calculator,
                &config,
                origin,
                StreetMode::Car,
                &StreetSearchLimits::with_max_time(Time::MAX),
            )
            .unwrap();
            let bound = table.vertex(origin);
            let targets = (0..data.num_stops())
                .filter(|&stop| table.stop(stop).is_reachable())
                .filter_map(|stop| Some((data.stop_node(stop)?, table.stop(stop))))
                .chain([(destination, DestinationHeuristic::ZERO)]);
            for (node, onward) in targets {
                let Some(label) = search.label(node) else {
                    continue;
                };
                let at = (origin.index(), node.index());
                assert!(
                    bound.min_cost <= label.cost.saturating_add(onward.min_cost),
                    "{at:?} cost"
                );
                assert!(
                    bound.min_travel_time <= label.time.saturating_add(onward.min_travel_time),
                    "{at:?} time"
                );
                assert!(bound.min_transfers <= onward.min_transfers, "{at:?} transfers");
                checked += 1;
            }
        }
        assert!(checked > 25);
    }
}
