use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::{Cost, RaptorStopId, Time};

/// Lower bounds on what is still needed to reach the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DestinationHeuristic {
    /// Seconds of travel still needed
    pub min_travel_time: Time,
    /// Vehicle boardings still needed
    pub min_transfers: u32,
    /// Generalized cost still to be paid
    pub min_cost: Cost,
}

impl DestinationHeuristic {
    /// The destination cannot be reached from this location
    pub const UNREACHABLE: Self = Self {
        min_travel_time: Time::MAX,
        min_transfers: u32::MAX,
        min_cost: Cost::MAX,
    };

    /// Bound at the destination itself
    pub const ZERO: Self = Self {
        min_travel_time: 0,
        min_transfers: 0,
        min_cost: 0,
    };

    pub fn is_reachable(&self) -> bool {
        self.min_travel_time != Time::MAX
    }
}

/// Values of the three criteria for a partial or complete journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Criteria {
    pub time: Time,
    pub transfers: u32,
    pub cost: Cost,
}

impl Criteria {
    /// No incumbent yet: nothing is pruned against it
    pub const UNBOUNDED: Self = Self {
        time: Time::MAX,
        transfers: u32::MAX,
        cost: Cost::MAX,
    };

    pub fn new(time: Time, transfers: u32, cost: Cost) -> Self {
        Self {
            time,
            transfers,
            cost,
        }
    }
}

/// Anything the searches can stand on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Stop(RaptorStopId),
    Vertex(NodeIndex),
}

/// Bounds for every stop and street vertex of one destination.
///
/// Built once per request and only read afterwards, so it can be shared by
/// reference across parallel searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicTable {
    stops: Vec<DestinationHeuristic>,
    vertices: Vec<DestinationHeuristic>,
}

impl HeuristicTable {
    pub(crate) fn new(stops: Vec<DestinationHeuristic>, vertices: Vec<DestinationHeuristic>) -> Self {
        Self { stops, vertices }
    }

    /// Table where every location is unreachable
    pub fn unreachable(num_stops: usize, num_vertices: usize) -> Self {
        Self::new(
            vec![DestinationHeuristic::UNREACHABLE; num_stops],
            vec![DestinationHeuristic::UNREACHABLE; num_vertices],
        )
    }

    /// Table of zero bounds, which never prunes a reachable label
    pub fn zeroed(num_stops: usize, num_vertices: usize) -> Self {
        Self::new(
            vec![DestinationHeuristic::ZERO; num_stops],
            vec![DestinationHeuristic::ZERO; num_vertices],
        )
    }

    /// Bounds of a location; ids outside the model read as unreachable
    pub fn get(&self, location: Location) -> DestinationHeuristic {
        match location {
            Location::Stop(stop) => self.stop(stop),
            Location::Vertex(node) => self.vertex(node),
        }
    }

    pub fn stop(&self, stop: RaptorStopId) -> DestinationHeuristic {
        self.stops
            .get(stop)
            .copied()
            .unwrap_or(DestinationHeuristic::UNREACHABLE)
    }

    pub fn vertex(&self, node: NodeIndex) -> DestinationHeuristic {
        self.vertices
            .get(node.index())
            .copied()
            .unwrap_or(DestinationHeuristic::UNREACHABLE)
    }

    pub fn num_reachable_stops(&self) -> usize {
        self.stops.iter().filter(|h| h.is_reachable()).count()
    }

    pub fn num_reachable_vertices(&self) -> usize {
        self.vertices.iter().filter(|h| h.is_reachable()).count()
    }

    /// True when a label at `location` with `accumulated` criteria cannot
    /// beat `best` in at least one criterion. The pruned RAPTOR checks every
    /// marked stop with it.
    pub fn can_prune(&self, location: Location, accumulated: Criteria, best: Criteria) -> bool {
        let bound = self.get(location);
        exceeds(accumulated.time, bound.min_travel_time, best.time)
            || exceeds(accumulated.transfers, bound.min_transfers, best.transfers)
            || exceeds(accumulated.cost, bound.min_cost, best.cost)
    }

    pub fn prunes_time(&self, location: Location, accumulated: Time, best: Time) -> bool {
        exceeds(accumulated, self.get(location).min_travel_time, best)
    }

    pub fn prunes_transfers(&self, location: Location, accumulated: u32, best: u32) -> bool {
        exceeds(accumulated, self.get(location).min_transfers, best)
    }

    pub fn prunes_cost(&self, location: Location, accumulated: Cost, best: Cost) -> bool {
        exceeds(accumulated, self.get(location).min_cost, best)
    }
}

fn exceeds(accumulated: u32, bound: u32, best: u32) -> bool {
    accumulated.saturating_add(bound) >= best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HeuristicTable {
        HeuristicTable::new(
            vec![
                DestinationHeuristic {
                    min_travel_time: 600,
                    min_transfers: 1,
                    min_cost: 700,
                },
                DestinationHeuristic::UNREACHABLE,
            ],
            vec![DestinationHeuristic::ZERO],
        )
    }

    #[test]
    fn unknown_locations_are_unreachable() {
        let table = table();
        assert_eq!(table.get(Location::Stop(7)), DestinationHeuristic::UNREACHABLE);
        assert_eq!(
            table.get(Location::Vertex(NodeIndex::new(3))),
            DestinationHeuristic::UNREACHABLE
        );
        assert_eq!(table.get(Location::Vertex(NodeIndex::new(0))), DestinationHeuristic::ZERO);
        assert_eq!(table.num_reachable_stops(), 1);
        assert_eq!(table.num_reachable_vertices(), 1);
    }

    #[test]
    fn prunes_when_bound_reaches_incumbent() {
        let table = table();
        let stop = Location::Stop(0);
        assert!(!table.prunes_time(stop, 1000, 1601));
        assert!(table.prunes_time(stop, 1000, 1600));
        assert!(table.prunes_transfers(stop, 2, 3));
        assert!(!table.prunes_cost(stop, 0, Cost::MAX));

        let best = Criteria::new(2000, 5, 5000);
        assert!(!table.can_prune(stop, Criteria::new(1000, 1, 1000), best));
        assert!(table.can_prune(stop, Criteria::new(1000, 1, 4300), best));
        assert!(!table.can_prune(stop, Criteria::default(), Criteria::UNBOUNDED));
    }

    #[test]
    fn unreachable_is_always_pruned() {
        let table = table();
        let dead_end = Location::Stop(1);
        assert!(table.can_prune(dead_end, Criteria::default(), Criteria::UNBOUNDED));
        assert!(table.prunes_time(dead_end, 0, Time::MAX));
    }
}
