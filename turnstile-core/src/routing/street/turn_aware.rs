use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::{debug, trace};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::state::EdgeState;
use crate::heuristic::{HeuristicTable, Location};
use crate::routing::raptor::AccessLeg;
use crate::turns::{TurnCostCalculator, TurnCostError};
use crate::{Cost, PublicTransitData, SearchConfig, StreetMode, Time, TransitModel};

/// Bounds on a single street search
#[derive(Debug, Clone, Copy)]
pub struct StreetSearchLimits<'h> {
    pub max_time: Time,
    pub max_cost: Option<Cost>,
    /// Destination bounds and the best known cost to the destination;
    /// vertices that cannot improve on it are not entered.
    pub heuristic: Option<(&'h HeuristicTable, Cost)>,
}

impl StreetSearchLimits<'_> {
    pub fn with_max_time(max_time: Time) -> Self {
        Self {
            max_time,
            max_cost: None,
            heuristic: None,
        }
    }
}

/// Cheapest way found to reach a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreetLabel {
    pub cost: Cost,
    pub time: Time,
}

#[derive(Debug, Clone, Default)]
pub struct StreetSearchResult {
    labels: HashMap<NodeIndex, StreetLabel>,
    /// Expansions dropped by the heuristic
    pub pruned: usize,
    /// Transitions skipped because of degenerate geometry
    pub skipped_turns: usize,
}

impl StreetSearchResult {
    pub fn label(&self, node: NodeIndex) -> Option<StreetLabel> {
        self.labels.get(&node).copied()
    }

    pub fn num_reached(&self) -> usize {
        self.labels.len()
    }

    /// Legs to every stop linked to a reached vertex, ordered by stop
    pub fn access_legs(&self, data: &PublicTransitData) -> Vec<AccessLeg> {
        let mut legs: Vec<AccessLeg> = (0..data.num_stops())
            .filter_map(|stop| {
                let label = self.label(data.stop_node(stop)?)?;
                Some(AccessLeg {
                    stop,
                    duration: label.time,
                    cost: label.cost,
                })
            })
            .collect();
        legs.sort_by_key(|leg| leg.stop);
        legs
    }
}

/// Edge-based Dijkstra from `origin` in `mode`, ordered by generalized
/// cost. Every edge-to-edge transition pays its turn penalty.
///
/// A transition whose geometry is degenerate is skipped; any other turn
/// cost error aborts the search.
pub fn turn_aware_search(
    model: &TransitModel,
    calculator: &TurnCostCalculator<'_>,
    config: &SearchConfig,
    origin: NodeIndex,
    mode: StreetMode,
    limits: &StreetSearchLimits<'_>,
) -> Result<StreetSearchResult, TurnCostError> {
    let streets = &model.street_graph;
    let mut result = StreetSearchResult::default();
    if streets.node(origin).is_none() {
        debug!("Origin vertex {} is not in the street graph", origin.index());
        return Ok(result);
    }
    result.labels.insert(origin, StreetLabel { cost: 0, time: 0 });

    let mut best: HashMap<EdgeIndex, Cost> = HashMap::new();
    let mut heap = BinaryHeap::new();

    let relax = |best: &mut HashMap<EdgeIndex, Cost>,
                 heap: &mut BinaryHeap<EdgeState>,
                 pruned: &mut usize,
                 state: EdgeState,
                 target: NodeIndex| {
        if state.time > limits.max_time || limits.max_cost.is_some_and(|max| state.cost > max) {
            return;
        }
        if let Some((table, best_cost)) = limits.heuristic {
            if table.prunes_cost(Location::Vertex(target), state.cost, best_cost) {
                *pruned += 1;
                return;
            }
        }
        match best.entry(state.edge) {
            Entry::Vacant(entry) => {
                entry.insert(state.cost);
                heap.push(state);
            }
            Entry::Occupied(mut entry) => {
                if state.cost < *entry.get() {
                    *entry.get_mut() = state.cost;
                    heap.push(state);
                }
            }
        }
    };

    for edge in streets.out_edges(origin) {
        if !edge.weight().allows(mode) {
            continue;
        }
        let time = edge.weight().traversal_time(mode, &config.speeds);
        let state = EdgeState {
            cost: config.cost_model.street_cost(mode, time),
            time,
            edge: edge.id(),
        };
        relax(&mut best, &mut heap, &mut result.pruned, state, edge.target());
    }

    while let Some(EdgeState { cost, time, edge }) = heap.pop() {
        if best.get(&edge).is_some_and(|&b| cost > b) {
            continue;
        }
        let Some((_, via)) = streets.edge_endpoints(edge) else {
            return Err(TurnCostError::UnknownEdge(edge.index()));
        };
        match result.labels.entry(via) {
            Entry::Vacant(entry) => {
                entry.insert(StreetLabel { cost, time });
            }
            Entry::Occupied(mut entry) => {
                if cost < entry.get().cost {
                    *entry.get_mut() = StreetLabel { cost, time };
                }
            }
        }

        for next in streets.out_edges(via) {
            if !next.weight().allows(mode) {
                continue;
            }
            let turn = match calculator.compute_turn_cost(edge, next.id(), mode) {
                Ok(turn) => turn,
                Err(TurnCostError::DegenerateGeometry(degenerate)) => {
                    debug!(
                        "Skipping turn {} -> {}: edge {} has degenerate geometry",
                        edge.index(),
                        next.id().index(),
                        degenerate.index()
                    );
                    result.skipped_turns += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };
            let edge_time = next.weight().traversal_time(mode, &config.speeds);
            let next_time = time.saturating_add(edge_time);
            let state = EdgeState {
                cost: cost
                    .saturating_add(config.cost_model.street_cost(mode, edge_time))
                    .saturating_add(turn),
                time: next_time,
                edge: next.id(),
            };
            relax(&mut best, &mut heap, &mut result.pruned, state, next.target());
        }
    }

    trace!(
        "Turn-aware {mode} search from {}: {} vertices reached, {} pruned",
        origin.index(),
        result.labels.len(),
        result.pruned
    );
    Ok(result)
}
