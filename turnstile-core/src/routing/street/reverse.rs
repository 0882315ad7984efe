use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::trace;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::state::NodeState;
use crate::heuristic::EgressLeg;
use crate::{Cost, SearchConfig, Time, TransitModel};

/// Reverse Dijkstra from a destination vertex, limited to `max_egress_time`.
/// Egress legs use `config.access_mode`, the same mode as access legs, so a
/// car request also drives its last leg.
///
/// Returns one egress leg per linked stop that can reach the destination,
/// ordered by stop; the leg cost is accumulated edge by edge along the
/// fastest path.
pub fn reverse_egress_search(
    model: &TransitModel,
    config: &SearchConfig,
    destination: NodeIndex,
) -> Vec<EgressLeg> {
    let streets = &model.street_graph;
    if streets.node(destination).is_none() {
        return Vec::new();
    }
    let mode = config.access_mode;
    let mut labels: HashMap<NodeIndex, (Time, Cost)> = HashMap::new();
    let mut heap = BinaryHeap::new();

    labels.insert(destination, (0, 0));
    heap.push(NodeState {
        time: 0,
        cost: 0,
        node: destination,
    });

    while let Some(NodeState { time, cost, node }) = heap.pop() {
        if labels.get(&node).is_some_and(|&(best, _)| time > best) {
            continue;
        }
        for edge in streets.in_edges(node) {
            if !edge.weight().allows(mode) {
                continue;
            }
            let edge_time = edge.weight().traversal_time(mode, &config.speeds);
            let next_time = time.saturating_add(edge_time);
            if next_time > config.max_egress_time {
                continue;
            }
            let next_cost = cost.saturating_add(config.cost_model.street_cost(mode, edge_time));
            let next = NodeState {
                time: next_time,
                cost: next_cost,
                node: edge.source(),
            };
            match labels.entry(edge.source()) {
                Entry::Vacant(entry) => {
                    entry.insert((next_time, next_cost));
                    heap.push(next);
                }
                Entry::Occupied(mut entry) => {
                    if next_time < entry.get().0 {
                        *entry.get_mut() = (next_time, next_cost);
                        heap.push(next);
                    }
                }
            }
        }
    }

    let data = &model.transit_data;
    let mut legs: Vec<EgressLeg> = (0..data.num_stops())
        .filter_map(|stop| {
            let &(duration, cost) = labels.get(&data.stop_node(stop)?)?;
            Some(EgressLeg {
                stop,
                duration,
                cost,
            })
        })
        .collect();
    legs.sort_by_key(|leg| leg.stop);

    trace!(
        "Reverse {mode} search to {}: {} vertices, {} egress stops",
        destination.index(),
        labels.len(),
        legs.len()
    );
    legs
}
