use std::cmp::Ordering;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::{Cost, Time};

/// Edge-based label of the turn-aware search
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct EdgeState {
    pub(super) cost: Cost,
    pub(super) time: Time,
    pub(super) edge: EdgeIndex,
}

// Min-heap by cost, then time
impl Ord for EdgeState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.time.cmp(&self.time))
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

impl PartialOrd for EdgeState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Vertex label of the reverse walk, ordered by time
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct NodeState {
    pub(super) time: Time,
    pub(super) cost: Cost,
    pub(super) node: NodeIndex,
}

impl Ord for NodeState {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for NodeState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
