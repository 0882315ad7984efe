use petgraph::graph::{EdgeIndex, NodeIndex};

use super::angle::{DegenerateSide, turn_angle};
use super::{TurnCostError, TurnType};
use crate::config::TurnCostConfig;
use crate::model::streets::{StreetEdge, StreetGraph};
use crate::{Cost, StreetMode};

/// Prices turns between adjacent street edges.
///
/// Holds only shared references to the graph and the configuration, so one
/// calculator can be copied into every search thread.
#[derive(Debug, Clone, Copy)]
pub struct TurnCostCalculator<'a> {
    streets: &'a StreetGraph,
    config: &'a TurnCostConfig,
}

impl<'a> TurnCostCalculator<'a> {
    pub fn new(streets: &'a StreetGraph, config: &'a TurnCostConfig) -> Self {
        Self { streets, config }
    }

    /// Turn angle in `[0, 2π)` from `incoming` onto `outgoing`; `π` is
    /// straight on, `(0, π)` a right turn and `(π, 2π)` a left turn.
    pub fn compute_angle(
        &self,
        incoming: EdgeIndex,
        outgoing: EdgeIndex,
    ) -> Result<f64, TurnCostError> {
        let (in_edge, out_edge) = self.adjacent_edges(incoming, outgoing)?;
        turn_angle(&in_edge.geometry, &out_edge.geometry).map_err(|side| match side {
            DegenerateSide::Incoming => TurnCostError::DegenerateGeometry(incoming),
            DegenerateSide::Outgoing => TurnCostError::DegenerateGeometry(outgoing),
        })
    }

    /// Geometric turn class, independent of the traffic side
    pub fn classify(
        &self,
        incoming: EdgeIndex,
        outgoing: EdgeIndex,
    ) -> Result<TurnType, TurnCostError> {
        let angle = self.compute_angle(incoming, outgoing)?;
        Ok(TurnType::from_angle(
            angle,
            self.config.straight_tolerance,
            self.config.u_turn_tolerance,
        ))
    }

    /// Penalty for turning from `incoming` onto `outgoing` in `mode`
    pub fn compute_turn_cost(
        &self,
        incoming: EdgeIndex,
        outgoing: EdgeIndex,
        mode: StreetMode,
    ) -> Result<Cost, TurnCostError> {
        let penalties = self.config.table.penalties(mode)?;
        if penalties.is_free() {
            // Adjacency is checked even when geometry is not read
            self.adjacent_edges(incoming, outgoing)?;
            return Ok(0);
        }

        let turn = self.classify(incoming, outgoing)?;
        // Under left-hand traffic the turn that crosses oncoming traffic is
        // the geometric right.
        let turn = if self.config.drive_on_right {
            turn
        } else {
            turn.mirrored()
        };
        Ok(penalties.get(turn))
    }

    /// Cheapest penalty of `mode`, zero when the mode has no table entry
    pub fn min_penalty(&self, mode: StreetMode) -> Cost {
        self.config
            .table
            .penalties(mode)
            .map_or(0, |penalties| penalties.min())
    }

    fn adjacent_edges(
        &self,
        incoming: EdgeIndex,
        outgoing: EdgeIndex,
    ) -> Result<(&'a StreetEdge, &'a StreetEdge), TurnCostError> {
        let (_, via) = self.endpoints(incoming)?;
        let (start, _) = self.endpoints(outgoing)?;
        if via != start {
            return Err(TurnCostError::DisconnectedEdges { incoming, outgoing });
        }
        let in_edge = self
            .streets
            .edge(incoming)
            .ok_or(TurnCostError::UnknownEdge(incoming.index()))?;
        let out_edge = self
            .streets
            .edge(outgoing)
            .ok_or(TurnCostError::UnknownEdge(outgoing.index()))?;
        Ok((in_edge, out_edge))
    }

    fn endpoints(&self, edge: EdgeIndex) -> Result<(NodeIndex, NodeIndex), TurnCostError> {
        self.streets
            .edge_endpoints(edge)
            .ok_or(TurnCostError::UnknownEdge(edge.index()))
    }
}
