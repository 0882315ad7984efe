use log::{info, trace};
use petgraph::graph::NodeIndex;

use super::streets::StreetGraph;
use super::transit::{PublicTransitData, RaptorStopId};
use crate::Error;

#[derive(Debug, Clone, Default)]
pub struct TransitModelMeta {
    /// Stops farther than this from any vertex are left unlinked
    pub max_snap_distance_m: f64,
}

/// Street network plus public transit, shared read-only by every request
#[derive(Debug, Clone)]
pub struct TransitModel {
    pub street_graph: StreetGraph,
    pub transit_data: PublicTransitData,
    pub meta: TransitModelMeta,
}

impl TransitModel {
    pub fn new(street_graph: StreetGraph, transit_data: PublicTransitData) -> Self {
        Self {
            street_graph,
            transit_data,
            meta: TransitModelMeta {
                max_snap_distance_m: 100.0,
            },
        }
    }

    /// Links a stop to an explicit street vertex
    pub fn link_stop(&mut self, stop: RaptorStopId, node: NodeIndex) -> Result<(), Error> {
        if self.street_graph.node(node).is_none() {
            return Err(Error::InvalidNodeIndex);
        }
        let slot = self
            .transit_data
            .stop_nodes
            .get_mut(stop)
            .ok_or_else(|| Error::InvalidData(format!("unknown stop {stop}")))?;
        *slot = Some(node);
        Ok(())
    }

    /// Snaps every stop to its nearest street vertex. Stops farther than
    /// `meta.max_snap_distance_m` stay unlinked and can only be reached
    /// through transit. Returns the number of linked stops.
    pub fn link_stops_to_nearest(&mut self) -> usize {
        let max_distance = self.meta.max_snap_distance_m;
        let snapped: Vec<Option<NodeIndex>> = self
            .transit_data
            .stops
            .iter()
            .map(|stop| match self.street_graph.nearest_node(&stop.geometry) {
                Some((node, distance)) if distance <= max_distance => Some(node),
                Some((_, distance)) => {
                    trace!(
                        "Stop {} is {distance:.0} m from the nearest street (max: {max_distance} m) - leaving unlinked",
                        stop.stop_id
                    );
                    None
                }
                None => None,
            })
            .collect();

        let linked = snapped.iter().flatten().count();
        self.transit_data.stop_nodes = snapped;

        info!(
            "Linked {linked} of {} stops to the street network",
            self.transit_data.stops.len()
        );
        linked
    }
}
