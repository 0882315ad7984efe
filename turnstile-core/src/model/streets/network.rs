//! Street graph: a petgraph arena of vertices and directed edges plus an
//! R-tree used to snap coordinates to vertices.

use geo::{Distance, Haversine, LineString, Point};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::components::{ModePermissions, StreetEdge, StreetNode};
use crate::Error;

/// Vertex position stored in the spatial index as `[lon, lat]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    coords: [f64; 2],
    node: NodeIndex,
}

impl IndexedPoint {
    pub fn node(&self) -> NodeIndex {
        self.node
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for IndexedPoint {
    // Planar distance in degrees, only used for ranking candidates
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.coords[0] - point[0];
        let dy = self.coords[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Directed street network
///
/// Edges are addressed by [`EdgeIndex`] and vertices by [`NodeIndex`];
/// adjacency lives inside the petgraph arena, so nothing holds owning
/// references back into the graph.
#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    pub(crate) graph: DiGraph<StreetNode, StreetEdge>,
    index: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex at `geometry` (x = lon, y = lat)
    pub fn add_node(&mut self, geometry: Point<f64>) -> NodeIndex {
        let node = self.graph.add_node(StreetNode { geometry });
        self.index.insert(IndexedPoint {
            coords: [geometry.x(), geometry.y()],
            node,
        });
        node
    }

    /// Adds a straight directed edge; its length is the great-circle distance
    /// between the endpoints.
    pub fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        permissions: ModePermissions,
    ) -> Result<EdgeIndex, Error> {
        let start = self.node_point(from)?;
        let end = self.node_point(to)?;
        let geometry = LineString::from(vec![start.0, end.0]);
        let length_m = Haversine.distance(start, end);
        self.add_edge_with_geometry(from, to, geometry, length_m, permissions)
    }

    /// Adds a directed edge with explicit geometry, oriented from `from` to `to`
    pub fn add_edge_with_geometry(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        geometry: LineString<f64>,
        length_m: f64,
        permissions: ModePermissions,
    ) -> Result<EdgeIndex, Error> {
        self.node_point(from)?;
        self.node_point(to)?;
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(Error::InvalidData(format!(
                "edge length must be a non-negative number, got {length_m}"
            )));
        }
        Ok(self.graph.add_edge(
            from,
            to,
            StreetEdge {
                length_m,
                permissions,
                geometry,
            },
        ))
    }

    /// Adds a two-way street as a forward edge and its reverse.
    /// The returned pair is `(a -> b, b -> a)`.
    pub fn add_street_pair(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        permissions: ModePermissions,
    ) -> Result<(EdgeIndex, EdgeIndex), Error> {
        let forward = self.add_edge(a, b, permissions)?;
        let backward = self.add_edge(b, a, permissions)?;
        Ok((forward, backward))
    }

    fn node_point(&self, node: NodeIndex) -> Result<Point<f64>, Error> {
        self.graph
            .node_weight(node)
            .map(|n| n.geometry)
            .ok_or(Error::InvalidNodeIndex)
    }

    pub fn node(&self, node: NodeIndex) -> Option<&StreetNode> {
        self.graph.node_weight(node)
    }

    pub fn edge(&self, edge: EdgeIndex) -> Option<&StreetEdge> {
        self.graph.edge_weight(edge)
    }

    /// `(origin, destination)` of a directed edge
    pub fn edge_endpoints(&self, edge: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(edge)
    }

    pub fn out_edges(&self, node: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, StreetEdge>> {
        self.graph.edges_directed(node, Direction::Outgoing)
    }

    pub fn in_edges(&self, node: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, StreetEdge>> {
        self.graph.edges_directed(node, Direction::Incoming)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nearest vertex to `point` with its great-circle distance in metres
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let nearest = self.index.nearest_neighbor(&[point.x(), point.y()])?;
        let geometry = self.graph.node_weight(nearest.node)?.geometry;
        Some((nearest.node, Haversine.distance(*point, geometry)))
    }
}
