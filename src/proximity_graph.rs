//! Assembly of the station proximity graph: the union of every station's
//! k-nearest-neighbor star, plus splicing of the two ad-hoc endpoints of a
//! planning request.

use crate::spatial_index::{SpatialError, SpatialIndex};
use crate::{StationId, StationRecord};
use ahash::AHashMap;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error("query point id {0} already exists in the graph")]
    QueryPointCollision(StationId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphNode {
    pub x: f64,
    pub y: f64,
}

/// Undirected weighted station graph.
///
/// Edges are keyed by the unordered id pair, stored smaller-first.
/// Re-inserting a pair overwrites the weight, so the duplicate discoveries
/// that arise when two stations each find the other among their nearest
/// neighbors collapse into a single edge. Node coordinates are immutable
/// once a node exists; edge weights equal the Euclidean distance between
/// the endpoints at insertion time.
#[derive(Debug, Clone, Default)]
pub struct StationGraph {
    nodes: AHashMap<StationId, GraphNode>,
    edges: AHashMap<(StationId, StationId), f64>,
}

impl StationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn edge_key(a: StationId, b: StationId) -> (StationId, StationId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn add_station(&mut self, id: StationId, x: f64, y: f64) {
        self.nodes.insert(id, GraphNode { x, y });
    }

    pub fn add_edge(&mut self, a: StationId, b: StationId, weight: f64) {
        self.edges.insert(Self::edge_key(a, b), weight);
    }

    pub fn station(&self, id: StationId) -> Option<GraphNode> {
        self.nodes.get(&id).copied()
    }

    pub fn contains_station(&self, id: StationId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn station_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_weight(&self, a: StationId, b: StationId) -> Option<f64> {
        self.edges.get(&Self::edge_key(a, b)).copied()
    }

    pub fn stations(&self) -> impl Iterator<Item = (StationId, GraphNode)> + '_ {
        self.nodes.iter().map(|(&id, &node)| (id, node))
    }

    pub fn edges(&self) -> impl Iterator<Item = (StationId, StationId, f64)> + '_ {
        self.edges.iter().map(|(&(a, b), &weight)| (a, b, weight))
    }

    /// Per-station incident edge lists, derived from the edge map on demand.
    /// Every station is present, including isolated ones.
    pub fn adjacency(&self) -> AHashMap<StationId, Vec<(StationId, f64)>> {
        let mut adjacency: AHashMap<StationId, Vec<(StationId, f64)>> =
            AHashMap::with_capacity(self.nodes.len());
        for &id in self.nodes.keys() {
            adjacency.entry(id).or_default();
        }
        for (&(a, b), &weight) in &self.edges {
            adjacency.entry(a).or_default().push((b, weight));
            adjacency.entry(b).or_default().push((a, weight));
        }
        adjacency
    }
}

/// Builds the proximity graph over every station held by the index.
///
/// Each station queries for `k + 1` neighbors and discards itself before
/// taking `k` — the index does not deduplicate by identity, so a station
/// always finds itself at distance zero. Discovery is asymmetric (A finding
/// B does not force B to find A) but storage is undirected, so a single
/// discovery already connects both endpoints. The result can be
/// disconnected when clusters sit further apart than their members' k-th
/// neighbors.
pub fn build_proximity_graph(index: &SpatialIndex, k: usize) -> Result<StationGraph, GraphError> {
    if k == 0 {
        return Err(SpatialError::InvalidNeighborCount.into());
    }

    let mut graph = StationGraph::new();
    for record in index.points() {
        graph.add_station(record.id, record.x, record.y);
    }

    for record in index.points() {
        let neighbors = index.nearest_k((record.x, record.y), k + 1)?;
        for neighbor in neighbors.into_iter().filter(|n| n.id != record.id).take(k) {
            graph.add_edge(record.id, neighbor.id, neighbor.distance);
        }
    }

    info!(
        stations = graph.station_count(),
        edges = graph.edge_count(),
        k,
        "proximity graph assembled"
    );

    Ok(graph)
}

/// Splices the two ad-hoc endpoints of a planning request into an existing
/// graph.
///
/// Each endpoint is resolved independently against the index built over the
/// original stations, so the endpoints gain edges only to indexed stations —
/// never to each other, even when they are mutually nearest. The graph ends
/// up with exactly two more nodes than stations.
pub fn insert_query_points(
    graph: &mut StationGraph,
    index: &SpatialIndex,
    endpoints: &[StationRecord; 2],
    k: usize,
) -> Result<(), GraphError> {
    if endpoints[0].id == endpoints[1].id {
        return Err(GraphError::QueryPointCollision(endpoints[1].id));
    }
    for endpoint in endpoints {
        if graph.contains_station(endpoint.id) {
            return Err(GraphError::QueryPointCollision(endpoint.id));
        }
    }

    for endpoint in endpoints {
        let neighbors = index.nearest_k((endpoint.x, endpoint.y), k)?;
        graph.add_station(endpoint.id, endpoint.x, endpoint.y);
        for neighbor in neighbors {
            graph.add_edge(endpoint.id, neighbor.id, neighbor.distance);
        }
    }

    Ok(())
}
