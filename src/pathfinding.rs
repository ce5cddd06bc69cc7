//! Shortest paths over the station proximity graph.
//!
//! Both solvers work on solve-local scratch maps (best distance and
//! predecessor per station) created fresh for every call, so solves never
//! interfere with each other and a shared graph can serve concurrent
//! requests without locking.

use crate::StationId;
use crate::proximity_graph::StationGraph;
use ahash::AHashMap as HashMap;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoutingError {
    #[error("station {0} is not present in the graph")]
    UnknownStation(StationId),
    #[error("no path exists between station {from} and station {dest}")]
    NoPath { from: StationId, dest: StationId },
}

/// Relaxation strategy. Dijkstra is the default and is correct for the
/// non-negative Euclidean weights this graph carries; Bellman-Ford is kept
/// as a reference implementation that would also tolerate negative weights
/// from a future cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMethod {
    Dijkstra,
    BellmanFord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub stations: Vec<StationId>,
    pub total_distance: f64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct State {
    cost: OrderedFloat<f64>,
    node: StationId,
}

// The priority queue depends on `Ord`.
// Explicitly implement the trait so the queue becomes a min-heap instead of
// a max-heap. In case of a cost tie we compare station ids to keep
// `PartialEq` and `Ord` consistent.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The relaxation primitive shared by both solvers: improve `v` through the
/// edge `(u, v, weight)` if that makes `v` cheaper. Returns whether an
/// update occurred. Undirected edges are relaxed once per direction by the
/// callers.
fn relax(
    dist: &mut HashMap<StationId, f64>,
    prev: &mut HashMap<StationId, StationId>,
    u: StationId,
    v: StationId,
    weight: f64,
) -> bool {
    let through = *dist.get(&u).unwrap_or(&f64::INFINITY) + weight;
    if through < *dist.get(&v).unwrap_or(&f64::INFINITY) {
        dist.insert(v, through);
        prev.insert(v, u);
        true
    } else {
        false
    }
}

/// Computes the shortest path between two stations already present in the
/// graph (for a planning request, the two spliced query points).
///
/// Fails with [`RoutingError::UnknownStation`] if either endpoint is absent
/// and with [`RoutingError::NoPath`] if the endpoints sit in different
/// connected components; a partial path is never returned.
pub fn shortest_path(
    graph: &StationGraph,
    source: StationId,
    dest: StationId,
    method: RoutingMethod,
) -> Result<PlannedRoute, RoutingError> {
    if !graph.contains_station(source) {
        return Err(RoutingError::UnknownStation(source));
    }
    if !graph.contains_station(dest) {
        return Err(RoutingError::UnknownStation(dest));
    }

    let (dist, prev) = match method {
        RoutingMethod::Dijkstra => dijkstra(graph, source),
        RoutingMethod::BellmanFord => bellman_ford(graph, source),
    };

    reconstruct(&dist, &prev, source, dest)
}

type Scratch = (HashMap<StationId, f64>, HashMap<StationId, StationId>);

fn dijkstra(graph: &StationGraph, source: StationId) -> Scratch {
    let adjacency = graph.adjacency();
    let mut dist: HashMap<StationId, f64> = HashMap::new();
    let mut prev: HashMap<StationId, StationId> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0.0);
    heap.push(State {
        cost: OrderedFloat(0.0),
        node: source,
    });

    while let Some(State { cost, node }) = heap.pop() {
        // Stale entry: a cheaper route to this station was settled already.
        if cost.0 > *dist.get(&node).unwrap_or(&f64::INFINITY) {
            continue;
        }

        if let Some(incident) = adjacency.get(&node) {
            for &(neighbor, weight) in incident {
                if relax(&mut dist, &mut prev, node, neighbor, weight) {
                    heap.push(State {
                        cost: OrderedFloat(dist[&neighbor]),
                        node: neighbor,
                    });
                }
            }
        }
    }

    (dist, prev)
}

fn bellman_ford(graph: &StationGraph, source: StationId) -> Scratch {
    let mut dist: HashMap<StationId, f64> = HashMap::new();
    let mut prev: HashMap<StationId, StationId> = HashMap::new();

    dist.insert(source, 0.0);

    let passes = graph.station_count().saturating_sub(1);
    for _ in 0..passes {
        let mut updated = false;
        for (a, b, weight) in graph.edges() {
            // Undirected: try improving both endpoints.
            updated |= relax(&mut dist, &mut prev, a, b, weight);
            updated |= relax(&mut dist, &mut prev, b, a, weight);
        }
        if !updated {
            break;
        }
    }

    (dist, prev)
}

/// Walks predecessor links back from the destination. Reaching a station
/// with no predecessor that is not the source means the destination was
/// never relaxed from the source's component.
fn reconstruct(
    dist: &HashMap<StationId, f64>,
    prev: &HashMap<StationId, StationId>,
    source: StationId,
    dest: StationId,
) -> Result<PlannedRoute, RoutingError> {
    let Some(&total_distance) = dist.get(&dest) else {
        return Err(RoutingError::NoPath { from: source, dest });
    };

    let mut stations = vec![dest];
    let mut current = dest;
    while let Some(&predecessor) = prev.get(&current) {
        stations.push(predecessor);
        current = predecessor;
    }

    if current != source {
        return Err(RoutingError::NoPath { from: source, dest });
    }

    stations.reverse();
    Ok(PlannedRoute {
        stations,
        total_distance,
    })
}
