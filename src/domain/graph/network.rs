//! Weighted algorithms: shortest path, spanning trees, PERT and CPM.
//!
//! Edges without a weight count as [`DEFAULT_WEIGHT`](super::store::DEFAULT_WEIGHT).

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use serde::Serialize;
use tracing::{debug, instrument};

use super::store::{Edge, Graph};
use super::union_find::UnionFind;
use crate::domain::error::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    pub distance: f64,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    pub length: f64,
    pub path: Vec<String>,
}

/// Forward pass of the longest-path computation over a DAG.
struct Schedule {
    order: Vec<Index>,
    finish: HashMap<Index, f64>,
    via: HashMap<Index, Index>,
}

impl<N, E> Graph<N, E> {
    /// Dijkstra with a linear minimum scan.
    ///
    /// `Ok(None)` when either endpoint is unknown or `target` is unreachable.
    /// Negative weights are rejected up front.
    #[instrument(level = "debug", skip(self))]
    pub fn shortest_path(&self, source: &str, target: &str) -> DomainResult<Option<ShortestPath>> {
        if let Some(edge) = self.edges().find(|e| e.cost() < 0.0) {
            let (s, t) = self.endpoints(edge);
            return Err(DomainError::NegativeWeight {
                source_name: s.to_string(),
                target_name: t.to_string(),
                weight: edge.cost(),
            });
        }
        let (Some(from), Some(to)) = (self.index_of(source), self.index_of(target)) else {
            return Ok(None);
        };

        let order = self.node_indices();
        let mut dist: HashMap<Index, f64> = order.iter().map(|&i| (i, f64::INFINITY)).collect();
        let mut prev: HashMap<Index, Index> = HashMap::new();
        let mut settled: HashSet<Index> = HashSet::new();
        dist.insert(from, 0.0);

        loop {
            let current = order
                .iter()
                .copied()
                .filter(|i| !settled.contains(i) && dist[i].is_finite())
                .min_by(|a, b| dist[a].total_cmp(&dist[b]));
            let Some(current) = current else { break };
            if current == to {
                break;
            }
            settled.insert(current);

            for edge in self.out_edges(current) {
                let candidate = dist[&current] + edge.cost();
                if candidate < dist[&edge.target()] {
                    dist.insert(edge.target(), candidate);
                    prev.insert(edge.target(), current);
                }
            }
        }

        let distance = dist[&to];
        if !distance.is_finite() {
            return Ok(None);
        }
        let mut path = vec![to];
        let mut cursor = to;
        while let Some(&p) = prev.get(&cursor) {
            path.push(p);
            cursor = p;
        }
        path.reverse();
        Ok(Some(ShortestPath {
            distance,
            path: self.names_of(&path),
        }))
    }

    /// Kruskal over the undirected view.
    ///
    /// Of two opposite edges between the same pair only the lighter one is a
    /// candidate. Ties keep edge order, so the result is deterministic.
    #[instrument(level = "debug", skip(self))]
    pub fn minimum_spanning_tree(&self) -> Vec<&Edge<E>> {
        let position: HashMap<Index, usize> = self
            .node_indices()
            .into_iter()
            .enumerate()
            .map(|(pos, idx)| (idx, pos))
            .collect();

        let mut candidates: Vec<&Edge<E>> = Vec::new();
        let mut by_pair: HashMap<(usize, usize), usize> = HashMap::new();
        for edge in self.edges() {
            let (a, b) = (position[&edge.source()], position[&edge.target()]);
            let pair = (a.min(b), a.max(b));
            match by_pair.get(&pair) {
                Some(&slot) if candidates[slot].cost() <= edge.cost() => {}
                Some(&slot) => candidates[slot] = edge,
                None => {
                    by_pair.insert(pair, candidates.len());
                    candidates.push(edge);
                }
            }
        }
        candidates.sort_by(|a, b| a.cost().total_cmp(&b.cost()));

        let mut sets = UnionFind::new(position.len());
        let mut tree = Vec::new();
        for edge in candidates {
            if sets.count() <= 1 {
                break;
            }
            if sets.union(position[&edge.source()], position[&edge.target()]) {
                tree.push(edge);
            }
        }
        debug!(edges = tree.len(), "spanning forest built");
        tree
    }

    /// Prim's algorithm from `start` (or the first node), edges undirected.
    ///
    /// Spans only the component containing the start node. An unknown start
    /// gives an empty tree.
    pub fn prim(&self, start: Option<&str>) -> Vec<&Edge<E>> {
        let start = match start {
            Some(name) => self.index_of(name),
            None => self.node_indices().first().copied(),
        };
        let Some(start) = start else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut frontier: Vec<&Edge<E>> = self.incident_edges(start).collect();
        frontier.sort_by(|a, b| a.cost().total_cmp(&b.cost()));
        let mut tree = Vec::new();

        loop {
            frontier.retain(|e| !(visited.contains(&e.source()) && visited.contains(&e.target())));
            if frontier.is_empty() {
                break;
            }
            let edge = frontier.remove(0);
            let next = if visited.contains(&edge.source()) {
                edge.target()
            } else {
                edge.source()
            };
            visited.insert(next);
            tree.push(edge);
            frontier.extend(self.incident_edges(next));
            frontier.sort_by(|a, b| a.cost().total_cmp(&b.cost()));
        }
        tree
    }

    /// Earliest finish time of every node, in topological order.
    ///
    /// Empty when the graph has a cycle.
    pub fn pert(&self) -> Vec<(String, f64)> {
        let Some(schedule) = self.schedule() else {
            return Vec::new();
        };
        schedule
            .order
            .iter()
            .map(|idx| (self.name_of(*idx).to_string(), schedule.finish[idx]))
            .collect()
    }

    /// Longest path through the DAG. `None` for an empty or cyclic graph.
    pub fn cpm(&self) -> Option<CriticalPath> {
        let schedule = self.schedule()?;
        let mut end: Option<Index> = None;
        for &idx in &schedule.order {
            match end {
                Some(best) if schedule.finish[&best] >= schedule.finish[&idx] => {}
                _ => end = Some(idx),
            }
        }
        let end = end?;

        let mut path = vec![end];
        let mut cursor = end;
        while let Some(&p) = schedule.via.get(&cursor) {
            path.push(p);
            cursor = p;
        }
        path.reverse();
        Some(CriticalPath {
            length: schedule.finish[&end],
            path: self.names_of(&path),
        })
    }

    fn schedule(&self) -> Option<Schedule> {
        let order = self.topological_indices()?;
        let mut finish: HashMap<Index, f64> = HashMap::with_capacity(order.len());
        let mut via: HashMap<Index, Index> = HashMap::new();

        for &idx in &order {
            let mut best: Option<(f64, Index)> = None;
            for edge in self.in_edges(idx) {
                let candidate = finish[&edge.source()] + edge.cost();
                if best.map_or(true, |(b, _)| candidate > b) {
                    best = Some((candidate, edge.source()));
                }
            }
            match best {
                Some((time, pred)) => {
                    finish.insert(idx, time);
                    via.insert(idx, pred);
                }
                None => {
                    finish.insert(idx, 0.0);
                }
            }
        }
        Some(Schedule { order, finish, via })
    }
}
