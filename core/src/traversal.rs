use std::collections::VecDeque;
use std::time::Instant;

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::key::{CompositeKey, VertexId};

/// Distance recorded for a vertex the traversal never reached.
pub const UNREACHED: i64 = -1;

/// Lifecycle of a [`Traversal`]. `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    Unrun,
    Done,
}

/// Single-source BFS over a [`Graph`], computing hop-count distances and
/// reachability.
///
/// A traversal runs exactly once. Its result arrays are sized from the graph
/// when built and never reset, so a second `run` is rejected instead of
/// mixing two sources' results. Build a new `Traversal` for another source.
///
/// Queries resolve keys through the graph's registry with the graph's
/// lookup policy. Under `LookupPolicy::Allocate`, asking about a key that
/// was never inserted registers it and answers "unreached", so `-1`/`false`
/// does not prove the vertex was known beforehand.
#[derive(Debug)]
pub struct Traversal<'g> {
    graph: &'g Graph,
    dist: Vec<i64>,
    visited: Vec<bool>,
    /// BFS tree: the vertex each visited vertex was discovered from.
    parent: Vec<Option<VertexId>>,
    source: Option<VertexId>,
    state: TraversalState,
}

impl<'g> Traversal<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            dist: vec![UNREACHED; n],
            visited: vec![false; n],
            parent: vec![None; n],
            source: None,
            state: TraversalState::Unrun,
        }
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// The key the traversal ran from, once it has run.
    pub fn source(&self) -> Option<CompositeKey> {
        self.source.and_then(|id| self.graph.registry().key_of(id))
    }

    /// Run BFS from `source`.
    ///
    /// Fails with `TraversalReused` if this instance already ran. A source
    /// rejected by the lookup policy leaves the traversal unrun.
    pub fn run(&mut self, source: impl Into<CompositeKey>) -> Result<()> {
        let key = source.into();
        if self.state != TraversalState::Unrun {
            let start = self.source().unwrap_or(key);
            tracing::warn!(%start, requested = %key, "traversal reused");
            return Err(GraphError::TraversalReused { start });
        }

        let start = self.graph.resolve(key)?;
        self.source = Some(start);

        // Allocating lookups may have grown the registry since construction.
        let n = self.graph.node_count();
        if self.dist.len() < n {
            self.dist.resize(n, UNREACHED);
            self.visited.resize(n, false);
            self.parent.resize(n, None);
        }

        let t = Instant::now();
        tracing::debug!(source = %key, id = start, "bfs started");

        let graph = self.graph;
        let mut queue: VecDeque<VertexId> = VecDeque::new();
        self.visited[start as usize] = true;
        self.dist[start as usize] = 0;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let next_dist = self.dist[current as usize] + 1;
            for edge in graph.neighbors_by_id(current) {
                let next = edge.target as usize;
                if !self.visited[next] {
                    self.visited[next] = true;
                    self.dist[next] = next_dist;
                    self.parent[next] = Some(current);
                    queue.push_back(edge.target);
                }
            }
        }

        self.state = TraversalState::Done;
        tracing::debug!(
            source = %key,
            visited = self.nodes_visited(),
            elapsed_us = t.elapsed().as_micros() as u64,
            "bfs finished"
        );
        Ok(())
    }

    fn slot(&self, key: impl Into<CompositeKey>) -> Result<usize> {
        self.graph.resolve(key).map(|id| id as usize)
    }

    /// Hop count from the source to `target`, or [`UNREACHED`] (-1).
    pub fn min_dist(&self, target: impl Into<CompositeKey>) -> Result<i64> {
        let slot = self.slot(target)?;
        Ok(self.dist.get(slot).copied().unwrap_or(UNREACHED))
    }

    pub fn is_visited(&self, target: impl Into<CompositeKey>) -> Result<bool> {
        let slot = self.slot(target)?;
        Ok(self.visited.get(slot).copied().unwrap_or(false))
    }

    /// [`min_dist`](Self::min_dist) with `None` in place of the sentinel.
    pub fn distance(&self, target: impl Into<CompositeKey>) -> Result<Option<u32>> {
        let d = self.min_dist(target)?;
        Ok(u32::try_from(d).ok())
    }

    /// One shortest path from the source to `target`, both endpoints
    /// included. `None` if `target` was not reached.
    ///
    /// Ties are broken by adjacency insertion order: the path follows the
    /// edge through which BFS first discovered each vertex.
    pub fn path_to(&self, target: impl Into<CompositeKey>) -> Result<Option<Vec<CompositeKey>>> {
        let slot = self.slot(target)?;
        if !self.visited.get(slot).copied().unwrap_or(false) {
            return Ok(None);
        }

        let mut ids = vec![slot as VertexId];
        let mut current = slot;
        while let Some(p) = self.parent[current] {
            ids.push(p);
            current = p as usize;
        }

        let registry = self.graph.registry();
        Ok(ids
            .into_iter()
            .rev()
            .map(|id| registry.key_of(id))
            .collect::<Option<Vec<_>>>())
    }

    /// Every reached vertex with its distance, nearest first, ties in id order.
    pub fn reached(&self) -> Vec<(CompositeKey, u32)> {
        let registry = self.graph.registry();
        // ids come out ascending, so a stable sort by distance keeps id order
        let mut out: Vec<(CompositeKey, u32)> = self
            .visited
            .iter()
            .enumerate()
            .filter(|&(_, &seen)| seen)
            .filter_map(|(id, _)| {
                let key = registry.key_of(id as VertexId)?;
                Some((key, self.dist[id] as u32))
            })
            .collect();
        out.sort_by_key(|&(_, d)| d);
        out
    }

    pub fn nodes_visited(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }
}
