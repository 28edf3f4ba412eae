use crate::config::{GraphConfig, LookupPolicy};
use crate::error::{GraphError, Result};
use crate::key::{CompositeKey, KeyRegistry, VertexId};

/// An adjacency entry: the neighbor's dense id and the edge weight.
///
/// The weight is carried for callers; traversal never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: VertexId,
    pub weight: i64,
}

/// In-memory graph: adjacency lists indexed by dense id + the key registry
/// that hands those ids out.
///
/// Undirected graphs store every edge twice, once from each endpoint. The
/// two entries are independent; nothing deduplicates self-loops or
/// parallel edges.
#[derive(Debug, Default)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    registry: KeyRegistry,
    config: GraphConfig,
}

impl Graph {
    pub fn new(is_directed: bool) -> Self {
        Self::with_config(GraphConfig {
            directed: is_directed,
            ..GraphConfig::default()
        })
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Storage grows as vertices arrive; `config.capacity` only limits ids.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            adjacency: Vec::new(),
            registry: KeyRegistry::new(),
            config,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.config.directed
    }

    pub fn capacity(&self) -> Option<usize> {
        self.config.capacity
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Resolve a key to its dense id, honoring the configured lookup policy.
    ///
    /// Under `LookupPolicy::Allocate` an unseen key gets a fresh id with no
    /// edges. Under `LookupPolicy::Strict` it is rejected.
    pub fn resolve(&self, key: impl Into<CompositeKey>) -> Result<VertexId> {
        let key = key.into();
        match self.config.lookup {
            LookupPolicy::Allocate => self.intern(key),
            LookupPolicy::Strict => self
                .registry
                .lookup(key)
                .ok_or(GraphError::UnknownVertex(key)),
        }
    }

    /// Register `key` unless that would take the graph past its capacity.
    /// A rejected key is never registered.
    fn intern(&self, key: CompositeKey) -> Result<VertexId> {
        self.registry
            .id_within(key, self.config.capacity)
            .inspect_err(|e| {
                if let GraphError::CapacityExceeded { id, capacity } = e {
                    tracing::warn!(%key, id, capacity, "vertex exceeds graph capacity");
                }
            })
    }

    fn ensure_slot(&mut self, id: VertexId) {
        let needed = id as usize + 1;
        if self.adjacency.len() < needed {
            self.adjacency.resize_with(needed, Vec::new);
        }
    }

    /// Register a vertex without any edges.
    pub fn add_vertex(&mut self, key: impl Into<CompositeKey>) -> Result<VertexId> {
        let id = self.intern(key.into())?;
        self.ensure_slot(id);
        Ok(id)
    }

    /// Add an edge between `from` and `to`. Undirected graphs also get the
    /// reverse entry with the same weight.
    ///
    /// Endpoints are always registered, whatever the lookup policy: insertion
    /// is how vertices come into existence.
    pub fn add_edge(
        &mut self,
        from: impl Into<CompositeKey>,
        to: impl Into<CompositeKey>,
        weight: i64,
    ) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        let u = self.intern(from)?;
        let v = self.intern(to)?;
        self.ensure_slot(u.max(v));

        self.adjacency[u as usize].push(Edge { target: v, weight });
        if !self.config.directed {
            self.adjacency[v as usize].push(Edge { target: u, weight });
        }
        tracing::trace!(%from, %to, weight, "edge added");
        Ok(())
    }

    /// Bulk insert. Stops at the first failing edge; edges before it stay.
    pub fn add_edges<K, I>(&mut self, edges: I) -> Result<()>
    where
        K: Into<CompositeKey>,
        I: IntoIterator<Item = (K, K, i64)>,
    {
        for (from, to, weight) in edges {
            self.add_edge(from, to, weight)?;
        }
        tracing::debug!(
            nodes = self.node_count(),
            edges = self.edge_count(),
            "bulk load finished"
        );
        Ok(())
    }

    /// Outgoing adjacency entries of `key`. Never allocates; an unknown key
    /// has no neighbors.
    pub fn neighbors(&self, key: impl Into<CompositeKey>) -> &[Edge] {
        match self.registry.lookup(key) {
            Some(id) => self.neighbors_by_id(id),
            None => &[],
        }
    }

    pub fn neighbors_by_id(&self, id: VertexId) -> &[Edge] {
        self.adjacency
            .get(id as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of adjacency entries leaving `key`.
    pub fn degree(&self, key: impl Into<CompositeKey>) -> usize {
        self.neighbors(key).len()
    }

    /// Distinct vertices registered so far, including ones that only
    /// appeared through an allocating lookup.
    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    /// Adjacency entries stored. An undirected edge counts twice.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|v| v.len()).sum()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let slots = self.adjacency.capacity() * size_of::<Vec<Edge>>();
        let edges: usize = self
            .adjacency
            .iter()
            .map(|v| v.capacity() * size_of::<Edge>())
            .sum();
        // key vector + hash map entry (key, id, ~8 bytes control overhead)
        let registry = self.registry.len()
            * (2 * size_of::<CompositeKey>() + size_of::<VertexId>() + 8);

        slots + edges + registry
    }
}
