use serde::{Deserialize, Serialize};

/// What a lookup does with a key that was never registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Allocate a fresh id for the key. It has no edges, so it stays
    /// unreached: `min_dist` answers -1 and `is_visited` answers false.
    #[default]
    Allocate,
    /// Reject the key with `GraphError::UnknownVertex` and leave the
    /// registry untouched.
    Strict,
}

/// Construction options for a [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Store edges one-way only. Undirected graphs store both directions.
    pub directed: bool,
    /// Upper bound on distinct vertices. `None` grows on demand.
    pub capacity: Option<usize>,
    pub lookup: LookupPolicy,
}

impl GraphConfig {
    pub fn undirected() -> Self {
        Self::default()
    }

    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_lookup(mut self, lookup: LookupPolicy) -> Self {
        self.lookup = lookup;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = GraphConfig::default();
        assert!(!cfg.directed);
        assert_eq!(cfg.capacity, None);
        assert_eq!(cfg.lookup, LookupPolicy::Allocate);
    }

    #[test]
    fn test_builder() {
        let cfg = GraphConfig::directed()
            .with_capacity(16)
            .with_lookup(LookupPolicy::Strict);
        assert!(cfg.directed);
        assert_eq!(cfg.capacity, Some(16));
        assert_eq!(cfg.lookup, LookupPolicy::Strict);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: GraphConfig = serde_json::from_str(r#"{"lookup": "strict"}"#).unwrap();
        assert_eq!(cfg, GraphConfig::undirected().with_lookup(LookupPolicy::Strict));
    }
}
