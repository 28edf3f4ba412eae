use thiserror::Error;

use crate::key::CompositeKey;

/// Errors raised by graph construction and traversal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("capacity exceeded: vertex id {id} does not fit in capacity {capacity}")]
    CapacityExceeded { id: usize, capacity: usize },

    #[error("traversal already ran from {start}; build a new traversal for another run")]
    TraversalReused { start: CompositeKey },

    #[error("unknown vertex {0}")]
    UnknownVertex(CompositeKey),

    #[error("vertex id space exhausted")]
    IdSpaceExhausted,
}

/// Convenience alias for results using `GraphError`.
pub type Result<T> = std::result::Result<T, GraphError>;
