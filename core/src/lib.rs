//! keygraph-core: composite-key graph with BFS reachability.
//!
//! Vertices are named by small integer triples ([`CompositeKey`]); plain
//! integers and pairs widen to triples with trailing zeros. A
//! [`KeyRegistry`] interns every key to a dense id on first sight, and the
//! [`Graph`] keeps adjacency lists indexed by those ids. [`Traversal`] runs
//! a single-source BFS over the dense representation and answers hop-count
//! distance and reachability queries by key.
//!
//! Edge weights are stored but never read by traversal.

mod config;
mod error;
mod graph;
mod key;
mod traversal;

pub use config::{GraphConfig, LookupPolicy};
pub use error::{GraphError, Result};
pub use graph::{Edge, Graph};
pub use key::{CompositeKey, KeyRegistry, VertexId};
pub use traversal::{Traversal, TraversalState, UNREACHED};
