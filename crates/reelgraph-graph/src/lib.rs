//! reelgraph-graph: Read-only Neo4j access for the movie graph.
//!
//! Every query flows through [`GraphClient`], which scopes it to its own
//! pooled session, sanitizes limit-like parameters, and hands back
//! backend-neutral [`Record`]s. The [`normalize`] module turns those into
//! validated entities or plain JSON.

pub mod backend;
pub mod client;
pub mod cypher;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod normalize;
pub mod params;
pub mod value;

pub use backend::{GraphBackend, Neo4jBackend};
pub use client::{GraphClient, GraphConfig, GraphError, Session};
pub use cypher::{contains_pattern, Direction, Query, QueryBuilder};
pub use value::{GraphValue, Node, Params, Record, Relation};
