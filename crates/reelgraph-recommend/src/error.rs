//! Error types for the reelgraph-recommend crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Graph error: {0}")]
    Graph(#[from] reelgraph_graph::GraphError),

    #[error("Settings error: {0}")]
    Settings(#[from] reelgraph_core::ReelgraphError),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Write clause `{clause}` is not allowed in read-only queries")]
    WriteRejected { clause: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
