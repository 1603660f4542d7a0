use thiserror::Error;

/// Top-level error type for Reelgraph shared components.
#[derive(Error, Debug)]
pub enum ReelgraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ReelgraphError>;
