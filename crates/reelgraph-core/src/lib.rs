//! reelgraph-core: Shared types, settings, and error handling for Reelgraph.
//!
//! This crate provides the foundational pieces used by every Reelgraph crate:
//! - Entity types (Movie, Actor, Genre, etc.) read from the movie graph
//! - The static graph schema description handed to query-writing callers
//! - Settings loading
//! - Common error types

pub mod config;
pub mod error;
pub mod schema;
pub mod types;

pub use config::Settings;
pub use error::ReelgraphError;
pub use types::{
    Actor, CastCredit, Company, Director, Entity, Genre, Movie, Writer, WritingCredit,
};
