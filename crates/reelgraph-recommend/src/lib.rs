//! reelgraph-recommend: movie search and recommendation over the Reelgraph
//! knowledge graph.
//!
//! [`MovieService`] exposes one async operation per access pattern: title
//! and id lookups, per-relationship recommendations, multi-criteria search,
//! and similarity ranking by graph overlap. The [`tools`] module maps
//! JSON tool calls onto those operations for external callers.

pub mod catalog;
pub mod criteria;
pub mod error;
pub mod recommend;
pub mod similarity;
pub mod tools;
pub mod types;

pub use error::{RecommendError, Result};
pub use similarity::ThemeWeights;
pub use tools::{dispatch, ToolCall};
pub use types::{GenreMatch, Limit, MovieCriteria, SharedCastMatch, ThemeMatch};

use reelgraph_core::{Entity, Settings};
use reelgraph_graph::{normalize, GraphClient, GraphConfig, Query};

/// The movie recommendation and retrieval service.
///
/// Holds the single shared [`GraphClient`]; every operation runs in its own
/// session on it. Clone is cheap.
#[derive(Clone)]
pub struct MovieService {
    client: GraphClient,
    default_limit: Limit,
    theme_weights: ThemeWeights,
}

impl MovieService {
    /// Connect to Neo4j using the given settings.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let client = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;
        Ok(Self::new(client).with_default_limit(settings.service.default_limit))
    }

    /// Wrap an existing client.
    pub fn new(client: GraphClient) -> Self {
        Self {
            client,
            default_limit: Limit::DEFAULT,
            theme_weights: ThemeWeights::default(),
        }
    }

    /// Limit used by tool calls that omit one.
    pub fn with_default_limit(mut self, limit: impl Into<Limit>) -> Self {
        self.default_limit = limit.into();
        self
    }

    /// Set custom weights for thematic similarity scoring.
    pub fn with_theme_weights(mut self, weights: ThemeWeights) -> Self {
        self.theme_weights = weights;
        self
    }

    pub fn default_limit(&self) -> Limit {
        self.default_limit
    }

    pub fn theme_weights(&self) -> &ThemeWeights {
        &self.theme_weights
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// Shut the connection down. Later operations fail with a closed error.
    pub async fn close(&self) {
        self.client.close().await;
    }

    // ── Shared helpers ───────────────────────────────────────────

    /// Run a query and validate the `column` of every row as `T`.
    async fn fetch_all<T: Entity>(&self, query: Query, column: &str) -> Result<Vec<T>> {
        let rows = self.client.execute(query).await?;
        Ok(normalize::normalize_all(&rows, column)?)
    }

    /// Run a query and validate the first row's `column`, if any row came back.
    async fn fetch_one<T: Entity>(&self, query: Query, column: &str) -> Result<Option<T>> {
        match self.client.query_one(query).await? {
            Some(row) => Ok(Some(normalize::normalize(&row, column)?)),
            None => Ok(None),
        }
    }
}
