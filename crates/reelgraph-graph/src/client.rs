//! Connection management and the shared graph client.

use std::sync::Arc;

use reelgraph_core::config::Neo4jSettings;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::Instrument;
use uuid::Uuid;

use crate::backend::{GraphBackend, Neo4jBackend};
use crate::cypher::Query;
use crate::params;
use crate::value::Record;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connectivity(String),

    #[error("Neo4j query error: {0}")]
    QueryExecution(String),

    #[error("Schema validation failed for {entity}: {reason}")]
    SchemaValidation { entity: String, reason: String },

    #[error("Graph client is closed")]
    Closed,
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jSettings::default())
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(s: &Neo4jSettings) -> Self {
        Self {
            uri: s.uri.clone(),
            user: s.user.clone(),
            password: s.password.clone(),
            database: s.database.clone(),
            max_connections: s.max_connections,
            fetch_size: s.fetch_size,
        }
    }
}

/// Thread-safe graph client with scoped, pooled sessions.
///
/// Every query runs inside its own [`Session`]; at most `max_sessions` are
/// open at once and further callers wait for one to be released. Clone is
/// cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn GraphBackend>,
    sessions: Semaphore,
    max_sessions: usize,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let backend = Neo4jBackend::connect(config).await?;
        Ok(Self::with_backend(
            Arc::new(backend),
            config.max_connections as usize,
        ))
    }

    /// Wrap an existing backend, allowing `max_sessions` concurrent sessions.
    pub fn with_backend(backend: Arc<dyn GraphBackend>, max_sessions: usize) -> Self {
        let max_sessions = max_sessions.max(1);
        Self {
            inner: Arc::new(Inner {
                backend,
                sessions: Semaphore::new(max_sessions),
                max_sessions,
            }),
        }
    }

    /// Acquire a scoped session. It is released when dropped, whether the
    /// work inside it succeeded, failed, or was abandoned.
    pub async fn session(&self) -> Result<Session<'_>, GraphError> {
        let permit = self
            .inner
            .sessions
            .acquire()
            .await
            .map_err(|_| GraphError::Closed)?;
        let session = Session {
            id: Uuid::new_v4(),
            backend: self.inner.backend.as_ref(),
            _permit: permit,
        };
        tracing::trace!(session_id = %session.id, "Session acquired");
        Ok(session)
    }

    /// Execute a read query in a fresh session and collect all rows.
    pub async fn execute(&self, query: Query) -> Result<Vec<Record>, GraphError> {
        let session = self.session().await?;
        session.run(query).await
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<Record>, GraphError> {
        Ok(self.execute(query).await?.into_iter().next())
    }

    /// Sessions that can be acquired right now.
    pub fn available_sessions(&self) -> usize {
        self.inner.sessions.available_permits()
    }

    pub fn max_sessions(&self) -> usize {
        self.inner.max_sessions
    }

    pub fn is_closed(&self) -> bool {
        self.inner.sessions.is_closed()
    }

    /// Stop handing out sessions and shut the backend down.
    ///
    /// In-flight sessions finish normally; later calls fail with
    /// [`GraphError::Closed`].
    pub async fn close(&self) {
        if self.is_closed() {
            return;
        }
        self.inner.sessions.close();
        self.inner.backend.close().await;
        tracing::info!("Graph client closed");
    }
}

/// A short-lived execution context holding one pool slot.
pub struct Session<'a> {
    id: Uuid,
    backend: &'a dyn GraphBackend,
    _permit: SemaphorePermit<'a>,
}

impl Session<'_> {
    /// Sanitize the parameters and run the query.
    pub async fn run(&self, query: Query) -> Result<Vec<Record>, GraphError> {
        let span = tracing::debug_span!("graph_session", session_id = %self.id);
        async {
            let (text, raw_params) = query.into_parts();
            let query = Query::new(text).params_from(params::sanitize(&raw_params));

            match self.backend.run(query).await {
                Ok(records) => {
                    tracing::debug!(rows = records.len(), "Query completed");
                    Ok(records)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Query failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        tracing::trace!(session_id = %self.id, "Session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedBackend;
    use crate::value::{GraphValue, Node};
    use std::time::Duration;

    fn client(backend: &Arc<ScriptedBackend>, sessions: usize) -> GraphClient {
        GraphClient::with_backend(backend.clone(), sessions)
    }

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.fetch_size, 256);
    }

    #[tokio::test]
    async fn test_execute_returns_rows_and_releases() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_rows(vec![Record::new().with("movie", Node::new("Movie"))]);
        let client = client(&backend, 2);

        let rows = client.execute(Query::new("MATCH (movie:Movie) RETURN movie")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(client.available_sessions(), 2);
    }

    #[tokio::test]
    async fn test_limit_params_are_sanitized_before_execution() {
        let backend = Arc::new(ScriptedBackend::new());
        let client = client(&backend, 1);

        client
            .execute(
                Query::new("MATCH (m) RETURN m LIMIT $limit")
                    .param("limit", 7.8)
                    .param("minRating", 7.8),
            )
            .await
            .unwrap();

        let seen = backend.last_query().unwrap();
        assert_eq!(seen.get_param("limit"), Some(&GraphValue::Integer(7)));
        assert_eq!(seen.get_param("minRating"), Some(&GraphValue::Float(7.8)));
    }

    #[tokio::test]
    async fn test_session_released_on_error() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_error(GraphError::QueryExecution("Invalid input 'RETRN'".to_string()));
        let client = client(&backend, 3);
        let before = client.available_sessions();

        let err = client.execute(Query::new("RETRN 1")).await.unwrap_err();
        assert!(matches!(err, GraphError::QueryExecution(_)));
        assert_eq!(client.available_sessions(), before);
    }

    #[tokio::test]
    async fn test_session_released_when_caller_gives_up() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_hang();
        let client = client(&backend, 1);

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            client.execute(Query::new("MATCH (n) RETURN n")),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(client.available_sessions(), 1);

        // The slot is usable again.
        client.execute(Query::new("RETURN 1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_held_while_open() {
        let backend = Arc::new(ScriptedBackend::new());
        let client = client(&backend, 2);

        let session = client.session().await.unwrap();
        assert_eq!(client.available_sessions(), 1);
        session.run(Query::new("RETURN 1")).await.unwrap();
        assert_eq!(client.available_sessions(), 1);
        drop(session);
        assert_eq!(client.available_sessions(), 2);
    }

    #[tokio::test]
    async fn test_close_rejects_new_work() {
        let backend = Arc::new(ScriptedBackend::new());
        let client = client(&backend, 2);

        client.close().await;
        assert!(client.is_closed());
        assert!(backend.is_closed());

        let err = client.execute(Query::new("RETURN 1")).await.unwrap_err();
        assert!(matches!(err, GraphError::Closed));
    }

    #[test]
    fn test_zero_sessions_is_clamped() {
        let backend = Arc::new(ScriptedBackend::new());
        let client = client(&backend, 0);
        assert_eq!(client.max_sessions(), 1);
    }
}
