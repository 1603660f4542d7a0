//! Query execution backends.
//!
//! [`GraphBackend`] is the seam between the connection manager and the
//! actual store. [`Neo4jBackend`] speaks Bolt through `neo4rs` and converts
//! driver values into [`GraphValue`]s.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Graph};

use crate::client::{GraphConfig, GraphError};
use crate::cypher::Query;
use crate::value::{GraphValue, Node, Record, Relation};

/// Executes one query and collects every row.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    async fn run(&self, query: Query) -> Result<Vec<Record>, GraphError>;

    /// Shut down the underlying connection. Called once by the owner.
    async fn close(&self) {}
}

/// Neo4j backend over a pooled `neo4rs::Graph`.
pub struct Neo4jBackend {
    graph: Mutex<Option<Graph>>,
}

impl Neo4jBackend {
    /// Build the connection pool and verify the server answers.
    ///
    /// `Graph::connect` is lazy, so a `RETURN 1` ping forces the Bolt
    /// handshake and surfaces an unreachable server immediately.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let mut builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo_config = builder
            .build()
            .map_err(|e| GraphError::Connectivity(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connectivity(e.to_string()))?;

        graph
            .run(neo4rs::query("RETURN 1"))
            .await
            .map_err(|e| GraphError::Connectivity(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph: Mutex::new(Some(graph)),
        })
    }

    fn graph(&self) -> Result<Graph, GraphError> {
        self.graph
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .ok_or(GraphError::Closed)
    }
}

#[async_trait]
impl GraphBackend for Neo4jBackend {
    async fn run(&self, query: Query) -> Result<Vec<Record>, GraphError> {
        let graph = self.graph()?;
        let (text, params) = query.into_parts();

        let mut q = neo4rs::query(&text);
        for (key, value) in params {
            q = q.param(&key, to_bolt(value));
        }

        let mut stream = graph.execute(q).await.map_err(classify)?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await.map_err(classify)? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    async fn close(&self) {
        // Dropping the last handle shuts the pool down.
        let taken = self
            .graph
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if taken.is_some() {
            tracing::info!("Neo4j connection pool closed");
        }
    }
}

/// Split driver failures into "could not reach the server" and
/// "server rejected the query".
fn classify(err: neo4rs::Error) -> GraphError {
    match err {
        neo4rs::Error::ConnectionError | neo4rs::Error::IOError { .. } => {
            GraphError::Connectivity(err.to_string())
        }
        other => GraphError::QueryExecution(other.to_string()),
    }
}

fn row_to_record(row: &neo4rs::Row) -> Result<Record, GraphError> {
    let columns: HashMap<String, BoltType> =
        row.to().map_err(|e| GraphError::SchemaValidation {
            entity: "row".to_string(),
            reason: e.to_string(),
        })?;
    Ok(columns
        .into_iter()
        .map(|(column, value)| (column, from_bolt(value)))
        .collect())
}

// ── Bolt conversion ──────────────────────────────────────────────

/// Convert a driver value into a [`GraphValue`].
///
/// Temporal and spatial values have no counterpart in the movie schema and
/// are carried as their debug rendering.
pub fn from_bolt(value: BoltType) -> GraphValue {
    match value {
        BoltType::Null(_) => GraphValue::Null,
        BoltType::Boolean(b) => GraphValue::Bool(b.value),
        BoltType::Integer(i) => GraphValue::Integer(i.value),
        BoltType::Float(f) => GraphValue::Float(f.value),
        BoltType::String(s) => GraphValue::String(s.value),
        BoltType::List(list) => GraphValue::List(list.value.into_iter().map(from_bolt).collect()),
        BoltType::Map(map) => GraphValue::Map(bolt_map(map)),
        BoltType::Node(node) => GraphValue::Node(Node {
            id: node.id.value,
            labels: node
                .labels
                .value
                .into_iter()
                .filter_map(|label| match label {
                    BoltType::String(s) => Some(s.value),
                    _ => None,
                })
                .collect(),
            properties: bolt_map(node.properties),
        }),
        BoltType::Relation(rel) => GraphValue::Relation(Relation {
            id: rel.id.value,
            rel_type: rel.typ.value,
            start_node_id: rel.start_node_id.value,
            end_node_id: rel.end_node_id.value,
            properties: bolt_map(rel.properties),
        }),
        BoltType::UnboundedRelation(rel) => GraphValue::Relation(Relation {
            id: rel.id.value,
            rel_type: rel.typ.value,
            properties: bolt_map(rel.properties),
            ..Default::default()
        }),
        other => GraphValue::String(format!("{other:?}")),
    }
}

fn bolt_map(map: BoltMap) -> BTreeMap<String, GraphValue> {
    map.value
        .into_iter()
        .map(|(key, value)| (key.value, from_bolt(value)))
        .collect()
}

/// Convert a parameter into a driver value. Nodes and relationships are
/// sent as their property maps.
pub fn to_bolt(value: GraphValue) -> BoltType {
    match value {
        GraphValue::Null => BoltType::Null(BoltNull),
        GraphValue::Bool(b) => BoltType::from(b),
        GraphValue::Integer(i) => BoltType::from(i),
        GraphValue::Float(f) => BoltType::from(f),
        GraphValue::String(s) => BoltType::from(s),
        GraphValue::List(items) => {
            let list: Vec<BoltType> = items.into_iter().map(to_bolt).collect();
            BoltType::List(BoltList::from(list))
        }
        GraphValue::Map(map) => BoltType::Map(to_bolt_map(map)),
        GraphValue::Node(node) => BoltType::Map(to_bolt_map(node.properties)),
        GraphValue::Relation(rel) => BoltType::Map(to_bolt_map(rel.properties)),
    }
}

fn to_bolt_map(map: BTreeMap<String, GraphValue>) -> BoltMap {
    let mut out = BoltMap::new();
    for (key, value) in map {
        out.put(BoltString::from(key), to_bolt(value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roundtrip_through_bolt() {
        for value in [
            GraphValue::Null,
            GraphValue::Bool(true),
            GraphValue::Integer(1_000_000_000_000),
            GraphValue::Float(7.25),
            GraphValue::String("Heat".to_string()),
        ] {
            assert_eq!(from_bolt(to_bolt(value.clone())), value);
        }
    }

    #[test]
    fn test_list_and_map_through_bolt() {
        let value = GraphValue::Map(BTreeMap::from([
            ("ids".to_string(), GraphValue::List(vec![1_i64.into(), 2_i64.into()])),
            ("name".to_string(), "Pixar".into()),
        ]));
        assert_eq!(from_bolt(to_bolt(value.clone())), value);
    }

    #[test]
    fn test_node_params_are_sent_as_maps() {
        let node = Node::new("Genre").with("name", "Drama");
        match from_bolt(to_bolt(GraphValue::Node(node))) {
            GraphValue::Map(map) => assert_eq!(map["name"], GraphValue::from("Drama")),
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn test_io_errors_are_connectivity() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = classify(neo4rs::Error::from(io));
        assert!(matches!(err, GraphError::Connectivity(_)));
        assert!(matches!(classify(neo4rs::Error::ConnectionError), GraphError::Connectivity(_)));
    }
}
