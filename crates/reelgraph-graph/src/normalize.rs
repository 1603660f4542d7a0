//! Conversion of raw graph records into typed entities and plain JSON.
//!
//! Every backend number is reduced to a plain JSON number by one recursive
//! function ([`flatten`]). Typed entities are then produced by deserializing
//! the flattened property bag; any shape mismatch is a
//! [`GraphError::SchemaValidation`] that aborts the whole result.

use reelgraph_core::Entity;
use serde_json::{Map, Number, Value};

use crate::client::GraphError;
use crate::value::{GraphValue, Record};

/// Reduce a numeric graph value to a plain number. `None` for non-numbers
/// and non-finite floats.
pub fn reduce_number(value: &GraphValue) -> Option<Number> {
    match value {
        GraphValue::Integer(i) => Some(Number::from(*i)),
        GraphValue::Float(f) => Number::from_f64(*f),
        _ => None,
    }
}

/// Recursively convert a graph value into plain JSON.
///
/// Nodes and relationships collapse to their property bags.
pub fn flatten(value: &GraphValue) -> Value {
    if let Some(n) = reduce_number(value) {
        return Value::Number(n);
    }
    match value {
        GraphValue::Null | GraphValue::Integer(_) | GraphValue::Float(_) => Value::Null,
        GraphValue::Bool(b) => Value::Bool(*b),
        GraphValue::String(s) => Value::String(s.clone()),
        GraphValue::List(items) => Value::Array(items.iter().map(flatten).collect()),
        GraphValue::Map(map) => Value::Object(flatten_map(map.iter())),
        GraphValue::Node(node) => Value::Object(flatten_map(node.properties.iter())),
        GraphValue::Relation(rel) => Value::Object(flatten_map(rel.properties.iter())),
    }
}

fn flatten_map<'a>(
    entries: impl Iterator<Item = (&'a String, &'a GraphValue)>,
) -> Map<String, Value> {
    entries.map(|(k, v)| (k.clone(), flatten(v))).collect()
}

/// Validate the node in `column` as entity `T`.
pub fn normalize<T: Entity>(record: &Record, column: &str) -> Result<T, GraphError> {
    let value = record
        .get(column)
        .ok_or_else(|| schema_error::<T>(format!("missing column `{column}`")))?;

    let props = value.properties().ok_or_else(|| {
        schema_error::<T>(format!(
            "column `{column}` holds a {}, expected a node",
            value.kind()
        ))
    })?;

    let object = Value::Object(flatten_map(props.iter()));
    serde_json::from_value(object).map_err(|e| schema_error::<T>(e.to_string()))
}

/// Validate every record. The first invalid record fails the whole batch.
pub fn normalize_all<T: Entity>(records: &[Record], column: &str) -> Result<Vec<T>, GraphError> {
    records.iter().map(|r| normalize::<T>(r, column)).collect()
}

/// Read an optional string column (e.g. an edge's `role`).
pub fn optional_string(record: &Record, column: &str) -> Result<Option<String>, GraphError> {
    match record.get(column) {
        None | Some(GraphValue::Null) => Ok(None),
        Some(GraphValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(GraphError::SchemaValidation {
            entity: column.to_string(),
            reason: format!("expected a string or null, got a {}", other.kind()),
        }),
    }
}

/// Collect a string column, dropping nulls and empty strings.
pub fn non_empty_strings(records: &[Record], column: &str) -> Result<Vec<String>, GraphError> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        if let Some(s) = optional_string(record, column)? {
            if !s.is_empty() {
                out.push(s);
            }
        }
    }
    Ok(out)
}

/// Read an integer column, such as an aggregated count.
pub fn integer(record: &Record, column: &str) -> Result<i64, GraphError> {
    match record.get(column) {
        Some(GraphValue::Integer(i)) => Ok(*i),
        Some(GraphValue::Float(f)) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
        other => Err(GraphError::SchemaValidation {
            entity: column.to_string(),
            reason: format!(
                "expected an integer, got {}",
                other.map_or("nothing", GraphValue::kind)
            ),
        }),
    }
}

/// Read a numeric column as a float, `None` when null or absent.
pub fn optional_float(record: &Record, column: &str) -> Option<f64> {
    match record.get(column) {
        Some(GraphValue::Integer(i)) => Some(*i as f64),
        Some(GraphValue::Float(f)) => Some(*f),
        _ => None,
    }
}

/// Flatten an ad-hoc record without schema validation.
pub fn generic(record: &Record) -> Map<String, Value> {
    record
        .iter()
        .map(|(column, value)| (column.to_string(), flatten(value)))
        .collect()
}

fn schema_error<T: Entity>(reason: String) -> GraphError {
    GraphError::SchemaValidation {
        entity: T::LABEL.to_string(),
        reason,
    }
}
