//! Parameter sanitizing applied to every query right before execution.
//!
//! Cypher's `LIMIT` only accepts integers, but callers often hand over
//! generic JSON numbers (`10.0`, `7.9`). Any limit-like parameter holding a
//! finite float is floored to an integer; everything else passes through.

use crate::value::{GraphValue, Params};

/// Parameter names that always feed a row-limiting clause.
const LIMIT_PARAM_NAMES: &[&str] = &["limit", "topn", "maxresults", "count", "numresults"];

/// Whether a parameter name is treated as limit-like (case-insensitive).
pub fn is_limit_like(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    LIMIT_PARAM_NAMES.contains(&lower.as_str()) || lower.contains("limit")
}

/// Return a copy of `params` with limit-like numeric values floored to integers.
pub fn sanitize(params: &Params) -> Params {
    params
        .iter()
        .map(|(name, value)| {
            let value = if is_limit_like(name) {
                floor_to_integer(value)
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}

fn floor_to_integer(value: &GraphValue) -> GraphValue {
    match value {
        // `as` saturates at the i64 bounds.
        GraphValue::Float(f) if f.is_finite() => GraphValue::Integer(f.floor() as i64),
        other => other.clone(),
    }
}
