//! Backend-neutral representation of values returned from the graph.
//!
//! The Neo4j backend converts Bolt values into these types, so the
//! sanitizer, normalizer and tests never touch driver types directly.

use std::collections::BTreeMap;

/// Bound query parameters, keyed by name (without the `$`).
pub type Params = BTreeMap<String, GraphValue>;

/// A single value as it arrives from (or is sent to) the graph.
///
/// `Integer` is the store's 64-bit integer type. It is kept distinct from
/// plain JSON numbers until the normalizer flattens it.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<GraphValue>),
    Map(BTreeMap<String, GraphValue>),
    Node(Node),
    Relation(Relation),
}

impl GraphValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's kind, used in validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Node(_) => "node",
            Self::Relation(_) => "relationship",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Property bag of a node, relationship or map value.
    pub fn properties(&self) -> Option<&BTreeMap<String, GraphValue>> {
        match self {
            Self::Node(n) => Some(&n.properties),
            Self::Relation(r) => Some(&r.properties),
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A node: labels plus a property bag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: BTreeMap<String, GraphValue>,
}

impl Node {
    pub fn new(label: &str) -> Self {
        Self {
            id: 0,
            labels: vec![label.to_string()],
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<GraphValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// A relationship: its type plus a property bag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relation {
    pub id: i64,
    pub rel_type: String,
    pub start_node_id: i64,
    pub end_node_id: i64,
    pub properties: BTreeMap<String, GraphValue>,
}

impl Relation {
    pub fn new(rel_type: &str) -> Self {
        Self {
            rel_type: rel_type.to_string(),
            ..Default::default()
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<GraphValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}

/// One result row: column name → value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<String, GraphValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<GraphValue>) -> Self {
        self.fields.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.fields.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GraphValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, GraphValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, GraphValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────

impl From<bool> for GraphValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for GraphValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for GraphValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for GraphValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for GraphValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for GraphValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Node> for GraphValue {
    fn from(v: Node) -> Self {
        Self::Node(v)
    }
}

impl From<Relation> for GraphValue {
    fn from(v: Relation) -> Self {
        Self::Relation(v)
    }
}

impl<T: Into<GraphValue>> From<Option<T>> for GraphValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<GraphValue>> From<Vec<T>> for GraphValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// JSON arguments from tool callers become parameters. Whole numbers map to
/// `Integer`, everything else numeric to `Float`.
impl From<serde_json::Value> for GraphValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
