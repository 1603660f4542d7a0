//! Static description of the movie graph schema.
//!
//! Handed to callers that write their own read-only Cypher, so they know
//! which labels, properties and relationship patterns exist.

use std::fmt::Write as _;

use serde::Serialize;

/// Primitive kind of a stored property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyKind {
    Integer,
    Float,
    String,
}

impl PropertyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::String => "STRING",
        }
    }
}

/// A node label and its properties.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeSchema {
    pub label: &'static str,
    pub properties: &'static [(&'static str, PropertyKind)],
}

/// A relationship type with properties carried on the edge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelationshipSchema {
    pub rel_type: &'static str,
    pub properties: &'static [(&'static str, PropertyKind)],
}

/// A directed `(:From)-[:TYPE]->(:To)` pattern.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pattern {
    pub from: &'static str,
    pub rel_type: &'static str,
    pub to: &'static str,
}

use PropertyKind::{Float, Integer, String as Str};

pub const NODES: &[NodeSchema] = &[
    NodeSchema {
        label: "Movie",
        properties: &[
            ("id", Integer),
            ("overview", Str),
            ("original_language", Str),
            ("original_title", Str),
            ("runtime", Integer),
            ("title", Str),
            ("revenue", Integer),
            ("release_date", Str),
            ("popularity", Float),
            ("vote_average", Float),
            ("vote_count", Integer),
            ("budget", Integer),
            ("year", Str),
            ("description", Str),
            ("poster_url", Str),
            ("pg_rating", Str),
            ("imdb_url", Str),
        ],
    },
    NodeSchema {
        label: "Actor",
        properties: &[("name", Str)],
    },
    NodeSchema {
        label: "Director",
        properties: &[("name", Str)],
    },
    NodeSchema {
        label: "Genre",
        properties: &[("name", Str)],
    },
    NodeSchema {
        label: "Company",
        properties: &[("id", Integer), ("name", Str)],
    },
    NodeSchema {
        label: "Writer",
        properties: &[("name", Str)],
    },
];

pub const RELATIONSHIPS: &[RelationshipSchema] = &[
    RelationshipSchema {
        rel_type: "WROTE",
        properties: &[("role", Str)],
    },
    RelationshipSchema {
        rel_type: "ACTED_IN",
        properties: &[("role", Str)],
    },
];

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        from: "Movie",
        rel_type: "BELONGS_TO_GENRE",
        to: "Genre",
    },
    Pattern {
        from: "Movie",
        rel_type: "PRODUCED_BY",
        to: "Company",
    },
    Pattern {
        from: "Actor",
        rel_type: "ACTED_IN",
        to: "Movie",
    },
    Pattern {
        from: "Director",
        rel_type: "DIRECTED",
        to: "Movie",
    },
    Pattern {
        from: "Writer",
        rel_type: "WROTE",
        to: "Movie",
    },
];

/// Render the schema as the human-readable block handed to query writers.
pub fn describe() -> String {
    let mut out = String::from("Node properties:\n");
    for node in NODES {
        let _ = writeln!(out, "{} {{{}}}", node.label, render_props(node.properties));
    }

    out.push_str("Relationship properties:\n");
    for rel in RELATIONSHIPS {
        let _ = writeln!(out, "{} {{{}}}", rel.rel_type, render_props(rel.properties));
    }

    out.push_str("The relationships:\n");
    for p in PATTERNS {
        let _ = writeln!(out, "(:{})-[:{}]->(:{})", p.from, p.rel_type, p.to);
    }
    out
}

fn render_props(props: &[(&str, PropertyKind)]) -> String {
    props
        .iter()
        .map(|(name, kind)| format!("{name}: {}", kind.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
