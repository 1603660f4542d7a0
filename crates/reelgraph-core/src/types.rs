//! Entity types read from the movie knowledge graph.
//!
//! Every entity is a transient, read-only projection of a graph node. The
//! service never constructs them itself: they are deserialized from
//! flattened node properties and handed to the caller.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// An entity that can be validated out of a node's property bag.
pub trait Entity: DeserializeOwned {
    /// Node label the entity is read from, used in validation errors.
    const LABEL: &'static str;
}

// ── Movie ─────────────────────────────────────────────────────────

/// A movie node.
///
/// Only `id` and `title` are required. The store never persists null
/// properties, so an absent property and an explicit null both map to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub description: Option<String>,
    pub original_language: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<i64>,
    pub revenue: Option<i64>,
    pub budget: Option<i64>,
    pub release_date: Option<String>,
    pub year: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub poster_url: Option<String>,
    pub pg_rating: Option<String>,
    pub imdb_url: Option<String>,
}

impl Entity for Movie {
    const LABEL: &'static str = "Movie";
}

// ── People ────────────────────────────────────────────────────────

/// An actor, identified by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Actor {
    pub name: String,
}

impl Entity for Actor {
    const LABEL: &'static str = "Actor";
}

/// A director, identified by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Director {
    pub name: String,
}

impl Entity for Director {
    const LABEL: &'static str = "Director";
}

/// A writer, identified by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Writer {
    pub name: String,
}

impl Entity for Writer {
    const LABEL: &'static str = "Writer";
}

// ── Classification ────────────────────────────────────────────────

/// A genre, identified by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Genre {
    pub name: String,
}

impl Entity for Genre {
    const LABEL: &'static str = "Genre";
}

/// A production company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

impl Entity for Company {
    const LABEL: &'static str = "Company";
}

// ── Credits ───────────────────────────────────────────────────────

/// An actor together with the `role` carried on their ACTED_IN edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastCredit {
    pub actor: Actor,
    pub role: Option<String>,
}

/// A writer together with the `role` carried on their WROTE edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WritingCredit {
    pub writer: Writer,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_with_only_required_fields() {
        let movie: Movie =
            serde_json::from_value(serde_json::json!({"id": 603, "title": "The Matrix"})).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title, "The Matrix");
        assert!(movie.vote_average.is_none());
        assert!(movie.runtime.is_none());
    }

    #[test]
    fn movie_accepts_explicit_nulls_and_unknown_properties() {
        let movie: Movie = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Heat",
            "overview": null,
            "vote_average": 7.9,
            "tagline": "A Los Angeles crime saga",
        }))
        .unwrap();
        assert!(movie.overview.is_none());
        assert_eq!(movie.vote_average, Some(7.9));
    }

    #[test]
    fn movie_requires_title() {
        let result: Result<Movie, _> = serde_json::from_value(serde_json::json!({"id": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn movie_rejects_wrong_kind() {
        let result: Result<Movie, _> =
            serde_json::from_value(serde_json::json!({"id": "one", "title": "Heat"}));
        assert!(result.is_err());
    }

    #[test]
    fn company_requires_integer_id() {
        let ok: Company =
            serde_json::from_value(serde_json::json!({"id": 3, "name": "Pixar"})).unwrap();
        assert_eq!(ok.id, 3);

        let bad: Result<Company, _> =
            serde_json::from_value(serde_json::json!({"id": 3.5, "name": "Pixar"}));
        assert!(bad.is_err());
    }
}
