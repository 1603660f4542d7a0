//! Argument and result types shared by the service operations.

use reelgraph_core::Movie;
use reelgraph_graph::GraphValue;
use serde::{Deserialize, Serialize};

/// Maximum number of rows an operation returns.
///
/// Callers may pass fractional values; the limit travels to the database as
/// a float and is floored by the parameter sanitizer just before execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limit(f64);

impl Limit {
    pub const DEFAULT: Limit = Limit(10.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for Limit {
    fn from(n: i32) -> Self {
        Self(f64::from(n))
    }
}

impl From<u32> for Limit {
    fn from(n: u32) -> Self {
        Self(f64::from(n))
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Self(n as f64)
    }
}

impl From<f64> for Limit {
    fn from(n: f64) -> Self {
        Self(n)
    }
}

impl From<Limit> for GraphValue {
    fn from(limit: Limit) -> Self {
        GraphValue::Float(limit.0)
    }
}

/// Optional criteria for the multi-criteria movie search. Every field left
/// `None` contributes nothing to the composed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCriteria {
    /// Case-insensitive substring of the movie title.
    pub title: Option<String>,
    /// Case-insensitive substring of a genre name.
    pub genre: Option<String>,
    /// Exact actor name.
    pub actor: Option<String>,
    /// Exact director name.
    pub director: Option<String>,
    /// Minimum vote average; ignored unless greater than zero.
    pub min_rating: Option<f64>,
    pub year: Option<String>,
    /// Original language code, e.g. `en`.
    pub language: Option<String>,
}

/// A movie sharing genres with a seed movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenreMatch {
    #[serde(flatten)]
    pub movie: Movie,
    pub genre_overlap: i64,
}

/// A movie sharing cast members with a seed movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedCastMatch {
    #[serde(flatten)]
    pub movie: Movie,
    pub actor_count: i64,
}

/// A movie related to a seed movie through genres, directors or writers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMatch {
    #[serde(flatten)]
    pub movie: Movie,
    pub genre_score: i64,
    pub director_score: i64,
    pub writer_score: i64,
    pub similarity_score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_conversions() {
        assert_eq!(Limit::from(5).value(), 5.0);
        assert_eq!(Limit::from(7.9).value(), 7.9);
        assert_eq!(Limit::default(), Limit::DEFAULT);
        assert_eq!(GraphValue::from(Limit::from(3_u32)), GraphValue::Float(3.0));
    }

    #[test]
    fn test_limit_deserializes_from_plain_numbers() {
        let limit: Limit = serde_json::from_str("12").unwrap();
        assert_eq!(limit.value(), 12.0);
        let limit: Limit = serde_json::from_str("4.5").unwrap();
        assert_eq!(limit.value(), 4.5);
    }

    #[test]
    fn test_criteria_camel_case() {
        let criteria: MovieCriteria =
            serde_json::from_str(r#"{"genre": "Comedy", "minRating": 7.5}"#).unwrap();
        assert_eq!(criteria.genre.as_deref(), Some("Comedy"));
        assert_eq!(criteria.min_rating, Some(7.5));
        assert!(criteria.actor.is_none());
    }
}
