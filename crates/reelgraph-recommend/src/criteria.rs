//! Multi-criteria movie search.
//!
//! The query is assembled from whichever criteria were supplied, in a fixed
//! order: base movie pattern, then genre, actor and director traversals,
//! then scalar filters. Criteria that are absent (or empty strings) emit no
//! syntax at all.

use reelgraph_core::Movie;
use reelgraph_graph::{contains_pattern, Direction, Query, QueryBuilder};

use crate::error::Result;
use crate::types::{Limit, MovieCriteria};
use crate::MovieService;

/// Compose the search query for `criteria`.
pub fn criteria_query(criteria: &MovieCriteria, limit: Limit) -> Query {
    let mut builder = QueryBuilder::matching("(movie:Movie)");

    if let Some(genre) = present(&criteria.genre) {
        builder = builder
            .match_where(
                "(movie)-[:BELONGS_TO_GENRE]->(genre:Genre)",
                "genre.name =~ $genrePattern",
            )
            .bind("genrePattern", contains_pattern(genre));
    }
    if let Some(actor) = present(&criteria.actor) {
        builder = builder
            .match_pattern("(actor:Actor {name: $actorName})-[:ACTED_IN]->(movie)")
            .bind("actorName", actor);
    }
    if let Some(director) = present(&criteria.director) {
        builder = builder
            .match_pattern("(director:Director {name: $directorName})-[:DIRECTED]->(movie)")
            .bind("directorName", director);
    }

    if let Some(title) = present(&criteria.title) {
        builder = builder
            .filter("movie.title =~ $titlePattern")
            .bind("titlePattern", contains_pattern(title));
    }
    if let Some(min_rating) = criteria.min_rating.filter(|r| *r > 0.0) {
        builder = builder
            .filter("movie.vote_average >= $minRating")
            .bind("minRating", min_rating);
    }
    if let Some(year) = present(&criteria.year) {
        builder = builder.filter("movie.year = $year").bind("year", year);
    }
    if let Some(language) = present(&criteria.language) {
        builder = builder
            .filter("movie.original_language = $language")
            .bind("language", language);
    }

    builder
        .returns_distinct(&["movie"])
        .order_by(&[
            ("movie.vote_average", Direction::DescNullsLast),
            ("movie.popularity", Direction::DescNullsLast),
        ])
        .limit("limit", limit)
        .build()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl MovieService {
    /// Movies matching every supplied criterion, best rated first and unrated
    /// last.
    pub async fn find_movies_with_criteria(
        &self,
        criteria: &MovieCriteria,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = criteria_query(criteria, limit.into());
        tracing::debug!(query = q.text(), "Composed criteria search");
        self.fetch_all(q, "movie").await
    }
}
