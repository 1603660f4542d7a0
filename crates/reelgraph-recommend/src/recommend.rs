//! Per-relationship recommendations and scalar-filter listings.
//!
//! Unless noted otherwise, results are ordered by `vote_average` descending
//! with `popularity` breaking ties. A movie missing either property sorts
//! after the movies that have it.

use chrono::Datelike;
use reelgraph_core::Movie;
use reelgraph_graph::{contains_pattern, Query};

use crate::error::Result;
use crate::types::Limit;
use crate::MovieService;

/// Default floor for [`MovieService::get_highly_rated_movies`].
pub const DEFAULT_MIN_RATING: f64 = 8.0;

/// Default window for [`MovieService::get_recent_movies`].
pub const DEFAULT_YEARS_BACK: u32 = 1;

impl MovieService {
    // ── By relationship ──────────────────────────────────────────

    /// Movies in any genre whose name contains `genre`, ignoring case.
    pub async fn recommend_by_genre(
        &self,
        genre: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)-[:BELONGS_TO_GENRE]->(genre:Genre)
             WHERE genre.name =~ $genrePattern
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("genrePattern", contains_pattern(genre))
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    pub async fn recommend_by_actor(
        &self,
        actor_name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (actor:Actor {name: $actorName})-[:ACTED_IN]->(movie:Movie)
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("actorName", actor_name)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    pub async fn recommend_by_director(
        &self,
        director_name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (director:Director {name: $directorName})-[:DIRECTED]->(movie:Movie)
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("directorName", director_name)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    pub async fn recommend_by_writer(
        &self,
        writer_name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (writer:Writer {name: $writerName})-[:WROTE]->(movie:Movie)
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("writerName", writer_name)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies whose original language code equals `language`.
    pub async fn recommend_by_language(
        &self,
        language: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.original_language = $language
             RETURN movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("language", language)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies produced by any company whose name contains `company_name`,
    /// ignoring case.
    pub async fn find_movies_by_company(
        &self,
        company_name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)-[:PRODUCED_BY]->(company:Company)
             WHERE company.name =~ $companyPattern
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("companyPattern", contains_pattern(company_name))
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies the actor played in that the director also directed.
    pub async fn find_movies_by_actor_and_director(
        &self,
        actor_name: &str,
        director_name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (actor:Actor {name: $actorName})-[:ACTED_IN]->(movie:Movie)
                   <-[:DIRECTED]-(director:Director {name: $directorName})
             RETURN DISTINCT movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("actorName", actor_name)
        .param("directorName", director_name)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    // ── By scalar filter ─────────────────────────────────────────

    /// Movies rated at least `min_rating`.
    pub async fn get_highly_rated_movies(
        &self,
        min_rating: f64,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.vote_average >= $minRating
             RETURN movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("minRating", min_rating)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies released in the last `years_back` calendar years, newest first.
    ///
    /// A movie qualifies when the year parsed from its `release_date` is at
    /// or after the current year minus `years_back`.
    pub async fn get_recent_movies(
        &self,
        years_back: u32,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let earliest_year = i64::from(chrono::Utc::now().year()) - i64::from(years_back);
        self.get_movies_released_since(earliest_year, limit).await
    }

    /// Movies whose release year is `earliest_year` or later, newest first.
    pub async fn get_movies_released_since(
        &self,
        earliest_year: i64,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE toInteger(left(movie.release_date, 4)) >= $earliestYear
             RETURN movie
             ORDER BY movie.release_date DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("earliestYear", earliest_year)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies whose `year` property equals `year`.
    pub async fn get_movies_by_year(
        &self,
        year: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.year = $year
             RETURN movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("year", year)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// Movies with the given PG rating class, e.g. `PG-13`.
    pub async fn get_movies_by_pg_rating(
        &self,
        rating: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.pg_rating = $rating
             RETURN movie
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC,
                      movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("rating", rating)
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }
}
