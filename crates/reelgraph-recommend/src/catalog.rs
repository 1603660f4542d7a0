//! Lookups and enumerations: finding movies and people, reading a movie's
//! credits, listing the values the graph knows about, and running
//! caller-supplied queries.

use reelgraph_core::{
    schema, Actor, CastCredit, Company, Director, Genre, Movie, Writer, WritingCredit,
};
use reelgraph_graph::{contains_pattern, normalize, Query};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::Limit;
use crate::MovieService;

impl MovieService {
    // ── Movies ───────────────────────────────────────────────────

    /// Movies whose original title contains `title`, ignoring case, most
    /// popular first.
    pub async fn search_movies_by_title(
        &self,
        title: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.original_title =~ $titlePattern
             RETURN movie
             ORDER BY movie.popularity IS NULL, movie.popularity DESC
             LIMIT $limit",
        )
        .param("titlePattern", contains_pattern(title))
        .param("limit", limit.into());
        self.fetch_all(q, "movie").await
    }

    /// The movie whose original title is exactly `title`. When several share
    /// it, the most popular wins.
    pub async fn get_movie_by_exact_title(&self, title: &str) -> Result<Option<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.original_title = $title
             RETURN movie
             ORDER BY movie.popularity IS NULL, movie.popularity DESC
             LIMIT 1",
        )
        .param("title", title);
        self.fetch_one(q, "movie").await
    }

    pub async fn get_movie_by_id(&self, id: i64) -> Result<Option<Movie>> {
        let q = Query::new(
            "MATCH (movie:Movie {id: $id})
             RETURN movie
             LIMIT 1",
        )
        .param("id", id);
        self.fetch_one(q, "movie").await
    }

    // ── People ───────────────────────────────────────────────────

    /// Actors whose name contains `name`, ignoring case.
    pub async fn search_actors(&self, name: &str, limit: impl Into<Limit>) -> Result<Vec<Actor>> {
        let q = Query::new(
            "MATCH (actor:Actor)
             WHERE actor.name =~ $namePattern
             RETURN actor
             ORDER BY actor.name
             LIMIT $limit",
        )
        .param("namePattern", contains_pattern(name))
        .param("limit", limit.into());
        self.fetch_all(q, "actor").await
    }

    /// Directors whose name contains `name`, ignoring case.
    pub async fn search_directors(
        &self,
        name: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<Director>> {
        let q = Query::new(
            "MATCH (director:Director)
             WHERE director.name =~ $namePattern
             RETURN director
             ORDER BY director.name
             LIMIT $limit",
        )
        .param("namePattern", contains_pattern(name))
        .param("limit", limit.into());
        self.fetch_all(q, "director").await
    }

    /// Writers whose name contains `name`, ignoring case.
    pub async fn search_writers(&self, name: &str, limit: impl Into<Limit>) -> Result<Vec<Writer>> {
        let q = Query::new(
            "MATCH (writer:Writer)
             WHERE writer.name =~ $namePattern
             RETURN writer
             ORDER BY writer.name
             LIMIT $limit",
        )
        .param("namePattern", contains_pattern(name))
        .param("limit", limit.into());
        self.fetch_all(q, "writer").await
    }

    // ── Credits ──────────────────────────────────────────────────

    /// The cast of the movie with original title `movie_title`, with the
    /// role each actor played.
    pub async fn get_movie_cast(&self, movie_title: &str) -> Result<Vec<CastCredit>> {
        let q = Query::new(
            "MATCH (actor:Actor)-[r:ACTED_IN]->(movie:Movie)
             WHERE movie.original_title = $movieTitle
             RETURN actor, r.role AS role
             ORDER BY actor.name",
        )
        .param("movieTitle", movie_title);

        let rows = self.client().execute(q).await?;
        let mut cast = Vec::with_capacity(rows.len());
        for row in &rows {
            cast.push(CastCredit {
                actor: normalize::normalize(row, "actor")?,
                role: normalize::optional_string(row, "role")?,
            });
        }
        Ok(cast)
    }

    /// The writers of a movie, with the role recorded on each credit.
    pub async fn get_movie_writers(&self, movie_title: &str) -> Result<Vec<WritingCredit>> {
        let q = Query::new(
            "MATCH (writer:Writer)-[r:WROTE]->(movie:Movie)
             WHERE movie.original_title = $movieTitle
             RETURN writer, r.role AS role
             ORDER BY writer.name",
        )
        .param("movieTitle", movie_title);

        let rows = self.client().execute(q).await?;
        let mut writers = Vec::with_capacity(rows.len());
        for row in &rows {
            writers.push(WritingCredit {
                writer: normalize::normalize(row, "writer")?,
                role: normalize::optional_string(row, "role")?,
            });
        }
        Ok(writers)
    }

    pub async fn get_movie_directors(&self, movie_title: &str) -> Result<Vec<Director>> {
        let q = Query::new(
            "MATCH (director:Director)-[:DIRECTED]->(movie:Movie)
             WHERE movie.original_title = $movieTitle
             RETURN director
             ORDER BY director.name",
        )
        .param("movieTitle", movie_title);
        self.fetch_all(q, "director").await
    }

    pub async fn get_movie_genres(&self, movie_title: &str) -> Result<Vec<Genre>> {
        let q = Query::new(
            "MATCH (movie:Movie)-[:BELONGS_TO_GENRE]->(genre:Genre)
             WHERE movie.original_title = $movieTitle
             RETURN DISTINCT genre
             ORDER BY genre.name",
        )
        .param("movieTitle", movie_title);
        self.fetch_all(q, "genre").await
    }

    pub async fn get_movie_companies(&self, movie_title: &str) -> Result<Vec<Company>> {
        let q = Query::new(
            "MATCH (movie:Movie)-[:PRODUCED_BY]->(company:Company)
             WHERE movie.original_title = $movieTitle
             RETURN DISTINCT company
             ORDER BY company.name",
        )
        .param("movieTitle", movie_title);
        self.fetch_all(q, "company").await
    }

    // ── Enumerations ─────────────────────────────────────────────

    /// Every genre, sorted by name.
    pub async fn list_all_genres(&self) -> Result<Vec<Genre>> {
        let q = Query::new(
            "MATCH (genre:Genre)
             RETURN genre
             ORDER BY genre.name",
        );
        self.fetch_all(q, "genre").await
    }

    /// Distinct original language codes, sorted. Empty values are skipped.
    pub async fn get_available_languages(&self) -> Result<Vec<String>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.original_language IS NOT NULL
             RETURN DISTINCT movie.original_language AS language
             ORDER BY language",
        );
        let rows = self.client().execute(q).await?;
        Ok(normalize::non_empty_strings(&rows, "language")?)
    }

    /// Distinct PG ratings, sorted. Empty values are skipped.
    pub async fn get_available_pg_ratings(&self) -> Result<Vec<String>> {
        let q = Query::new(
            "MATCH (movie:Movie)
             WHERE movie.pg_rating IS NOT NULL
             RETURN DISTINCT movie.pg_rating AS rating
             ORDER BY rating",
        );
        let rows = self.client().execute(q).await?;
        Ok(normalize::non_empty_strings(&rows, "rating")?)
    }

    // ── Schema and ad-hoc queries ────────────────────────────────

    /// Human-readable description of the graph's labels, properties and
    /// relationship patterns, for callers composing their own queries.
    pub fn graph_schema(&self) -> String {
        schema::describe()
    }

    /// Run a trusted, pre-formed query as-is and flatten every row.
    ///
    /// No schema validation is applied. Limit-like parameters are still
    /// sanitized by the session.
    pub async fn execute_cypher(&self, query: Query) -> Result<Vec<Map<String, Value>>> {
        let rows = self.client().execute(query).await?;
        tracing::debug!(rows = rows.len(), "Ad-hoc query completed");
        Ok(rows.iter().map(normalize::generic).collect())
    }
}
