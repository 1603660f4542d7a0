//! Similarity ranking by graph overlap with a seed movie.
//!
//! Thematic score: `genre_weight × genreOverlap + director_weight ×
//! directorOverlap + writer_weight × writerOverlap`, ranked by score
//! descending, then `vote_average` descending.

use std::cmp::Ordering;

use reelgraph_graph::{normalize, Query, Record};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{GenreMatch, Limit, SharedCastMatch, ThemeMatch};
use crate::MovieService;

/// Weights for thematic similarity scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeWeights {
    /// Points per shared genre (default 2).
    pub genre: i64,
    /// Points per shared director (default 3).
    pub director: i64,
    /// Points per shared writer (default 3).
    pub writer: i64,
}

impl Default for ThemeWeights {
    fn default() -> Self {
        Self {
            genre: 2,
            director: 3,
            writer: 3,
        }
    }
}

impl ThemeWeights {
    pub fn score(&self, genre_overlap: i64, director_overlap: i64, writer_overlap: i64) -> i64 {
        self.genre * genre_overlap + self.director * director_overlap + self.writer * writer_overlap
    }
}

/// Order matches by score descending, then by `vote_average` descending.
/// Stable, so equal matches keep their incoming order. Unrated movies sort
/// after rated ones with the same score.
pub fn rank(matches: &mut [ThemeMatch]) {
    matches.sort_by(|a, b| {
        b.similarity_score
            .cmp(&a.similarity_score)
            .then_with(|| compare_rating(b.movie.vote_average, a.movie.vote_average))
    });
}

fn compare_rating(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

const THEMES_QUERY: &str = "MATCH (seed:Movie {original_title: $movieTitle})
CALL {
  WITH seed
  MATCH (seed)-[:BELONGS_TO_GENRE]->(:Genre)<-[:BELONGS_TO_GENRE]-(similar:Movie)
  RETURN similar
  UNION
  WITH seed
  MATCH (seed)<-[:DIRECTED]-(:Director)-[:DIRECTED]->(similar:Movie)
  RETURN similar
  UNION
  WITH seed
  MATCH (seed)<-[:WROTE]-(:Writer)-[:WROTE]->(similar:Movie)
  RETURN similar
}
WITH seed, similar
WHERE seed <> similar
OPTIONAL MATCH (seed)-[:BELONGS_TO_GENRE]->(genre:Genre)<-[:BELONGS_TO_GENRE]-(similar)
WITH seed, similar, count(DISTINCT genre) AS genreScore
OPTIONAL MATCH (seed)<-[:DIRECTED]-(director:Director)-[:DIRECTED]->(similar)
WITH seed, similar, genreScore, count(DISTINCT director) AS directorScore
OPTIONAL MATCH (seed)<-[:WROTE]-(writer:Writer)-[:WROTE]->(similar)
WITH similar, genreScore, directorScore, count(DISTINCT writer) AS writerScore
RETURN similar AS movie, genreScore, directorScore, writerScore,
       genreScore * $genreWeight + directorScore * $directorWeight
         + writerScore * $writerWeight AS similarityScore
ORDER BY similarityScore DESC, movie.vote_average IS NULL, movie.vote_average DESC
LIMIT $limit";

impl MovieService {
    // ── Shared genres ────────────────────────────────────────────

    /// Movies sharing genres with the movie titled `movie_title`, most
    /// shared genres first.
    pub async fn find_similar_movies(
        &self,
        movie_title: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<GenreMatch>> {
        let q = Query::new(
            "MATCH (seed:Movie {original_title: $movieTitle})-[:BELONGS_TO_GENRE]->(genre:Genre)
                   <-[:BELONGS_TO_GENRE]-(similar:Movie)
             WHERE seed <> similar
             RETURN similar AS movie, count(DISTINCT genre) AS genreOverlap
             ORDER BY genreOverlap DESC, movie.vote_average IS NULL, movie.vote_average DESC
             LIMIT $limit",
        )
        .param("movieTitle", movie_title)
        .param("limit", limit.into());
        self.genre_matches(q).await
    }

    /// Same as [`find_similar_movies`](Self::find_similar_movies), seeded by
    /// movie id.
    pub async fn find_similar_movies_by_id(
        &self,
        movie_id: i64,
        limit: impl Into<Limit>,
    ) -> Result<Vec<GenreMatch>> {
        let q = Query::new(
            "MATCH (seed:Movie {id: $movieId})-[:BELONGS_TO_GENRE]->(genre:Genre)
                   <-[:BELONGS_TO_GENRE]-(similar:Movie)
             WHERE seed <> similar
             RETURN similar AS movie, count(DISTINCT genre) AS genreOverlap
             ORDER BY genreOverlap DESC, movie.vote_average IS NULL, movie.vote_average DESC
             LIMIT $limit",
        )
        .param("movieId", movie_id)
        .param("limit", limit.into());
        self.genre_matches(q).await
    }

    async fn genre_matches(&self, q: Query) -> Result<Vec<GenreMatch>> {
        let rows = self.client().execute(q).await?;
        rows.iter()
            .map(|row| -> Result<GenreMatch> {
                Ok(GenreMatch {
                    movie: normalize::normalize(row, "movie")?,
                    genre_overlap: normalize::integer(row, "genreOverlap")?,
                })
            })
            .collect()
    }

    // ── Shared cast ──────────────────────────────────────────────

    /// Movies sharing actors with the movie titled `movie_title`, most
    /// shared actors first.
    pub async fn find_movies_with_shared_actors(
        &self,
        movie_title: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<SharedCastMatch>> {
        let q = Query::new(
            "MATCH (seed:Movie {original_title: $movieTitle})<-[:ACTED_IN]-(actor:Actor)
                   -[:ACTED_IN]->(other:Movie)
             WHERE seed <> other
             RETURN other AS movie, count(DISTINCT actor) AS actorCount
             ORDER BY actorCount DESC, movie.vote_average IS NULL, movie.vote_average DESC
             LIMIT $limit",
        )
        .param("movieTitle", movie_title)
        .param("limit", limit.into());

        let rows = self.client().execute(q).await?;
        rows.iter()
            .map(|row| -> Result<SharedCastMatch> {
                Ok(SharedCastMatch {
                    movie: normalize::normalize(row, "movie")?,
                    actor_count: normalize::integer(row, "actorCount")?,
                })
            })
            .collect()
    }

    // ── Themes ───────────────────────────────────────────────────

    /// Movies related to the movie titled `movie_title` through shared
    /// genres, directors or writers, scored with the service's
    /// [`ThemeWeights`].
    pub async fn get_movies_with_similar_themes(
        &self,
        movie_title: &str,
        limit: impl Into<Limit>,
    ) -> Result<Vec<ThemeMatch>> {
        let weights = self.theme_weights();
        let q = Query::new(THEMES_QUERY)
            .param("movieTitle", movie_title)
            .param("genreWeight", weights.genre)
            .param("directorWeight", weights.director)
            .param("writerWeight", weights.writer)
            .param("limit", limit.into());

        let rows = self.client().execute(q).await?;
        let mut matches = rows
            .iter()
            .map(|row| theme_match(row, weights))
            .collect::<Result<Vec<_>>>()?;
        rank(&mut matches);
        Ok(matches)
    }
}

fn theme_match(row: &Record, weights: &ThemeWeights) -> Result<ThemeMatch> {
    let genre_score = normalize::integer(row, "genreScore")?;
    let director_score = normalize::integer(row, "directorScore")?;
    let writer_score = normalize::integer(row, "writerScore")?;
    Ok(ThemeMatch {
        movie: normalize::normalize(row, "movie")?,
        genre_score,
        director_score,
        writer_score,
        similarity_score: weights.score(genre_score, director_score, writer_score),
    })
}
