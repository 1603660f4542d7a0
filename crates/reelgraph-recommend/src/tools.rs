//! JSON tool boundary.
//!
//! External callers name an operation and pass its arguments as JSON:
//! `{"tool": "recommend_by_genre", "args": {"genre": "Drama", "limit": 5}}`.
//! [`dispatch`] runs the matching [`MovieService`] operation and returns
//! plain JSON. Missing single-entity lookups come back as a
//! `{"status": "not_found"}` object rather than an error.

use reelgraph_graph::Query;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RecommendError, Result};
use crate::recommend::{DEFAULT_MIN_RATING, DEFAULT_YEARS_BACK};
use crate::types::{Limit, MovieCriteria};
use crate::MovieService;

/// A tool name and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Every tool [`dispatch`] understands.
pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "search_movies_by_title",
        description: "Search for movies by title (full or partial match)",
    },
    ToolSpec {
        name: "get_movie_by_exact_title",
        description: "Get movie details by exact title",
    },
    ToolSpec {
        name: "get_movie_by_id",
        description: "Get movie details by ID",
    },
    ToolSpec {
        name: "recommend_by_genre",
        description: "Recommend movies by genre",
    },
    ToolSpec {
        name: "list_all_genres",
        description: "Get a list of all available movie genres",
    },
    ToolSpec {
        name: "recommend_by_actor",
        description: "Recommend movies by actor",
    },
    ToolSpec {
        name: "search_actors",
        description: "Search for actors with partial name match",
    },
    ToolSpec {
        name: "get_movie_cast",
        description: "Get actors for a specific movie",
    },
    ToolSpec {
        name: "find_similar_movies",
        description: "Find similar movies based on shared genres",
    },
    ToolSpec {
        name: "find_similar_movies_by_id",
        description: "Find similar movies based on movie ID",
    },
    ToolSpec {
        name: "recommend_by_language",
        description: "Recommend movies by language",
    },
    ToolSpec {
        name: "get_available_languages",
        description: "Get list of available movie languages",
    },
    ToolSpec {
        name: "recommend_by_writer",
        description: "Recommend movies by writer",
    },
    ToolSpec {
        name: "search_writers",
        description: "Search for writers with partial name match",
    },
    ToolSpec {
        name: "get_movie_writers",
        description: "Get writers for a specific movie",
    },
    ToolSpec {
        name: "recommend_by_director",
        description: "Recommend movies by director",
    },
    ToolSpec {
        name: "search_directors",
        description: "Search for directors with partial name match",
    },
    ToolSpec {
        name: "get_movie_directors",
        description: "Get directors for a specific movie",
    },
    ToolSpec {
        name: "get_movie_genres",
        description: "Get genres for a specific movie",
    },
    ToolSpec {
        name: "get_movie_companies",
        description: "Get production companies for a specific movie",
    },
    ToolSpec {
        name: "find_movies_by_company",
        description: "Find movies by production company",
    },
    ToolSpec {
        name: "get_highly_rated_movies",
        description: "Get movies with high ratings",
    },
    ToolSpec {
        name: "get_recent_movies",
        description: "Get recently released movies",
    },
    ToolSpec {
        name: "get_movies_by_year",
        description: "Get movies released in a specific year",
    },
    ToolSpec {
        name: "get_movies_by_pg_rating",
        description: "Get movies with specific PG rating",
    },
    ToolSpec {
        name: "get_available_pg_ratings",
        description: "Get all available PG ratings in the database",
    },
    ToolSpec {
        name: "find_movies_by_actor_and_director",
        description: "Find movies where specific actor and director worked together",
    },
    ToolSpec {
        name: "find_movies_with_criteria",
        description: "Find movies with multiple criteria (complex search)",
    },
    ToolSpec {
        name: "find_movies_with_shared_actors",
        description: "Find movies that have common actors with a given movie",
    },
    ToolSpec {
        name: "get_movies_with_similar_themes",
        description: "Get movies with similar themes (using connections between genres, directors and writers)",
    },
    ToolSpec {
        name: "get_neo4j_schema",
        description: "Get Neo4j schema for query generation against the movie database",
    },
    ToolSpec {
        name: "execute_cypher_query",
        description: "Execute a read-only cypher query against the movie database for exploration",
    },
];

/// A single tool invocation. Omitted limits fall back to the service's
/// default limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "tool",
    content = "args",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ToolCall {
    SearchMoviesByTitle { title: String, limit: Option<Limit> },
    GetMovieByExactTitle { title: String },
    GetMovieById { id: i64 },
    RecommendByGenre { genre: String, limit: Option<Limit> },
    ListAllGenres {},
    RecommendByActor { actor_name: String, limit: Option<Limit> },
    SearchActors { name: String, limit: Option<Limit> },
    GetMovieCast { movie_title: String },
    FindSimilarMovies { movie_title: String, limit: Option<Limit> },
    FindSimilarMoviesById { movie_id: i64, limit: Option<Limit> },
    RecommendByLanguage { language: String, limit: Option<Limit> },
    GetAvailableLanguages {},
    RecommendByWriter { writer_name: String, limit: Option<Limit> },
    SearchWriters { name: String, limit: Option<Limit> },
    GetMovieWriters { movie_title: String },
    RecommendByDirector { director_name: String, limit: Option<Limit> },
    SearchDirectors { name: String, limit: Option<Limit> },
    GetMovieDirectors { movie_title: String },
    GetMovieGenres { movie_title: String },
    GetMovieCompanies { movie_title: String },
    FindMoviesByCompany { company_name: String, limit: Option<Limit> },
    GetHighlyRatedMovies { min_rating: Option<f64>, limit: Option<Limit> },
    GetRecentMovies { years_back: Option<f64>, limit: Option<Limit> },
    GetMoviesByYear { year: String, limit: Option<Limit> },
    GetMoviesByPgRating { rating: String, limit: Option<Limit> },
    GetAvailablePgRatings {},
    FindMoviesByActorAndDirector {
        actor_name: String,
        director_name: String,
        limit: Option<Limit>,
    },
    FindMoviesWithCriteria {
        title: Option<String>,
        genre: Option<String>,
        actor: Option<String>,
        director: Option<String>,
        min_rating: Option<f64>,
        year: Option<String>,
        language: Option<String>,
        limit: Option<Limit>,
    },
    FindMoviesWithSharedActors { movie_title: String, limit: Option<Limit> },
    GetMoviesWithSimilarThemes { movie_title: String, limit: Option<Limit> },
    #[serde(rename = "get_neo4j_schema")]
    GetNeo4jSchema {},
    ExecuteCypherQuery { query: String },
}

impl ToolCall {
    /// Build a call from a tool name and its JSON arguments.
    pub fn parse(tool: &str, args: Value) -> Result<Self> {
        if !TOOLS.iter().any(|spec| spec.name == tool) {
            return Err(RecommendError::UnknownTool(tool.to_string()));
        }
        let args = if args.is_null() { json!({}) } else { args };
        serde_json::from_value(json!({ "tool": tool, "args": args })).map_err(|e| {
            RecommendError::InvalidArguments {
                tool: tool.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Run `call` against `service` and render the result as JSON.
pub async fn dispatch(service: &MovieService, call: ToolCall) -> Result<Value> {
    let default = service.default_limit();
    let lim = |limit: Option<Limit>| limit.unwrap_or(default);

    let value = match call {
        ToolCall::SearchMoviesByTitle { title, limit } => {
            to_json(service.search_movies_by_title(&title, lim(limit)).await?)?
        }
        ToolCall::GetMovieByExactTitle { title } => {
            match service.get_movie_by_exact_title(&title).await? {
                Some(movie) => to_json(movie)?,
                None => not_found(format!("No movie found with title '{title}'")),
            }
        }
        ToolCall::GetMovieById { id } => match service.get_movie_by_id(id).await? {
            Some(movie) => to_json(movie)?,
            None => not_found(format!("No movie found with ID {id}")),
        },
        ToolCall::RecommendByGenre { genre, limit } => {
            to_json(service.recommend_by_genre(&genre, lim(limit)).await?)?
        }
        ToolCall::ListAllGenres {} => {
            let names: Vec<String> = service
                .list_all_genres()
                .await?
                .into_iter()
                .map(|genre| genre.name)
                .collect();
            to_json(names)?
        }
        ToolCall::RecommendByActor { actor_name, limit } => {
            to_json(service.recommend_by_actor(&actor_name, lim(limit)).await?)?
        }
        ToolCall::SearchActors { name, limit } => {
            to_json(service.search_actors(&name, lim(limit)).await?)?
        }
        ToolCall::GetMovieCast { movie_title } => {
            to_json(service.get_movie_cast(&movie_title).await?)?
        }
        ToolCall::FindSimilarMovies { movie_title, limit } => {
            to_json(service.find_similar_movies(&movie_title, lim(limit)).await?)?
        }
        ToolCall::FindSimilarMoviesById { movie_id, limit } => {
            to_json(service.find_similar_movies_by_id(movie_id, lim(limit)).await?)?
        }
        ToolCall::RecommendByLanguage { language, limit } => {
            to_json(service.recommend_by_language(&language, lim(limit)).await?)?
        }
        ToolCall::GetAvailableLanguages {} => to_json(service.get_available_languages().await?)?,
        ToolCall::RecommendByWriter { writer_name, limit } => {
            to_json(service.recommend_by_writer(&writer_name, lim(limit)).await?)?
        }
        ToolCall::SearchWriters { name, limit } => {
            to_json(service.search_writers(&name, lim(limit)).await?)?
        }
        ToolCall::GetMovieWriters { movie_title } => {
            to_json(service.get_movie_writers(&movie_title).await?)?
        }
        ToolCall::RecommendByDirector {
            director_name,
            limit,
        } => to_json(service.recommend_by_director(&director_name, lim(limit)).await?)?,
        ToolCall::SearchDirectors { name, limit } => {
            to_json(service.search_directors(&name, lim(limit)).await?)?
        }
        ToolCall::GetMovieDirectors { movie_title } => {
            to_json(service.get_movie_directors(&movie_title).await?)?
        }
        ToolCall::GetMovieGenres { movie_title } => {
            to_json(service.get_movie_genres(&movie_title).await?)?
        }
        ToolCall::GetMovieCompanies { movie_title } => {
            to_json(service.get_movie_companies(&movie_title).await?)?
        }
        ToolCall::FindMoviesByCompany {
            company_name,
            limit,
        } => to_json(service.find_movies_by_company(&company_name, lim(limit)).await?)?,
        ToolCall::GetHighlyRatedMovies { min_rating, limit } => to_json(
            service
                .get_highly_rated_movies(min_rating.unwrap_or(DEFAULT_MIN_RATING), lim(limit))
                .await?,
        )?,
        ToolCall::GetRecentMovies { years_back, limit } => {
            let years_back = years_back
                .filter(|y| y.is_finite())
                .map_or(DEFAULT_YEARS_BACK, |y| y.max(0.0).floor() as u32);
            to_json(service.get_recent_movies(years_back, lim(limit)).await?)?
        }
        ToolCall::GetMoviesByYear { year, limit } => {
            to_json(service.get_movies_by_year(&year, lim(limit)).await?)?
        }
        ToolCall::GetMoviesByPgRating { rating, limit } => {
            to_json(service.get_movies_by_pg_rating(&rating, lim(limit)).await?)?
        }
        ToolCall::GetAvailablePgRatings {} => to_json(service.get_available_pg_ratings().await?)?,
        ToolCall::FindMoviesByActorAndDirector {
            actor_name,
            director_name,
            limit,
        } => to_json(
            service
                .find_movies_by_actor_and_director(&actor_name, &director_name, lim(limit))
                .await?,
        )?,
        ToolCall::FindMoviesWithCriteria {
            title,
            genre,
            actor,
            director,
            min_rating,
            year,
            language,
            limit,
        } => {
            let criteria = MovieCriteria {
                title,
                genre,
                actor,
                director,
                min_rating,
                year,
                language,
            };
            to_json(service.find_movies_with_criteria(&criteria, lim(limit)).await?)?
        }
        ToolCall::FindMoviesWithSharedActors { movie_title, limit } => to_json(
            service
                .find_movies_with_shared_actors(&movie_title, lim(limit))
                .await?,
        )?,
        ToolCall::GetMoviesWithSimilarThemes { movie_title, limit } => to_json(
            service
                .get_movies_with_similar_themes(&movie_title, lim(limit))
                .await?,
        )?,
        ToolCall::GetNeo4jSchema {} => Value::String(service.graph_schema()),
        ToolCall::ExecuteCypherQuery { query } => {
            ensure_read_only(&query)?;
            to_json(service.execute_cypher(Query::new(query)).await?)?
        }
    };
    Ok(value)
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn not_found(message: String) -> Value {
    json!({ "status": "not_found", "message": message })
}

// ── Read-only guard ──────────────────────────────────────────────

const WRITE_CLAUSES: &[&str] = &[
    "CREATE", "MERGE", "DELETE", "DETACH", "SET", "REMOVE", "DROP", "FOREACH",
];

/// Procedures an ad-hoc query may CALL. Names are lowercase.
const READ_PROCEDURES: &[&str] = &[
    "db.labels",
    "db.relationshiptypes",
    "db.propertykeys",
    "db.indexes",
    "db.constraints",
    "dbms.components",
];

/// Reject query text that could write to the graph.
///
/// Write clause keywords are matched on whole words, case-insensitive,
/// anywhere in the text, so a keyword inside a string literal is rejected
/// too. `CALL` is allowed for `CALL { .. }` subqueries, whose bodies are
/// checked like the rest of the text, and for the procedures in
/// `READ_PROCEDURES` or under `db.schema.`. Any other procedure call is
/// rejected.
pub fn ensure_read_only(query: &str) -> Result<()> {
    let words: Vec<String> = query
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();

    for (i, word) in words.iter().enumerate() {
        if WRITE_CLAUSES.contains(&word.as_str()) {
            return Err(RecommendError::WriteRejected {
                clause: word.clone(),
            });
        }
        if word == "LOAD" && words.get(i + 1).is_some_and(|next| next == "CSV") {
            return Err(RecommendError::WriteRejected {
                clause: "LOAD CSV".to_string(),
            });
        }
    }

    for procedure in called_procedures(query) {
        let allowed = READ_PROCEDURES.contains(&procedure.as_str())
            || procedure.starts_with("db.schema.");
        if !allowed {
            return Err(RecommendError::WriteRejected {
                clause: format!("CALL {procedure}"),
            });
        }
    }
    Ok(())
}

/// Lowercased names following each CALL keyword. Subqueries yield nothing
/// and a trailing CALL yields an empty name.
fn called_procedures(query: &str) -> Vec<String> {
    let spaced = query.to_lowercase().replace('{', " { ");
    let tokens: Vec<&str> = spaced
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '`' | '{')))
        .filter(|t| !t.is_empty())
        .collect();

    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| **token == "call")
        .filter_map(|(i, _)| match tokens.get(i + 1) {
            Some(&"{") => None,
            Some(name) => Some(name.replace('`', "")),
            None => Some(String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reelgraph_graph::mock::ScriptedBackend;
    use reelgraph_graph::{GraphValue, Node, Record};

    use crate::testing::{movie_row, service};

    #[test]
    fn test_parse_uses_original_argument_names() {
        let call = ToolCall::parse(
            "find_movies_by_actor_and_director",
            json!({"actorName": "Al Pacino", "directorName": "Michael Mann", "limit": 3}),
        )
        .unwrap();
        assert_eq!(
            call,
            ToolCall::FindMoviesByActorAndDirector {
                actor_name: "Al Pacino".to_string(),
                director_name: "Michael Mann".to_string(),
                limit: Some(Limit::from(3)),
            }
        );

        let call = ToolCall::parse("get_neo4j_schema", json!({"noOp": "x"})).unwrap();
        assert_eq!(call, ToolCall::GetNeo4jSchema {});
        let call = ToolCall::parse("list_all_genres", Value::Null).unwrap();
        assert_eq!(call, ToolCall::ListAllGenres {});
    }

    #[test]
    fn test_parse_rejects_unknown_tools_and_bad_args() {
        assert!(matches!(
            ToolCall::parse("drop_database", json!({})),
            Err(RecommendError::UnknownTool(_))
        ));
        assert!(matches!(
            ToolCall::parse("get_movie_by_id", json!({"id": "six"})),
            Err(RecommendError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_every_catalog_entry_parses() {
        for spec in TOOLS {
            let args = match spec.name {
                "get_movie_by_id" => json!({"id": 1}),
                "find_similar_movies_by_id" => json!({"movieId": 1}),
                _ => json!({
                    "title": "x", "genre": "x", "actorName": "x", "name": "x",
                    "movieTitle": "x", "language": "x", "writerName": "x",
                    "directorName": "x", "companyName": "x", "year": "1999",
                    "rating": "R", "query": "RETURN 1"
                }),
            };
            ToolCall::parse(spec.name, args).unwrap_or_else(|e| panic!("{}: {e}", spec.name));
        }
    }

    #[test]
    fn test_read_only_guard() {
        assert!(ensure_read_only("MATCH (m:Movie) RETURN m.title LIMIT 5").is_ok());
        assert!(ensure_read_only("MATCH (m) WHERE m.created_at > 0 RETURN m").is_ok());
        for bad in [
            "CREATE (m:Movie {id: 1})",
            "match (m) detach delete m",
            "MATCH (m) SET m.title = 'x'",
            "LOAD CSV FROM 'file:///x.csv' AS row RETURN row",
            "MATCH (m) MERGE (g:Genre {name: 'x'})",
        ] {
            assert!(
                matches!(ensure_read_only(bad), Err(RecommendError::WriteRejected { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_read_only_guard_checks_procedure_calls() {
        for ok in [
            "CALL db.labels()",
            "CALL db.relationshipTypes() YIELD relationshipType RETURN relationshipType",
            "call db.schema.visualization()",
            "CALL dbms.components() YIELD name RETURN name",
            "MATCH (m:Movie) CALL { WITH m MATCH (m)<-[:ACTED_IN]-(a) RETURN count(a) AS n } \
             RETURN m.title, n",
            "MATCH (m:Movie) WHERE m.recall > 0 RETURN m",
        ] {
            assert!(ensure_read_only(ok).is_ok(), "{ok}");
        }

        for bad in [
            "CALL db.createLabel('X')",
            "CALL apoc.refactor.mergeNodes([a, b])",
            "call `db`.`createProperty`('x')",
            "MATCH (m) CALL{ WITH m CALL apoc.create.node(['X'], {}) YIELD node RETURN node } \
             RETURN m",
            "RETURN 1 CALL",
        ] {
            assert!(
                matches!(ensure_read_only(bad), Err(RecommendError::WriteRejected { .. })),
                "{bad}"
            );
        }

        match ensure_read_only("CALL db.createLabel('X')") {
            Err(RecommendError::WriteRejected { clause }) => {
                assert_eq!(clause, "CALL db.createlabel")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_query_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new());
        let service = service(&backend);

        let call = ToolCall::ExecuteCypherQuery {
            query: "MATCH (n) DETACH DELETE n".to_string(),
        };
        assert!(dispatch(&service, call).await.is_err());
        assert!(backend.queries().is_empty());
    }

    #[tokio::test]
    async fn test_missing_movie_is_not_found_status() {
        let backend = Arc::new(ScriptedBackend::new());
        let service = service(&backend);

        let out = dispatch(&service, ToolCall::GetMovieById { id: 42 }).await.unwrap();
        assert_eq!(out["status"], json!("not_found"));
    }

    #[tokio::test]
    async fn test_omitted_limit_uses_service_default() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_rows(vec![movie_row(603, "The Matrix", 8.2)]);
        let service = service(&backend).with_default_limit(4);

        let call = ToolCall::parse("recommend_by_genre", json!({"genre": "Action"})).unwrap();
        let out = dispatch(&service, call).await.unwrap();
        assert_eq!(out[0]["id"], json!(603));
        assert_eq!(
            backend.last_query().unwrap().get_param("limit"),
            Some(&GraphValue::Integer(4))
        );
    }

    #[tokio::test]
    async fn test_genres_are_plain_strings() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_rows(vec![
            Record::new().with("genre", Node::new("Genre").with("name", "Action")),
            Record::new().with("genre", Node::new("Genre").with("name", "Drama")),
        ]);
        let service = service(&backend);

        let out = dispatch(&service, ToolCall::ListAllGenres {}).await.unwrap();
        assert_eq!(out, json!(["Action", "Drama"]));
    }

    #[tokio::test]
    async fn test_similarity_results_flatten_movie_fields() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_rows(vec![movie_row(949, "Heat", 7.9).with("genreOverlap", 2_i64)]);
        let service = service(&backend);

        let call = ToolCall::FindSimilarMovies {
            movie_title: "Ronin".to_string(),
            limit: None,
        };
        let out = dispatch(&service, call).await.unwrap();
        assert_eq!(out[0]["title"], json!("Heat"));
        assert_eq!(out[0]["genreOverlap"], json!(2));
    }
}
