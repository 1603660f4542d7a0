//! Service-level tests over the scripted backend.
//!
//! These drive the public API the way the CLI does, without a database.

use std::sync::Arc;
use std::time::Duration;

use reelgraph_graph::mock::ScriptedBackend;
use reelgraph_graph::{GraphClient, GraphError, GraphValue, Node, Record};
use reelgraph_recommend::{dispatch, MovieCriteria, MovieService, RecommendError, ToolCall};
use serde_json::json;

fn movie(id: i64, title: &str, vote_average: f64, popularity: f64) -> Record {
    Record::new().with(
        "movie",
        Node::new("Movie")
            .with("id", id)
            .with("title", title)
            .with("original_title", title)
            .with("vote_average", vote_average)
            .with("popularity", popularity)
            .with("release_date", "1999-03-31")
            .with("year", "1999"),
    )
}

fn setup(sessions: usize) -> (Arc<ScriptedBackend>, MovieService) {
    let backend = Arc::new(ScriptedBackend::new());
    let client = GraphClient::with_backend(backend.clone(), sessions);
    (backend, MovieService::new(client))
}

#[tokio::test]
async fn test_backend_failure_restores_sessions() {
    let (backend, service) = setup(3);
    backend.push_error(GraphError::Connectivity("connection refused".to_string()));
    let before = service.client().available_sessions();

    let err = service.recommend_by_actor("Keanu Reeves", 5).await.unwrap_err();
    assert!(matches!(
        err,
        RecommendError::Graph(GraphError::Connectivity(_))
    ));
    assert_eq!(service.client().available_sessions(), before);
}

#[tokio::test]
async fn test_abandoned_call_restores_sessions() {
    let (backend, service) = setup(1);
    backend.push_hang();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        service.search_movies_by_title("matrix", 5),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(service.client().available_sessions(), 1);
}

#[tokio::test]
async fn test_callers_beyond_pool_size_wait() {
    let (backend, service) = setup(1);
    backend.push_hang();

    let blocked = service.clone();
    let first = tokio::spawn(async move { blocked.get_movie_by_id(1).await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(service.client().available_sessions(), 0);

    let second = tokio::time::timeout(Duration::from_millis(20), service.get_movie_by_id(2)).await;
    assert!(second.is_err(), "second caller should still be waiting");

    first.abort();
    let _ = first.await;
    assert!(service.get_movie_by_id(3).await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_row_yields_no_movies() {
    let (backend, service) = setup(2);
    backend.push_rows(vec![
        movie(1, "Heat", 7.9, 30.0),
        Record::new().with("movie", Node::new("Movie").with("id", 2_i64)),
    ]);

    let err = service.recommend_by_genre("Crime", 10).await.unwrap_err();
    match err {
        RecommendError::Graph(GraphError::SchemaValidation { entity, .. }) => {
            assert_eq!(entity, "Movie")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_genre_only_criteria_match_genre_recommendation() {
    let (backend, service) = setup(2);
    let rows = vec![movie(1, "Heat", 7.9, 30.0), movie(2, "Ronin", 6.9, 12.0)];
    backend.push_rows(rows.clone());
    backend.push_rows(rows);

    let criteria = MovieCriteria {
        genre: Some("Crime".to_string()),
        ..Default::default()
    };
    let by_criteria = service.find_movies_with_criteria(&criteria, 10).await.unwrap();
    let by_genre = service.recommend_by_genre("Crime", 10).await.unwrap();
    assert_eq!(by_criteria, by_genre);

    let queries = backend.queries();
    assert_eq!(queries[0].get_param("genrePattern"), queries[1].get_param("genrePattern"));
    assert_eq!(queries[0].get_param("limit"), Some(&GraphValue::Integer(10)));
}

#[tokio::test]
async fn test_movie_fields_survive_to_json() {
    let (backend, service) = setup(2);
    backend.push_rows(vec![movie(603, "The Matrix", 8.2, 95.5)]);

    let call = ToolCall::parse("search_movies_by_title", json!({"title": "MATRIX", "limit": 2.9}))
        .unwrap();
    let out = dispatch(&service, call).await.unwrap();

    assert_eq!(out[0]["id"], json!(603));
    assert_eq!(out[0]["vote_average"], json!(8.2));
    assert_eq!(out[0]["year"], json!("1999"));
    assert_eq!(out[0]["runtime"], json!(null));
    assert_eq!(
        backend.last_query().unwrap().get_param("limit"),
        Some(&GraphValue::Integer(2))
    );
}

#[tokio::test]
async fn test_calls_after_close_fail() {
    let (backend, service) = setup(2);
    service.close().await;
    assert!(backend.is_closed());

    let err = service.list_all_genres().await.unwrap_err();
    assert!(matches!(err, RecommendError::Graph(GraphError::Closed)));
}
