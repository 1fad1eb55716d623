//! Integration tests for the PostgreSQL stores.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool` and truncates tables before running.

#![cfg(feature = "postgres")]

use chrono::{TimeZone, Utc};
use marquee::prelude::*;
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, OnceLock};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

struct PgTestEnv {
    /// Dropping this stops the container
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// Process-global so the container outlives each `#[tokio::test]` runtime
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    ensure_schema(&pool).await.expect("Failed to create schema");
    // idempotent
    ensure_schema(&pool).await.expect("Second ensure_schema failed");
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

/// Fresh pool on the current runtime, with empty tables
async fn clean_pool() -> PgPool {
    let env = init_pg_env().await;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL");

    sqlx::query("TRUNCATE movies, actors")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");
    pool
}

async fn seeded_stores() -> (PostgresMovieStore, PostgresActorStore) {
    let pool = clean_pool().await;
    let movies = PostgresMovieStore::new(pool.clone());
    let actors = PostgresActorStore::new(pool);

    for actor in seed::actors() {
        actors
            .create(ActorInput {
                id: Some(actor.id),
                name: actor.name,
            })
            .await
            .unwrap();
    }
    for movie in seed::movies() {
        movies
            .create(MovieInput {
                id: Some(movie.id),
                title: movie.title,
                release_date: movie.release_date,
                rating: movie.rating,
                status: movie.status,
                actor: Some(movie.actor),
            })
            .await
            .unwrap();
    }
    (movies, actors)
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_movie_round_trip() {
    let (movies, _) = seeded_stores().await;

    let aladdin = movies.find_by_id("naeeurehnin").await.unwrap().unwrap();
    assert_eq!(aladdin, seed::movies()[0]);
    assert_eq!(
        aladdin.release_date,
        Some(Utc.with_ymd_and_hms(1992, 11, 25, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_find_all_keeps_insertion_order() {
    let (movies, actors) = seeded_stores().await;

    let ids: Vec<_> = movies
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["naeeurehnin", "vnyhiorvn"]);

    let names: Vec<_> = actors
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Robin Williams", "Scott Weinger"]);
}

#[tokio::test]
async fn test_find_by_id_missing_is_none() {
    let (movies, actors) = seeded_stores().await;
    assert!(movies.find_by_id("doesnotexist").await.unwrap().is_none());
    assert!(actors.find_by_id("doesnotexist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_generates_id_and_stores_references() {
    let (movies, _) = seeded_stores().await;

    let created = movies
        .create(MovieInput {
            title: Some("Hook".to_string()),
            actor: Some(vec![ActorRef::new("robin"), ActorRef::new("ghost")]),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id.len(), 36);
    let stored = movies.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.actor_ids().collect::<Vec<_>>(), vec!["robin", "ghost"]);
    assert_eq!(movies.find_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_closed_pool_is_store_unavailable() {
    let (movies, _) = seeded_stores().await;
    movies.pool().close().await;

    let err = movies.find_all().await.unwrap_err();
    assert!(err.is_store_failure());
}

// ---------------------------------------------------------------------------
// Executor over postgres
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_executor_over_postgres() {
    let (movies, actors) = seeded_stores().await;
    let executor = GraphQLExecutor::new(Arc::new(ServerHost::new(
        Arc::new(movies),
        Arc::new(actors),
    )))
    .unwrap();

    let response = executor
        .execute(
            GraphQLRequest::new(
                r#"mutation {
                    addMovie(movie: { id: "hook", title: "Hook", actor: [{ id: "robin" }] }) {
                        id actor { name }
                    }
                }"#,
            ),
            OperationContext::with_caller("alice"),
        )
        .await
        .unwrap();

    assert!(response.errors.is_empty());
    assert_eq!(
        response.data["addMovie"][2],
        json!({ "id": "hook", "actor": [{ "name": "Robin Williams" }] })
    );

    let response = executor
        .execute(
            GraphQLRequest::new(r#"{ movie(id: "naeeurehnin") { actor { name } } }"#),
            OperationContext::anonymous(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.data,
        json!({ "movie": { "actor": [{ "name": "Robin Williams" }] } })
    );
}
