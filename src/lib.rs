//! # Marquee
//!
//! A GraphQL resolution engine serving a typed graph of movies and actors.
//!
//! ## Features
//!
//! - **Declarative schema**: the SDL is parsed once into a type/field model
//! - **Resolver map**: `(type, field) -> fn` dispatch built at startup
//! - **Custom scalars**: `Date` travels as epoch milliseconds on the wire
//! - **Relational resolution**: `Movie.actor` joins id references to the
//!   actor store at read time
//! - **Pluggable stores**: in-memory or PostgreSQL behind one trait
//! - **Gated mutations**: writes are checked against an `AuthPolicy`
//! - **Field-level isolation**: a failing field becomes `null` plus an error
//!   entry, its siblings still resolve
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marquee::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_movie_store(InMemoryStore::with_records(seed::movies()))
//!         .with_actor_store(InMemoryStore::with_records(seed::actors()))
//!         .serve("127.0.0.1:4000")
//!         .await
//! }
//! ```
//!
//! Then:
//!
//! ```text
//! curl -X POST localhost:4000/graphql \
//!   -H 'content-type: application/json' \
//!   -d '{"query":"{ movie(id: \"naeeurehnin\") { title actor { name } } }"}'
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::AuthPolicy,
        context::{AnonymousContextBuilder, ContextBuilder, HeaderContextBuilder, OperationContext},
        entity::{Actor, ActorInput, ActorRef, Entity, Movie, MovieInput, Status},
        error::{EngineError, EngineResult},
        relation::RelationalResolver,
        scalar::{DateScalar, ScalarCodec, ScalarRegistry},
        store::EntityStore,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryStore, seed};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresActorStore, PostgresMovieStore, ensure_schema};

    // === Config ===
    pub use crate::config::{EngineConfig, ServerConfig, StoreBackend, StoreConfig};

    // === Server ===
    pub use crate::server::exposure::graphql::{
        GraphQLExecutor, GraphQLRequest, GraphQLResponse, MOVIES_SDL, ResolverContext,
        ResolverMap, SchemaModel,
    };
    pub use crate::server::{GraphQLExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{Router, http::HeaderMap};
}
