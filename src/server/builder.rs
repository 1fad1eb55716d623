//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::GraphQLExposure;
use super::host::ServerHost;
use crate::config::{EngineConfig, StoreBackend};
use crate::core::auth::AuthPolicy;
use crate::core::context::ContextBuilder;
use crate::core::entity::{Actor, Movie};
use crate::core::store::EntityStore;
use crate::storage::{InMemoryStore, seed};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builder for the GraphQL server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_movie_store(InMemoryStore::with_records(seed::movies()))
///     .with_actor_store(InMemoryStore::with_records(seed::actors()))
///     .build()?;
/// ```
pub struct ServerBuilder {
    movies: Option<Arc<dyn EntityStore<Movie>>>,
    actors: Option<Arc<dyn EntityStore<Actor>>>,
    mutation_policy: AuthPolicy,
    context_builder: Option<Arc<dyn ContextBuilder>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            movies: None,
            actors: None,
            mutation_policy: AuthPolicy::default(),
            context_builder: None,
        }
    }

    /// Set the movie store (required)
    pub fn with_movie_store(mut self, store: impl EntityStore<Movie> + 'static) -> Self {
        self.movies = Some(Arc::new(store));
        self
    }

    /// Set the actor store (required)
    pub fn with_actor_store(mut self, store: impl EntityStore<Actor> + 'static) -> Self {
        self.actors = Some(Arc::new(store));
        self
    }

    /// Policy gating mutations. Defaults to [`AuthPolicy::Authenticated`].
    pub fn with_mutation_policy(mut self, policy: AuthPolicy) -> Self {
        self.mutation_policy = policy;
        self
    }

    /// Replace the header-based context builder
    pub fn with_context_builder(mut self, builder: impl ContextBuilder + 'static) -> Self {
        self.context_builder = Some(Arc::new(builder));
        self
    }

    /// Configure stores, policy and identity header from an [`EngineConfig`]
    ///
    /// The in-memory backend is seeded with the sample movies and actors when
    /// `store.seed` is set. The postgres backend connects to `store.url` and
    /// creates its tables if needed.
    pub async fn from_config(config: &EngineConfig) -> Result<Self> {
        let builder = Self::new()
            .with_mutation_policy(config.auth_policy())
            .with_context_builder(config.context_builder());

        match &config.store.backend {
            StoreBackend::InMemory => {
                let (movies, actors) = if config.store.seed {
                    (seed::movies(), seed::actors())
                } else {
                    (Vec::new(), Vec::new())
                };
                tracing::info!(
                    movies = movies.len(),
                    actors = actors.len(),
                    "Using in-memory stores"
                );
                Ok(builder
                    .with_movie_store(InMemoryStore::with_records(movies))
                    .with_actor_store(InMemoryStore::with_records(actors)))
            }
            #[cfg(feature = "postgres")]
            StoreBackend::Postgres { url } => {
                use crate::storage::{PostgresActorStore, PostgresMovieStore, ensure_schema};
                use sqlx::postgres::PgPoolOptions;

                let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
                ensure_schema(&pool).await?;
                if config.store.seed {
                    tracing::debug!("Seeding is only applied to in-memory stores");
                }
                tracing::info!("Using postgres stores");

                Ok(builder
                    .with_movie_store(PostgresMovieStore::new(pool.clone()))
                    .with_actor_store(PostgresActorStore::new(pool)))
            }
            #[cfg(not(feature = "postgres"))]
            StoreBackend::Postgres { .. } => anyhow::bail!(
                "The postgres backend is not enabled. Enable the 'postgres' feature to use it."
            ),
        }
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        let movies = self
            .movies
            .ok_or_else(|| anyhow::anyhow!("Movie store is required. Call .with_movie_store()"))?;
        let actors = self
            .actors
            .ok_or_else(|| anyhow::anyhow!("Actor store is required. Call .with_actor_store()"))?;

        let mut host = ServerHost::new(movies, actors).with_mutation_policy(self.mutation_policy);
        if let Some(context_builder) = self.context_builder {
            host.context_builder = context_builder;
        }
        Ok(host)
    }

    /// Build the final router: GraphQL routes with request tracing and CORS
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        let router = GraphQLExposure::build_router(host)?;

        Ok(router.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::from_config(&config)
    ///     .await?
    ///     .serve(&config.server.bind_addr())
    ///     .await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for Ctrl+C or SIGTERM. A signal handler that cannot be installed
/// never fires.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
