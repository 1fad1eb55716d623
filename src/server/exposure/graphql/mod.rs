//! GraphQL API exposure
//!
//! This module provides the GraphQL routes around the executor. The routes
//! hold no resolution logic: they build the operation context from the
//! request headers, hand the request to the executor and shape the HTTP
//! response.

mod executor;
mod schema;

pub use executor::{
    Coercer, FieldError, GraphQLExecutor, GraphQLRequest, GraphQLResponse, PathSegment,
    ResolverContext, ResolverFn, ResolverMap, apply_add_movie,
};
pub use schema::{
    BUILTIN_SCALARS, FieldDef, InputValueDef, MOVIES_SDL, SchemaModel, TypeKind, TypeRef,
};

use crate::core::context::OperationContext;
use crate::server::host::ServerHost;
use anyhow::Result;
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use axum::{
    Router,
    extract::{Extension, Json as AxumJson},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// Returns an Axum router with:
    /// - `POST /graphql`: query and mutation endpoint
    /// - `GET /graphql/playground`: GraphQL playground
    /// - `GET /graphql/schema`: schema SDL
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = builder.build_host()?;
    /// let graphql_app = GraphQLExposure::build_router(host)?;
    /// ```
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let executor = Arc::new(GraphQLExecutor::new(host)?);

        let router = Router::new()
            .route("/graphql", post(graphql_handler))
            .route("/graphql/playground", get(graphql_playground))
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(executor));

        Ok(router)
    }
}

/// Handler for GraphQL queries and mutations
async fn graphql_handler(
    Extension(executor): Extension<Arc<GraphQLExecutor>>,
    headers: HeaderMap,
    AxumJson(request): AxumJson<GraphQLRequest>,
) -> Response {
    let context = match executor.host().context_builder.build(&headers).await {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build operation context, continuing anonymously");
            OperationContext::anonymous()
        }
    };

    match executor.execute(request, context).await {
        Ok(response) => AxumJson(response.to_json()).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "GraphQL request rejected");
            (
                StatusCode::BAD_REQUEST,
                AxumJson(json!({
                    "errors": [{
                        "message": e.to_string()
                    }]
                })),
            )
                .into_response()
        }
    }
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(executor): Extension<Arc<GraphQLExecutor>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        executor.sdl().to_string(),
    )
}
