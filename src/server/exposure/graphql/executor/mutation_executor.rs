//! Mutation resolvers

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::resolvers::ResolverContext;
use crate::core::context::OperationContext;
use crate::core::entity::{Movie, MovieInput};
use crate::server::host::ServerHost;

/// `Mutation.addMovie(movie)`
pub fn add_movie(ctx: ResolverContext) -> BoxFuture<'static, Result<Value>> {
    async move {
        let input = ctx
            .arg("movie")
            .cloned()
            .map(serde_json::from_value::<MovieInput>)
            .transpose()?;

        let movies = apply_add_movie(&ctx.host, input, &ctx.operation).await;
        Ok(serde_json::to_value(movies)?)
    }
    .boxed()
}

/// Create a movie if the caller passes the mutation policy, then return the
/// whole collection.
///
/// - Caller rejected, or no input: no write, the current collection is
///   returned unchanged.
/// - Any store failure during the write or the refresh: empty list.
pub async fn apply_add_movie(
    host: &ServerHost,
    input: Option<MovieInput>,
    context: &OperationContext,
) -> Vec<Movie> {
    if !host.mutation_policy.check(context) {
        tracing::debug!(
            caller = ?context.caller(),
            "addMovie: caller not authorized, skipping write"
        );
        return current_movies(host).await;
    }

    let Some(input) = input else {
        tracing::debug!("addMovie: no movie given, skipping write");
        return current_movies(host).await;
    };

    match host.movies.create(input).await {
        Ok(movie) => {
            tracing::info!(movie_id = %movie.id, caller = ?context.caller(), "movie added");
        }
        Err(e) => {
            tracing::warn!(error = %e, "addMovie: create failed, returning an empty list");
            return Vec::new();
        }
    }

    current_movies(host).await
}

async fn current_movies(host: &ServerHost) -> Vec<Movie> {
    host.movies.find_all().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "addMovie: store read failed, returning an empty list");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::AuthPolicy;
    use crate::core::entity::Status;
    use crate::storage::{InMemoryStore, seed};
    use std::sync::Arc;

    fn seeded_host() -> ServerHost {
        ServerHost::new(
            Arc::new(InMemoryStore::with_records(seed::movies())),
            Arc::new(InMemoryStore::with_records(seed::actors())),
        )
    }

    fn hook() -> MovieInput {
        MovieInput {
            title: Some("Hook".to_string()),
            rating: Some(5),
            status: Some(Status::Interested),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_anonymous_caller_gets_unchanged_collection() {
        let host = seeded_host();
        let before = host.movies.find_all().await.unwrap();

        let result = apply_add_movie(&host, Some(hook()), &OperationContext::anonymous()).await;

        assert_eq!(result, before);
        assert_eq!(host.movies.find_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_blank_identity_is_anonymous() {
        let host = seeded_host();
        let result =
            apply_add_movie(&host, Some(hook()), &OperationContext::with_caller("  ")).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_authenticated_caller_adds_movie() {
        let host = seeded_host();
        let result =
            apply_add_movie(&host, Some(hook()), &OperationContext::with_caller("alice")).await;

        assert_eq!(result.len(), 3);
        let added = &result[2];
        assert_eq!(added.title.as_deref(), Some("Hook"));
        assert_eq!(added.rating, Some(5));
        assert_eq!(added.status, Some(Status::Interested));
        assert!(!added.id.is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_is_a_no_op() {
        let host = seeded_host();
        let result = apply_add_movie(&host, None, &OperationContext::with_caller("alice")).await;
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_public_policy_accepts_anonymous() {
        let host = seeded_host().with_mutation_policy(AuthPolicy::Public);
        let result = apply_add_movie(&host, Some(hook()), &OperationContext::anonymous()).await;
        assert_eq!(result.len(), 3);
    }
}
