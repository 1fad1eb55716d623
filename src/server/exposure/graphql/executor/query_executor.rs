//! Query resolvers
//!
//! Root query resolvers absorb store failures themselves: `movies` falls
//! back to an empty list and `movie` to `null`. `Movie.actor` lets store
//! failures through so they surface as a field error.

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::resolvers::ResolverContext;
use crate::core::entity::Movie;

/// `Query.movies`
pub fn movies(ctx: ResolverContext) -> BoxFuture<'static, Result<Value>> {
    async move {
        let movies = match ctx.host.movies.find_all().await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(error = %e, "movies: store failure, returning an empty list");
                Vec::new()
            }
        };
        Ok(serde_json::to_value(movies)?)
    }
    .boxed()
}

/// `Query.movie(id)`
pub fn movie(ctx: ResolverContext) -> BoxFuture<'static, Result<Value>> {
    async move {
        let Some(id) = ctx.arg("id").and_then(Value::as_str) else {
            return Ok(Value::Null);
        };

        match ctx.host.movies.find_by_id(id).await {
            Ok(Some(movie)) => Ok(serde_json::to_value(movie)?),
            Ok(None) => {
                tracing::debug!(movie_id = %id, "movie not found");
                Ok(Value::Null)
            }
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "movie: store failure, returning null");
                Ok(Value::Null)
            }
        }
    }
    .boxed()
}

/// `Movie.actor`: join the parent's references to the actor store
pub fn movie_actors(ctx: ResolverContext) -> BoxFuture<'static, Result<Value>> {
    async move {
        let movie: Movie = serde_json::from_value(ctx.parent)?;
        let actors = ctx.host.relations().resolve_actors_for(&movie).await?;
        Ok(serde_json::to_value(actors)?)
    }
    .boxed()
}
