//! Relational resolution between movies and actors
//!
//! A [`Movie`] only holds `{id}` references to actors. The join happens here,
//! at read time, against whatever actor store the host was built with.

use crate::core::entity::{Actor, Movie};
use crate::core::error::EngineResult;
use crate::core::store::EntityStore;
use std::collections::HashSet;
use std::sync::Arc;

/// Joins a movie's actor references to rows of the actor store
#[derive(Clone)]
pub struct RelationalResolver {
    actors: Arc<dyn EntityStore<Actor>>,
}

impl RelationalResolver {
    pub fn new(actors: Arc<dyn EntityStore<Actor>>) -> Self {
        Self { actors }
    }

    /// Resolve the actors referenced by `movie`.
    ///
    /// Output follows actor-store order, not reference order. Ids with no
    /// matching actor are dropped; each id yields at most one actor.
    pub async fn resolve_actors_for(&self, movie: &Movie) -> EngineResult<Vec<Actor>> {
        let wanted: HashSet<&str> = movie.actor_ids().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let actors = self.actors.find_all().await?;
        let mut seen = HashSet::new();
        let resolved: Vec<Actor> = actors
            .into_iter()
            .filter(|actor| wanted.contains(actor.id.as_str()) && seen.insert(actor.id.clone()))
            .collect();

        if resolved.len() < wanted.len() {
            tracing::debug!(
                movie_id = %movie.id,
                referenced = wanted.len(),
                resolved = resolved.len(),
                "Dropping dangling actor references"
            );
        }

        Ok(resolved)
    }
}
