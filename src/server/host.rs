//! Server host for transport-agnostic API exposure
//!
//! This module provides a `ServerHost` structure that holds all engine state
//! needed to execute operations: the entity stores, the mutation policy and
//! the context builder.
//!
//! The host is instantiated once per process and passed explicitly to the
//! executor and every resolver. Nothing is captured from module scope.

use crate::core::auth::AuthPolicy;
use crate::core::context::{ContextBuilder, HeaderContextBuilder};
use crate::core::entity::{Actor, Movie};
use crate::core::relation::RelationalResolver;
use crate::core::store::EntityStore;
use std::sync::Arc;

/// Host context containing all engine state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::new(
///     Arc::new(InMemoryStore::with_records(seed::movies())),
///     Arc::new(InMemoryStore::with_records(seed::actors())),
/// );
///
/// let executor = GraphQLExecutor::new(Arc::new(host))?;
/// ```
pub struct ServerHost {
    /// Canonical movie records
    pub movies: Arc<dyn EntityStore<Movie>>,

    /// Canonical actor records
    pub actors: Arc<dyn EntityStore<Actor>>,

    /// Policy every write is checked against
    pub mutation_policy: AuthPolicy,

    /// Builds the per-operation context from inbound requests
    pub context_builder: Arc<dyn ContextBuilder>,
}

impl ServerHost {
    /// Build a host around two stores with the default policy and context
    /// builder
    pub fn new(movies: Arc<dyn EntityStore<Movie>>, actors: Arc<dyn EntityStore<Actor>>) -> Self {
        Self {
            movies,
            actors,
            mutation_policy: AuthPolicy::default(),
            context_builder: Arc::new(HeaderContextBuilder::default()),
        }
    }

    /// Replace the mutation policy
    pub fn with_mutation_policy(mut self, policy: AuthPolicy) -> Self {
        self.mutation_policy = policy;
        self
    }

    /// Replace the context builder
    pub fn with_context_builder(mut self, builder: impl ContextBuilder + 'static) -> Self {
        self.context_builder = Arc::new(builder);
        self
    }

    /// Relational resolver joining movies to this host's actor store
    pub fn relations(&self) -> RelationalResolver {
        RelationalResolver::new(self.actors.clone())
    }
}
