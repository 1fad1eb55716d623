//! Resolver registry
//!
//! Resolvers are plain function pointers keyed by `(type, field)`. The map
//! is built once when the executor is created; fields without an entry are
//! read straight off the parent value.

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::{mutation_executor, query_executor};
use crate::core::context::OperationContext;
use crate::server::host::ServerHost;

/// Everything a resolver gets to see
#[derive(Clone)]
pub struct ResolverContext {
    /// Engine state (stores, policy)
    pub host: Arc<ServerHost>,

    /// Internal value of the parent object (`null` for root fields)
    pub parent: Value,

    /// Coerced arguments. Arguments that were not provided and have no
    /// default are absent.
    pub args: Map<String, Value>,

    /// Context shared by every resolver of the current operation
    pub operation: Arc<OperationContext>,
}

impl ResolverContext {
    /// Argument by name, treating explicit `null` as absent
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }
}

/// A field resolver
pub type ResolverFn = fn(ResolverContext) -> BoxFuture<'static, Result<Value>>;

/// `(type name, field name) -> resolver`
#[derive(Clone, Default)]
pub struct ResolverMap {
    resolvers: HashMap<(String, String), ResolverFn>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolvers for the movie schema
    pub fn movies() -> Self {
        let mut map = Self::new();
        map.register("Query", "movies", query_executor::movies);
        map.register("Query", "movie", query_executor::movie);
        map.register("Movie", "actor", query_executor::movie_actors);
        map.register("Mutation", "addMovie", mutation_executor::add_movie);
        map
    }

    /// Register (or replace) the resolver of `type_name.field_name`
    pub fn register(&mut self, type_name: &str, field_name: &str, resolver: ResolverFn) {
        self.resolvers
            .insert((type_name.to_string(), field_name.to_string()), resolver);
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<ResolverFn> {
        self.resolvers
            .get(&(type_name.to_string(), field_name.to_string()))
            .copied()
    }

    /// Registered `(type, field)` pairs
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resolvers
            .keys()
            .map(|(type_name, field_name)| (type_name.as_str(), field_name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
