//! GraphQL executor module
//!
//! This module contains the custom GraphQL executor that runs operations
//! against the parsed schema model.
//!
//! The executor is split into several sub-modules:
//! - `core`: Main executor orchestration (operation selection, variables)
//! - `field_resolver`: Field collection, resolution and value completion
//! - `coercion`: Argument and leaf value coercion
//! - `resolvers`: The `(type, field) -> resolver` registry
//! - `query_executor`: Query resolvers
//! - `mutation_executor`: Mutation resolvers
//! - `response`: Request and response envelopes
//! - `utils`: Utility functions

mod coercion;
mod core;
mod field_resolver;
mod mutation_executor;
mod query_executor;
mod resolvers;
mod response;
pub(crate) mod utils;

pub use self::core::GraphQLExecutor;
pub use coercion::Coercer;
pub use mutation_executor::apply_add_movie;
pub use resolvers::{ResolverContext, ResolverFn, ResolverMap};
pub use response::{FieldError, GraphQLRequest, GraphQLResponse, PathSegment};
