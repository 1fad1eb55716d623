//! Server module for building the GraphQL HTTP server
//!
//! - [`ServerHost`] holds the engine state shared by every request
//! - [`ServerBuilder`] assembles a host from stores or configuration and
//!   serves it
//! - [`exposure`] turns a host into routes

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::GraphQLExposure;
pub use host::ServerHost;
