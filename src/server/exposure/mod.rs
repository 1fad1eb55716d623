//! API Exposure modules
//!
//! Each exposure consumes a `ServerHost` and produces a Router for its
//! protocol.

pub mod graphql;

pub use graphql::GraphQLExposure;
