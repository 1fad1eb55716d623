//! Core module containing the engine's fundamental traits and types

pub mod auth;
pub mod context;
pub mod entity;
pub mod error;
pub mod relation;
pub mod scalar;
pub mod store;

pub use auth::AuthPolicy;
pub use context::{AnonymousContextBuilder, ContextBuilder, HeaderContextBuilder, OperationContext};
pub use entity::{Actor, ActorInput, ActorRef, Entity, Movie, MovieInput, Status};
pub use error::{EngineError, EngineResult};
pub use relation::RelationalResolver;
pub use scalar::{DateScalar, ScalarCodec, ScalarRegistry};
pub use store::EntityStore;
