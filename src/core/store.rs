//! Store trait shared by every persistence backend

use crate::core::entity::Entity;
use crate::core::error::EngineResult;
use async_trait::async_trait;

/// Storage abstraction for one entity kind
///
/// The in-memory and the durable backends implement the same contract, so
/// resolvers never know which one they are talking to.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// List every entity.
    ///
    /// Order is stable within one store instance. Backend failures are
    /// reported as `EngineError::StoreUnavailable`.
    async fn find_all(&self) -> EngineResult<Vec<T>>;

    /// Get an entity by id. Absence is `Ok(None)`, not an error.
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<T>>;

    /// Create a new entity from its payload and return it
    async fn create(&self, input: T::Input) -> EngineResult<T>;
}
