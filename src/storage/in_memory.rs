//! In-memory implementation of EntityStore for development and tests

use crate::core::entity::Entity;
use crate::core::error::{EngineError, EngineResult};
use crate::core::store::EntityStore;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in_memory";

/// In-memory entity store
///
/// Holds one ordered sequence per entity kind. Reads take a shared lock,
/// `create` takes the write lock, so concurrent creates are serialized and
/// none of them is lost. Clones share the same sequence.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> InMemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a store pre-filled with `records`, kept in the given order
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryStore<T> {
    async fn find_all(&self) -> EngineResult<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| EngineError::unavailable(BACKEND, format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.clone())
    }

    async fn find_by_id(&self, id: &str) -> EngineResult<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| EngineError::unavailable(BACKEND, format!("Failed to acquire read lock: {}", e)))?;

        Ok(records.iter().find(|record| record.id() == id).cloned())
    }

    async fn create(&self, input: T::Input) -> EngineResult<T> {
        let entity = T::from_input(input);

        let mut records = self
            .records
            .write()
            .map_err(|e| EngineError::unavailable(BACKEND, format!("Failed to acquire write lock: {}", e)))?;

        records.push(entity.clone());

        tracing::debug!(entity_type = T::type_name(), id = %entity.id(), "Created entity");
        Ok(entity)
    }
}
