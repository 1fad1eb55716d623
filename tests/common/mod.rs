//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use marquee::prelude::*;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store whose backend is always down
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn fail<T>(&self) -> EngineResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::unavailable("failing", "connection refused"))
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for FailingStore {
    async fn find_all(&self) -> EngineResult<Vec<T>> {
        self.fail()
    }

    async fn find_by_id(&self, _id: &str) -> EngineResult<Option<T>> {
        self.fail()
    }

    async fn create(&self, _input: T::Input) -> EngineResult<T> {
        self.fail()
    }
}

/// Seeded in-memory stores
pub fn seeded_host() -> ServerHost {
    ServerHost::new(
        Arc::new(InMemoryStore::with_records(seed::movies())),
        Arc::new(InMemoryStore::with_records(seed::actors())),
    )
}

pub fn executor(host: ServerHost) -> GraphQLExecutor {
    GraphQLExecutor::new(Arc::new(host)).expect("movie schema should build")
}

/// Run `query` anonymously and return the response JSON
pub async fn run(executor: &GraphQLExecutor, query: &str) -> Value {
    run_as(executor, query, OperationContext::anonymous()).await
}

pub async fn run_as(executor: &GraphQLExecutor, query: &str, context: OperationContext) -> Value {
    executor
        .execute(GraphQLRequest::new(query), context)
        .await
        .expect("request should execute")
        .to_json()
}
