//! Typed error handling for the marquee engine
//!
//! Errors are split by where they are recovered:
//!
//! - [`EngineError::ScalarCoercion`]: malformed value at a scalar boundary.
//!   Becomes a `null` field plus an entry in the response `errors` list.
//! - [`EngineError::StoreUnavailable`]: backend connectivity or query
//!   failure. Root resolvers and the mutation handler convert it into an
//!   empty result; it never fails a whole operation.
//! - [`EngineError::NotFound`]: an id lookup with no match, for callers that
//!   need it as an error. Stores themselves report absence as `None`.
//! - [`EngineError::Query`]: request-level failure (unparsable operation
//!   text, no runnable operation). The only kind that rejects a request.
//!
//! Unauthorized mutations are deliberately absent from this list: they are a
//! silent no-op, not a failure.
//!
//! # Example
//!
//! ```rust,ignore
//! match store.find_all().await {
//!     Ok(movies) => movies,
//!     Err(EngineError::StoreUnavailable { backend, .. }) => {
//!         tracing::warn!(%backend, "store down, serving empty list");
//!         Vec::new()
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use thiserror::Error;

/// Result alias used by stores, codecs and the schema model
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The main error type for the engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// A scalar value could not be coerced between wire and internal form
    #[error("{scalar} cannot represent value: {message}")]
    ScalarCoercion { scalar: String, message: String },

    /// The backing store could not be reached or rejected the query
    #[error("Store '{backend}' unavailable: {message}")]
    StoreUnavailable { backend: String, message: String },

    /// No entity with this id exists
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// The operation text or request shape cannot be executed
    #[error("{0}")]
    Query(String),

    /// The schema, resolver map or configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Shorthand for a scalar coercion failure
    pub fn coercion(scalar: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::ScalarCoercion {
            scalar: scalar.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a store failure
    pub fn unavailable(backend: impl Into<String>, message: impl ToString) -> Self {
        EngineError::StoreUnavailable {
            backend: backend.into(),
            message: message.to_string(),
        }
    }

    /// Stable error code, handy for logs and client-side matching
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::ScalarCoercion { .. } => "SCALAR_COERCION",
            EngineError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            EngineError::NotFound { .. } => "NOT_FOUND",
            EngineError::Query(_) => "QUERY_ERROR",
            EngineError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the error comes from the storage layer
    pub fn is_store_failure(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable { .. })
    }
}
