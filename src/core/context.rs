//! Per-operation context
//!
//! An [`OperationContext`] is built fresh for every inbound operation by a
//! [`ContextBuilder`] and handed to every resolver invoked while executing
//! that operation. It is never stored and never shared between operations.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::HeaderMap;

/// State visible to all resolvers of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    caller: Option<String>,
}

impl OperationContext {
    /// Context without a caller identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context carrying a caller identity.
    ///
    /// A blank identity is treated as no identity at all.
    pub fn with_caller(caller: impl Into<String>) -> Self {
        let caller = caller.into();
        Self {
            caller: (!caller.trim().is_empty()).then_some(caller),
        }
    }

    /// The resolved caller identity, if any
    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    /// Whether a non-empty caller identity is present
    pub fn is_authenticated(&self) -> bool {
        self.caller.is_some()
    }
}

/// Builds an [`OperationContext`] from an inbound request
#[async_trait]
pub trait ContextBuilder: Send + Sync {
    /// Derive the context from the request headers
    async fn build(&self, headers: &HeaderMap) -> Result<OperationContext>;
}

/// Reads the caller identity verbatim from one request header.
///
/// Authentication is someone else's job: whatever value the header carries
/// is taken as the already-resolved identity.
#[derive(Debug, Clone)]
pub struct HeaderContextBuilder {
    header: String,
}

impl HeaderContextBuilder {
    pub const DEFAULT_HEADER: &'static str = "authorization";

    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }
}

impl Default for HeaderContextBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HEADER)
    }
}

#[async_trait]
impl ContextBuilder for HeaderContextBuilder {
    async fn build(&self, headers: &HeaderMap) -> Result<OperationContext> {
        match headers.get(self.header.as_str()) {
            None => Ok(OperationContext::anonymous()),
            Some(value) => {
                let caller = value
                    .to_str()
                    .map_err(|e| anyhow!("Header '{}' is not valid text: {}", self.header, e))?;
                Ok(OperationContext::with_caller(caller))
            }
        }
    }
}

/// Builder that never yields an identity (read-only deployments, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousContextBuilder;

#[async_trait]
impl ContextBuilder for AnonymousContextBuilder {
    async fn build(&self, _headers: &HeaderMap) -> Result<OperationContext> {
        Ok(OperationContext::anonymous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_blank_caller_is_anonymous() {
        assert!(!OperationContext::with_caller("").is_authenticated());
        assert!(!OperationContext::with_caller("   ").is_authenticated());
        assert_eq!(OperationContext::with_caller("   "), OperationContext::anonymous());
    }

    #[test]
    fn test_any_caller_is_authenticated() {
        let ctx = OperationContext::with_caller("Bearer abc");
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.caller(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_header_builder_reads_identity() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("jane"));

        let ctx = HeaderContextBuilder::default().build(&headers).await.unwrap();
        assert_eq!(ctx.caller(), Some("jane"));
    }

    #[tokio::test]
    async fn test_header_builder_custom_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-caller", HeaderValue::from_static("svc-importer"));

        let builder = HeaderContextBuilder::new("X-Caller");
        assert_eq!(builder.header(), "x-caller");
        let ctx = builder.build(&headers).await.unwrap();
        assert_eq!(ctx.caller(), Some("svc-importer"));
    }

    #[tokio::test]
    async fn test_header_builder_without_header() {
        let ctx = HeaderContextBuilder::default()
            .build(&HeaderMap::new())
            .await
            .unwrap();
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_header_builder_rejects_opaque_bytes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap(),
        );
        assert!(HeaderContextBuilder::default().build(&headers).await.is_err());
    }

    #[tokio::test]
    async fn test_anonymous_builder() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("jane"));
        let ctx = AnonymousContextBuilder.build(&headers).await.unwrap();
        assert_eq!(ctx, OperationContext::anonymous());
    }
}
