//! Authorization policies for writes
//!
//! The engine does not authenticate anyone. It only decides, from the
//! identity already present in the [`OperationContext`], whether a write may
//! proceed.

use crate::core::context::OperationContext;

/// Authorization policy for an operation
#[derive(Debug, Clone, Default)]
pub enum AuthPolicy {
    /// Public access (no identity required)
    Public,

    /// Any caller with a non-empty identity
    #[default]
    Authenticated,

    /// Custom policy function
    Custom(fn(&OperationContext) -> bool),
}

impl AuthPolicy {
    /// Check if the operation context satisfies this policy
    pub fn check(&self, context: &OperationContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => context.is_authenticated(),

            AuthPolicy::Custom(f) => f(context),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            _ => AuthPolicy::Authenticated, // Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_check() {
        let caller = OperationContext::with_caller("jane");
        let anon = OperationContext::anonymous();

        assert!(AuthPolicy::Authenticated.check(&caller));
        assert!(!AuthPolicy::Authenticated.check(&anon));
        assert!(AuthPolicy::Public.check(&anon));
    }

    #[test]
    fn test_empty_identity_is_refused() {
        assert!(!AuthPolicy::Authenticated.check(&OperationContext::with_caller("")));
    }

    #[test]
    fn test_custom_policy() {
        fn only_admins(ctx: &OperationContext) -> bool {
            ctx.caller() == Some("admin")
        }
        let policy = AuthPolicy::Custom(only_admins);
        assert!(policy.check(&OperationContext::with_caller("admin")));
        assert!(!policy.check(&OperationContext::with_caller("jane")));
    }

    #[test]
    fn test_policy_from_str() {
        assert!(matches!(AuthPolicy::parse_policy("public"), AuthPolicy::Public));
        assert!(matches!(
            AuthPolicy::parse_policy("authenticated"),
            AuthPolicy::Authenticated
        ));
        // Unknown values fall back to the strict default
        assert!(matches!(
            AuthPolicy::parse_policy("everyone"),
            AuthPolicy::Authenticated
        ));
        assert!(matches!(AuthPolicy::default(), AuthPolicy::Authenticated));
    }
}
