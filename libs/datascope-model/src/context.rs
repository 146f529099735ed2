use std::sync::Arc;

use crate::effective_scope::EffectiveScope;
use crate::unit_set::PrincipalId;

/// `ScopeContext` carries a resolved scope through one request.
///
/// Built once per request after the engine resolves the principal's
/// [`EffectiveScope`], then passed explicitly to every query that must be
/// filtered. Cloning is cheap: the scope is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ScopeContext {
    principal_id: PrincipalId,
    scope: Arc<EffectiveScope>,
}

impl ScopeContext {
    /// Create a new `ScopeContext` builder
    #[must_use]
    pub fn builder() -> ScopeContextBuilder {
        ScopeContextBuilder::default()
    }

    /// Context for the given principal and an already resolved scope.
    #[must_use]
    pub fn new(principal_id: PrincipalId, scope: EffectiveScope) -> Self {
        Self {
            principal_id,
            scope: Arc::new(scope),
        }
    }

    /// Context with no principal and a scope that matches nothing.
    #[must_use]
    pub fn anonymous() -> Self {
        ScopeContextBuilder::default().build()
    }

    /// The principal whose scope this is (used for the owner predicate).
    #[must_use]
    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    #[must_use]
    pub fn scope(&self) -> &EffectiveScope {
        &self.scope
    }

    /// Shared handle to the scope, for handing to spawned work.
    #[must_use]
    pub fn scope_arc(&self) -> Arc<EffectiveScope> {
        Arc::clone(&self.scope)
    }
}

#[derive(Default)]
pub struct ScopeContextBuilder {
    principal_id: Option<PrincipalId>,
    scope: Option<Arc<EffectiveScope>>,
}

impl ScopeContextBuilder {
    #[must_use]
    pub fn principal_id(mut self, principal_id: PrincipalId) -> Self {
        self.principal_id = Some(principal_id);
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: EffectiveScope) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    #[must_use]
    pub fn shared_scope(mut self, scope: Arc<EffectiveScope>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Missing fields fall back to principal `0` and the deny-all scope.
    #[must_use]
    pub fn build(self) -> ScopeContext {
        ScopeContext {
            principal_id: self.principal_id.unwrap_or_default(),
            scope: self.scope.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn anonymous_context_denies_everything() {
        let ctx = ScopeContext::anonymous();
        assert_eq!(ctx.principal_id(), 0);
        assert!(ctx.scope().is_deny_all());
    }

    #[test]
    fn builder_keeps_principal_and_scope() {
        let ctx = ScopeContext::builder()
            .principal_id(42)
            .scope(EffectiveScope::new(false, [3]))
            .build();

        assert_eq!(ctx.principal_id(), 42);
        assert!(ctx.scope().contains_unit(3));
    }

    #[test]
    fn clones_share_the_scope() {
        let ctx = ScopeContext::new(1, EffectiveScope::all());
        let other = ctx.clone();
        assert!(Arc::ptr_eq(&ctx.scope_arc(), &other.scope_arc()));
    }
}
