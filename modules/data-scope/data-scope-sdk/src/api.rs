//! Public API trait for the data-scope engine.

use async_trait::async_trait;
use datascope_model::{EffectiveScope, PrincipalId, RoleId, ScopeContext};

use crate::error::DataScopeError;

/// Public API trait for resolving and invalidating effective data scopes.
///
/// Business services resolve a scope per request and hand it to the
/// predicate binder:
///
/// ```ignore
/// let ctx = scopes.resolve_context(current_principal).await?;
/// let rows = Entity::find().secure().scope_with(&ctx).all(&conn).await?;
/// ```
///
/// Role-mutation and reassignment workflows call the invalidation hooks
/// after their own transaction commits.
#[async_trait]
pub trait DataScopeClient: Send + Sync {
    /// Return the effective scope of `principal_id`, served from cache when
    /// the cached entry matches the current tree version.
    ///
    /// An unknown principal resolves to a self-only scope, not an error.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if principal, role or unit data cannot be read
    /// - `Internal` for unexpected errors
    async fn get_effective_scope(
        &self,
        principal_id: PrincipalId,
    ) -> Result<EffectiveScope, DataScopeError>;

    /// Resolve the scope and wrap it in a per-request [`ScopeContext`].
    ///
    /// # Errors
    ///
    /// Same as [`DataScopeClient::get_effective_scope`].
    async fn resolve_context(
        &self,
        principal_id: PrincipalId,
    ) -> Result<ScopeContext, DataScopeError> {
        let scope = self.get_effective_scope(principal_id).await?;
        Ok(ScopeContext::new(principal_id, scope))
    }

    /// Drop the cached scope of one principal. Idempotent.
    ///
    /// # Errors
    ///
    /// `Internal` if the cache store rejects the removal.
    async fn evict(&self, principal_id: PrincipalId) -> Result<(), DataScopeError>;

    /// Drop the cached scopes of several principals.
    ///
    /// # Errors
    ///
    /// `Internal` if the cache store rejects a removal.
    async fn evict_many(&self, principal_ids: &[PrincipalId]) -> Result<(), DataScopeError>;

    /// A role's declaration, status or deletion flag changed: evict every
    /// principal holding it.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if the holders of the role cannot be listed
    /// - `Internal` if the cache store rejects a removal
    async fn on_role_changed(&self, role_id: RoleId) -> Result<(), DataScopeError>;

    /// The role set or department of a principal changed.
    ///
    /// # Errors
    ///
    /// `Internal` if the cache store rejects the removal.
    async fn on_principal_roles_changed(
        &self,
        principal_id: PrincipalId,
    ) -> Result<(), DataScopeError> {
        self.evict(principal_id).await
    }
}
