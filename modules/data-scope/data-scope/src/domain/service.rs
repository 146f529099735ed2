//! Versioned scope cache in front of the calculator.

use std::sync::Arc;

use datascope_model::{EffectiveScope, PrincipalId, RoleId};
use tracing::{debug, warn};

use super::calculator::{calculate, needs_hierarchy};
use super::error::DomainError;
use super::hierarchy::HierarchyIndex;
use super::repo::{
    PrincipalRepository, RoleRepository, ScopeCacheStore, TreeVersionStore, UnitRepository,
};
use crate::config::CacheConfig;

/// The durable stores a scope is computed from.
#[derive(Clone)]
pub struct Directory {
    pub principals: Arc<dyn PrincipalRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub units: Arc<dyn UnitRepository>,
    pub versions: Arc<dyn TreeVersionStore>,
}

impl Directory {
    /// Use one store for all four ports.
    #[must_use]
    pub fn from_shared<T>(store: &Arc<T>) -> Self
    where
        T: PrincipalRepository + RoleRepository + UnitRepository + TreeVersionStore + 'static,
    {
        Self {
            principals: store.clone(),
            roles: store.clone(),
            units: store.clone(),
            versions: store.clone(),
        }
    }
}

/// Scope resolution service.
///
/// A cached entry is served only while its stamped tree version equals the
/// current one. The version is an invalidation token, not a lock: a read
/// racing a tree mutation may still return the previous scope, and the next
/// read that sees the bumped version recomputes. Likewise an eviction landing
/// between a concurrent read's store loads and its cache write is lost: that
/// stale scope stays cached until the next version bump or eviction.
pub struct Service {
    directory: Directory,
    cache: Arc<dyn ScopeCacheStore>,
    config: CacheConfig,
}

impl Service {
    #[must_use]
    pub fn new(directory: Directory, cache: Arc<dyn ScopeCacheStore>, config: CacheConfig) -> Self {
        Self {
            directory,
            cache,
            config,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Resolve the effective scope of `principal_id`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the principal, role or unit stores fail.
    /// Cache and version-store failures degrade to recomputation.
    #[tracing::instrument(skip_all, fields(principal_id = principal_id))]
    pub async fn get_effective_scope(
        &self,
        principal_id: PrincipalId,
    ) -> Result<EffectiveScope, DomainError> {
        let version = match self.directory.versions.current().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "tree version unavailable, bypassing scope cache");
                None
            }
        };

        // without a version there is no way to prove an entry fresh
        let cacheable = self.config.enabled && version.is_some();
        let version = version.unwrap_or(0);

        if cacheable && let Some(scope) = self.cached(principal_id, version).await {
            return Ok(scope);
        }

        let scope = self.compute(principal_id, version).await?;

        if cacheable && let Err(e) = self.cache.put(principal_id, &scope).await {
            warn!(error = %e, "failed to store effective scope");
        }
        Ok(scope)
    }

    async fn cached(&self, principal_id: PrincipalId, version: u64) -> Option<EffectiveScope> {
        match self.cache.get(principal_id).await {
            Ok(Some(scope)) if scope.tree_version() == version => {
                debug!(tree_version = version, "scope cache hit");
                Some(scope)
            }
            Ok(Some(scope)) => {
                debug!(
                    cached_version = scope.tree_version(),
                    tree_version = version,
                    "stale scope cache entry"
                );
                None
            }
            Ok(None) => {
                debug!("scope cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "scope cache read failed, recomputing");
                None
            }
        }
    }

    async fn compute(
        &self,
        principal_id: PrincipalId,
        version: u64,
    ) -> Result<EffectiveScope, DomainError> {
        let principal = self
            .directory
            .principals
            .find_principal(principal_id)
            .await?;

        let roles = match &principal {
            Some(p) if !p.role_ids.is_empty() => self.directory.roles.find_roles(&p.role_ids).await?,
            _ => Vec::new(),
        };

        let index = if needs_hierarchy(principal.as_ref(), &roles) {
            let units = self.directory.units.list_units().await?;
            HierarchyIndex::build(&units)
        } else {
            HierarchyIndex::default()
        };

        if principal.is_none() {
            debug!("unknown principal, falling back to self-only scope");
        }

        Ok(calculate(principal.as_ref(), &roles, &index, version))
    }

    /// Drop the cached scope of one principal.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Cache`] if the cache store rejects the removal.
    #[tracing::instrument(skip_all, fields(principal_id = principal_id))]
    pub async fn evict(&self, principal_id: PrincipalId) -> Result<(), DomainError> {
        self.cache.remove(principal_id).await?;
        debug!("evicted effective scope");
        Ok(())
    }

    /// Drop the cached scopes of several principals.
    ///
    /// Every id is attempted; the first failure is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first cache error encountered.
    #[tracing::instrument(skip_all, fields(count = principal_ids.len()))]
    pub async fn evict_many(&self, principal_ids: &[PrincipalId]) -> Result<(), DomainError> {
        let mut first_err = None;
        for &principal_id in principal_ids {
            if let Err(e) = self.cache.remove(principal_id).await {
                warn!(principal_id, error = %e, "failed to evict effective scope");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Evict every holder of `role_id`.
    ///
    /// # Errors
    ///
    /// Fails if the holders cannot be listed or an eviction fails.
    #[tracing::instrument(skip_all, fields(role_id = role_id))]
    pub async fn on_role_changed(&self, role_id: RoleId) -> Result<(), DomainError> {
        let holders = self.directory.roles.holders_of_role(role_id).await?;
        debug!(holders = holders.len(), "role changed, evicting holders");
        self.evict_many(&holders).await
    }

    /// The role set or department of `principal_id` changed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Cache`] if the eviction fails.
    pub async fn on_principal_roles_changed(
        &self,
        principal_id: PrincipalId,
    ) -> Result<(), DomainError> {
        self.evict(principal_id).await
    }
}
