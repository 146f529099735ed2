//! Storage ports used by the domain services.
//!
//! The durable directory (principals, roles, units, tree version) and the
//! scope cache are separate ports so that the cache can live in a different
//! store than the source of truth.

use async_trait::async_trait;
use datascope_model::{EffectiveScope, PrincipalId, RoleId, UnitId, UnitIdSet};

use super::error::DomainError;
use super::model::{OrgUnit, Principal, Role};

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Load a principal with its scope declaration and role ids.
    async fn find_principal(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError>;

    /// Ids of principals whose own department is one of `units`.
    async fn principals_in_units(
        &self,
        units: &UnitIdSet,
    ) -> Result<Vec<PrincipalId>, DomainError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Load the roles with the given ids; unknown ids are skipped.
    async fn find_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, DomainError>;

    /// Ids of principals holding `role_id`.
    async fn holders_of_role(&self, role_id: RoleId) -> Result<Vec<PrincipalId>, DomainError>;
}

#[async_trait]
pub trait UnitRepository: Send + Sync {
    /// Every organizational unit, active or not.
    async fn list_units(&self) -> Result<Vec<OrgUnit>, DomainError>;
}

/// Global counter bumped on every structural change of the unit tree.
#[async_trait]
pub trait TreeVersionStore: Send + Sync {
    async fn current(&self) -> Result<u64, DomainError>;

    /// Increment the counter and return the new value.
    async fn bump(&self) -> Result<u64, DomainError>;
}

/// Per-principal store of computed scopes.
///
/// Purely an optimization: every error is recoverable by recomputing.
#[async_trait]
pub trait ScopeCacheStore: Send + Sync {
    async fn get(&self, principal_id: PrincipalId) -> Result<Option<EffectiveScope>, DomainError>;

    /// Overwrite the entry for `principal_id`.
    async fn put(&self, principal_id: PrincipalId, scope: &EffectiveScope)
    -> Result<(), DomainError>;

    /// Remove the entry; removing a missing entry is not an error.
    async fn remove(&self, principal_id: PrincipalId) -> Result<(), DomainError>;
}

/// Outcome of a committed tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    /// The unit as it looks after the change (before removal, for deletes).
    pub unit: OrgUnit,
    /// Units whose position in the tree changed.
    pub affected: UnitIdSet,
    /// Tree version written by the mutation's transaction.
    pub tree_version: u64,
}

/// Structural writes on the unit tree.
///
/// Each operation validates, writes and bumps the tree version atomically:
/// either everything is visible after it returns `Ok`, or nothing is.
#[async_trait]
pub trait UnitTreeStore: Send + Sync {
    async fn create_unit(&self, parent_id: UnitId, name: &str) -> Result<TreeChange, DomainError>;

    async fn move_unit(
        &self,
        unit_id: UnitId,
        new_parent_id: UnitId,
    ) -> Result<TreeChange, DomainError>;

    async fn delete_unit(&self, unit_id: UnitId) -> Result<TreeChange, DomainError>;
}
