//! In-process stores: the scope cache and a directory for tests and tools.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use datascope_model::{
    EffectiveScope, PrincipalId, RoleId, UnitId, UnitIdSet, decode_scope, encode_scope,
};
use parking_lot::RwLock;

use crate::domain::unit_tree::{check_move, child_path, is_root, rebase_path};
use crate::domain::{
    DomainError, OrgUnit, Principal, PrincipalRepository, Role, RoleRepository, ScopeCacheStore,
    TreeChange, TreeVersionStore, UnitRepository, UnitTreeStore,
};

/// Scope cache backed by a sharded concurrent map.
///
/// Entries are kept in the same versioned binary form an external cache
/// would hold, so an undecodable entry behaves exactly like one.
#[derive(Default)]
pub struct InMemoryScopeCache {
    entries: DashMap<PrincipalId, Vec<u8>>,
}

impl InMemoryScopeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, principal_id: PrincipalId) -> bool {
        self.entries.contains_key(&principal_id)
    }
}

#[async_trait]
impl ScopeCacheStore for InMemoryScopeCache {
    async fn get(&self, principal_id: PrincipalId) -> Result<Option<EffectiveScope>, DomainError> {
        let Some(bytes) = self.entries.get(&principal_id) else {
            return Ok(None);
        };
        Ok(Some(decode_scope(bytes.value())?))
    }

    async fn put(
        &self,
        principal_id: PrincipalId,
        scope: &EffectiveScope,
    ) -> Result<(), DomainError> {
        let bytes = encode_scope(scope)?;
        self.entries.insert(principal_id, bytes);
        Ok(())
    }

    async fn remove(&self, principal_id: PrincipalId) -> Result<(), DomainError> {
        self.entries.remove(&principal_id);
        Ok(())
    }
}

#[derive(Default)]
struct DirectoryState {
    units: BTreeMap<UnitId, OrgUnit>,
    principals: BTreeMap<PrincipalId, Principal>,
    roles: BTreeMap<RoleId, Role>,
    version: u64,
}

impl DirectoryState {
    fn parent(&self, parent_id: UnitId) -> Result<Option<&OrgUnit>, DomainError> {
        if is_root(parent_id) {
            return Ok(None);
        }
        self.units
            .get(&parent_id)
            .map(Some)
            .ok_or(DomainError::UnitNotFound(parent_id))
    }

    fn bump(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}

/// Principals, roles, units and the tree version held in memory.
///
/// Every tree mutation runs under one write lock, which gives it the same
/// all-or-nothing visibility a database transaction gives the SQL store.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a unit with a known id. Does not bump the tree version.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnitNotFound`] if the parent is unknown.
    pub fn insert_unit(
        &self,
        id: UnitId,
        parent_id: UnitId,
        name: &str,
    ) -> Result<OrgUnit, DomainError> {
        let mut state = self.state.write();
        let path = child_path(state.parent(parent_id)?, id);
        let unit = OrgUnit {
            id,
            parent_id: parent_id.max(0),
            name: name.to_owned(),
            path,
            active: true,
        };
        state.units.insert(id, unit.clone());
        Ok(unit)
    }

    /// Activate or deactivate a unit; bumps the tree version.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnitNotFound`] if the unit is unknown.
    pub fn set_unit_active(&self, id: UnitId, active: bool) -> Result<u64, DomainError> {
        let mut state = self.state.write();
        let unit = state
            .units
            .get_mut(&id)
            .ok_or(DomainError::UnitNotFound(id))?;
        unit.active = active;
        Ok(state.bump())
    }

    pub fn upsert_principal(&self, principal: Principal) {
        self.state.write().principals.insert(principal.id, principal);
    }

    pub fn upsert_role(&self, role: Role) {
        self.state.write().roles.insert(role.id, role);
    }

    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<OrgUnit> {
        self.state.read().units.get(&id).cloned()
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryDirectory {
    async fn find_principal(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        Ok(self.state.read().principals.get(&id).cloned())
    }

    async fn principals_in_units(
        &self,
        units: &UnitIdSet,
    ) -> Result<Vec<PrincipalId>, DomainError> {
        Ok(self
            .state
            .read()
            .principals
            .values()
            .filter(|p| p.unit_id().is_some_and(|u| units.contains(&u)))
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl RoleRepository for InMemoryDirectory {
    async fn find_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, DomainError> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.roles.get(id).cloned())
            .collect())
    }

    async fn holders_of_role(&self, role_id: RoleId) -> Result<Vec<PrincipalId>, DomainError> {
        Ok(self
            .state
            .read()
            .principals
            .values()
            .filter(|p| p.role_ids.contains(&role_id))
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl UnitRepository for InMemoryDirectory {
    async fn list_units(&self) -> Result<Vec<OrgUnit>, DomainError> {
        Ok(self.state.read().units.values().cloned().collect())
    }
}

#[async_trait]
impl TreeVersionStore for InMemoryDirectory {
    async fn current(&self) -> Result<u64, DomainError> {
        Ok(self.state.read().version)
    }

    async fn bump(&self) -> Result<u64, DomainError> {
        Ok(self.state.write().bump())
    }
}

#[async_trait]
impl UnitTreeStore for InMemoryDirectory {
    async fn create_unit(&self, parent_id: UnitId, name: &str) -> Result<TreeChange, DomainError> {
        let mut state = self.state.write();
        let id = match state.units.keys().next_back() {
            Some(last) => last
                .checked_add(1)
                .ok_or_else(|| DomainError::internal("unit id space exhausted"))?,
            None => 1,
        };
        let path = child_path(state.parent(parent_id)?, id);
        let unit = OrgUnit {
            id,
            parent_id: parent_id.max(0),
            name: name.to_owned(),
            path,
            active: true,
        };
        state.units.insert(id, unit.clone());
        let tree_version = state.bump();
        Ok(TreeChange {
            affected: UnitIdSet::from([id]),
            unit,
            tree_version,
        })
    }

    async fn move_unit(
        &self,
        unit_id: UnitId,
        new_parent_id: UnitId,
    ) -> Result<TreeChange, DomainError> {
        let mut state = self.state.write();
        let unit = state
            .units
            .get(&unit_id)
            .cloned()
            .ok_or(DomainError::UnitNotFound(unit_id))?;
        let parent = state.parent(new_parent_id)?;
        check_move(&unit, parent)?;

        let new_prefix = child_path(parent, unit.id);
        let mut affected = UnitIdSet::new();
        for row in state.units.values_mut() {
            if unit.is_ancestor_of(row) {
                row.path = rebase_path(&row.path, &unit.path, &new_prefix);
                affected.insert(row.id);
            }
        }

        let moved = state
            .units
            .get_mut(&unit_id)
            .ok_or(DomainError::UnitNotFound(unit_id))?;
        moved.parent_id = new_parent_id.max(0);
        let moved = moved.clone();

        let tree_version = state.bump();
        Ok(TreeChange {
            unit: moved,
            affected,
            tree_version,
        })
    }

    async fn delete_unit(&self, unit_id: UnitId) -> Result<TreeChange, DomainError> {
        let mut state = self.state.write();
        if !state.units.contains_key(&unit_id) {
            return Err(DomainError::UnitNotFound(unit_id));
        }
        if state.units.values().any(|u| u.parent_id == unit_id) {
            return Err(DomainError::UnitHasChildren(unit_id));
        }
        let unit = state
            .units
            .remove(&unit_id)
            .ok_or(DomainError::UnitNotFound(unit_id))?;
        let tree_version = state.bump();
        Ok(TreeChange {
            affected: UnitIdSet::from([unit_id]),
            unit,
            tree_version,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use datascope_model::ScopeDeclaration;

    use super::*;

    #[tokio::test]
    async fn cache_round_trips_and_removes() {
        let cache = InMemoryScopeCache::new();
        let scope = EffectiveScope::new(true, [4, 5]).with_tree_version(9);

        cache.put(1, &scope).await.unwrap();
        assert_eq!(cache.get(1).await.unwrap(), Some(scope));
        assert!(cache.contains(1));

        cache.remove(1).await.unwrap();
        cache.remove(1).await.unwrap();
        assert_eq!(cache.get(1).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_cache_error() {
        let cache = InMemoryScopeCache::new();
        cache.entries.insert(1, vec![0xff, 0x00]);

        let err = cache.get(1).await.unwrap_err();
        assert!(matches!(err, DomainError::Cache(_)));
    }

    fn tree() -> InMemoryDirectory {
        let dir = InMemoryDirectory::new();
        dir.insert_unit(1, 0, "hq").unwrap();
        dir.insert_unit(2, 1, "sales").unwrap();
        dir.insert_unit(3, 2, "north").unwrap();
        dir.insert_unit(4, 0, "lab").unwrap();
        dir
    }

    #[tokio::test]
    async fn seeded_units_get_materialized_paths() {
        let dir = tree();
        assert_eq!(dir.unit(3).unwrap().path, "/1/2/3/");
        assert_eq!(dir.unit(4).unwrap().path, "/4/");
        assert!(matches!(
            dir.insert_unit(9, 42, "ghost"),
            Err(DomainError::UnitNotFound(42))
        ));
        assert_eq!(dir.current().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn move_rewrites_subtree_and_bumps_version() {
        let dir = tree();
        let change = dir.move_unit(2, 4).await.unwrap();

        assert_eq!(change.unit.parent_id, 4);
        assert_eq!(change.unit.path, "/4/2/");
        assert_eq!(change.affected, UnitIdSet::from([2, 3]));
        assert_eq!(change.tree_version, 1);
        assert_eq!(dir.unit(3).unwrap().path, "/4/2/3/");
        assert_eq!(dir.unit(1).unwrap().path, "/1/");
    }

    #[tokio::test]
    async fn move_to_root_and_rejected_moves() {
        let dir = tree();
        dir.move_unit(3, 0).await.unwrap();
        assert_eq!(dir.unit(3).unwrap().path, "/3/");

        assert!(matches!(
            dir.move_unit(1, 2).await,
            Err(DomainError::InvalidMove { unit_id: 1, new_parent_id: 2 })
        ));
        assert!(matches!(
            dir.move_unit(1, 77).await,
            Err(DomainError::UnitNotFound(77))
        ));
        // rejected moves leave the tree and version alone
        assert_eq!(dir.unit(2).unwrap().path, "/1/2/");
        assert_eq!(dir.current().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_requires_a_leaf() {
        let dir = tree();
        assert!(matches!(
            dir.delete_unit(2).await,
            Err(DomainError::UnitHasChildren(2))
        ));
        dir.delete_unit(3).await.unwrap();
        dir.delete_unit(2).await.unwrap();
        assert!(dir.unit(2).is_none());
        assert_eq!(dir.current().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn created_units_get_fresh_ids() {
        let dir = tree();
        let change = dir.create_unit(2, "south").await.unwrap();
        assert_eq!(change.unit.id, 5);
        assert_eq!(change.unit.path, "/1/2/5/");
        assert_eq!(change.tree_version, 1);
    }

    #[tokio::test]
    async fn create_fails_cleanly_when_ids_run_out() {
        let dir = tree();
        dir.insert_unit(UnitId::MAX, 0, "last").unwrap();

        let err = dir.create_unit(1, "overflow").await.unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(dir.list_units().await.unwrap().len(), 5);
        assert_eq!(dir.current().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn principal_and_role_lookups() {
        let dir = tree();
        dir.upsert_principal(Principal::new(10, ScopeDeclaration::department(2)).with_roles([1]));
        dir.upsert_principal(Principal::new(11, ScopeDeclaration::self_only()).with_roles([1, 2]));
        dir.upsert_role(Role::new(1, ScopeDeclaration::self_only()));

        assert_eq!(
            dir.principals_in_units(&UnitIdSet::from([2, 3])).await.unwrap(),
            vec![10]
        );
        assert_eq!(dir.holders_of_role(1).await.unwrap(), vec![10, 11]);
        assert_eq!(dir.find_roles(&[1, 2]).await.unwrap().len(), 1);
        assert!(dir.find_principal(12).await.unwrap().is_none());
    }
}
