//! Cache behavior of the scope service, observed through counting stores.

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use datascope_model::{EffectiveScope, PrincipalId, RoleId, ScopeDeclaration, UnitIdSet};

use super::error::DomainError;
use super::model::{OrgUnit, Principal, Role};
use super::repo::{
    PrincipalRepository, RoleRepository, ScopeCacheStore, TreeVersionStore, UnitRepository,
};
use super::service::{Directory, Service};
use crate::config::CacheConfig;
use crate::infra::memory::{InMemoryDirectory, InMemoryScopeCache};

/// Wraps the in-memory directory and counts every durable-store read.
#[derive(Default)]
struct CountingDirectory {
    inner: InMemoryDirectory,
    principal_reads: AtomicUsize,
    role_reads: AtomicUsize,
    unit_reads: AtomicUsize,
    fail_versions: AtomicBool,
    fail_principals: AtomicBool,
}

impl CountingDirectory {
    fn store_reads(&self) -> usize {
        self.principal_reads.load(Ordering::SeqCst)
            + self.role_reads.load(Ordering::SeqCst)
            + self.unit_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrincipalRepository for CountingDirectory {
    async fn find_principal(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        self.principal_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_principals.load(Ordering::SeqCst) {
            return Err(DomainError::store("principal store offline"));
        }
        self.inner.find_principal(id).await
    }

    async fn principals_in_units(
        &self,
        units: &UnitIdSet,
    ) -> Result<Vec<PrincipalId>, DomainError> {
        self.inner.principals_in_units(units).await
    }
}

#[async_trait]
impl RoleRepository for CountingDirectory {
    async fn find_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, DomainError> {
        self.role_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_roles(ids).await
    }

    async fn holders_of_role(&self, role_id: RoleId) -> Result<Vec<PrincipalId>, DomainError> {
        self.inner.holders_of_role(role_id).await
    }
}

#[async_trait]
impl UnitRepository for CountingDirectory {
    async fn list_units(&self) -> Result<Vec<OrgUnit>, DomainError> {
        self.unit_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.list_units().await
    }
}

#[async_trait]
impl TreeVersionStore for CountingDirectory {
    async fn current(&self) -> Result<u64, DomainError> {
        if self.fail_versions.load(Ordering::SeqCst) {
            return Err(DomainError::store("version store offline"));
        }
        self.inner.current().await
    }

    async fn bump(&self) -> Result<u64, DomainError> {
        self.inner.bump().await
    }
}

/// A cache whose every operation fails.
struct BrokenCache;

#[async_trait]
impl ScopeCacheStore for BrokenCache {
    async fn get(&self, _principal_id: PrincipalId) -> Result<Option<EffectiveScope>, DomainError> {
        Err(DomainError::cache("connection refused"))
    }

    async fn put(
        &self,
        _principal_id: PrincipalId,
        _scope: &EffectiveScope,
    ) -> Result<(), DomainError> {
        Err(DomainError::cache("connection refused"))
    }

    async fn remove(&self, _principal_id: PrincipalId) -> Result<(), DomainError> {
        Err(DomainError::cache("connection refused"))
    }
}

/// Units 1 -> {2, 3}, 2 -> {4}; principal 7 sits in unit 2 and holds role 1.
fn seeded() -> Arc<CountingDirectory> {
    let dir = CountingDirectory::default();
    dir.inner.insert_unit(1, 0, "hq").unwrap();
    dir.inner.insert_unit(2, 1, "sales").unwrap();
    dir.inner.insert_unit(3, 1, "ops").unwrap();
    dir.inner.insert_unit(4, 2, "north").unwrap();
    dir.inner.upsert_principal(
        Principal::new(7, ScopeDeclaration::department_and_descendants(2)).with_roles([1]),
    );
    dir.inner.upsert_principal(Principal::new(8, ScopeDeclaration::department(3)).with_roles([1]));
    dir.inner
        .upsert_role(Role::new(1, ScopeDeclaration::custom([3])));
    Arc::new(dir)
}

fn service_with(
    dir: &Arc<CountingDirectory>,
    cache: Arc<dyn ScopeCacheStore>,
    enabled: bool,
) -> Service {
    Service::new(Directory::from_shared(dir), cache, CacheConfig { enabled })
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);

    let first = svc.get_effective_scope(7).await.unwrap();
    let reads = dir.store_reads();
    let second = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.unit_ids(), &UnitIdSet::from([2, 3, 4]));
    assert_eq!(dir.store_reads(), reads, "cached read touched the stores");
}

#[tokio::test]
async fn version_bump_forces_recompute() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);

    let before = svc.get_effective_scope(7).await.unwrap();
    assert_eq!(before.tree_version(), 0);
    assert_eq!(dir.principal_reads.load(Ordering::SeqCst), 1);

    dir.bump().await.unwrap();
    let after = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(dir.principal_reads.load(Ordering::SeqCst), 2);
    assert_eq!(after.tree_version(), 1);
    assert_eq!(after.unit_ids(), before.unit_ids());
}

#[tokio::test]
async fn tree_change_is_visible_after_version_bump() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);
    svc.get_effective_scope(7).await.unwrap();

    // deactivating unit 4 removes it from the closure and bumps the version
    dir.inner.set_unit_active(4, false).unwrap();
    let scope = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(scope.unit_ids(), &UnitIdSet::from([2, 3]));
}

#[tokio::test]
async fn role_change_needs_eviction() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);
    svc.get_effective_scope(7).await.unwrap();
    svc.get_effective_scope(8).await.unwrap();

    dir.inner.upsert_role(Role::new(1, ScopeDeclaration::all()));
    assert!(!svc.get_effective_scope(7).await.unwrap().is_all());

    svc.on_role_changed(1).await.unwrap();

    assert!(svc.get_effective_scope(7).await.unwrap().is_all());
    assert!(svc.get_effective_scope(8).await.unwrap().is_all());
}

#[tokio::test]
async fn reassignment_hook_evicts_one_principal() {
    let dir = seeded();
    let cache = Arc::new(InMemoryScopeCache::new());
    let svc = service_with(&dir, cache.clone(), true);
    svc.get_effective_scope(7).await.unwrap();
    svc.get_effective_scope(8).await.unwrap();

    dir.inner
        .upsert_principal(Principal::new(7, ScopeDeclaration::self_only()));
    svc.on_principal_roles_changed(7).await.unwrap();

    assert!(!cache.contains(7));
    assert!(cache.contains(8));
    let scope = svc.get_effective_scope(7).await.unwrap();
    assert!(scope.includes_self());
    assert!(scope.unit_ids().is_empty());
}

#[tokio::test]
async fn evictions_are_idempotent() {
    let dir = seeded();
    let cache = Arc::new(InMemoryScopeCache::new());
    let svc = service_with(&dir, cache.clone(), true);
    svc.get_effective_scope(7).await.unwrap();
    svc.get_effective_scope(8).await.unwrap();

    svc.evict_many(&[7, 8, 99]).await.unwrap();
    assert!(cache.is_empty());
    svc.evict(7).await.unwrap();
    svc.evict(7).await.unwrap();
}

#[tokio::test]
async fn disabled_cache_always_recomputes() {
    let dir = seeded();
    let cache = Arc::new(InMemoryScopeCache::new());
    let svc = service_with(&dir, cache.clone(), false);

    let first = svc.get_effective_scope(7).await.unwrap();
    let second = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(dir.principal_reads.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn version_store_failure_bypasses_cache() {
    let dir = seeded();
    let cache = Arc::new(InMemoryScopeCache::new());
    let svc = service_with(&dir, cache.clone(), true);
    svc.get_effective_scope(7).await.unwrap();

    dir.fail_versions.store(true, Ordering::SeqCst);
    let scope = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(scope.tree_version(), 0);
    assert_eq!(dir.principal_reads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn broken_cache_degrades_to_recompute() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(BrokenCache), true);

    let first = svc.get_effective_scope(7).await.unwrap();
    let second = svc.get_effective_scope(7).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(dir.principal_reads.load(Ordering::SeqCst), 2);
    assert!(matches!(svc.evict(7).await, Err(DomainError::Cache(_))));
    assert!(matches!(svc.evict_many(&[7, 8]).await, Err(DomainError::Cache(_))));
}

#[tokio::test]
async fn unknown_principal_gets_self_only() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);

    let scope = svc.get_effective_scope(404).await.unwrap();

    assert!(!scope.is_all());
    assert!(scope.includes_self());
    assert!(scope.unit_ids().is_empty());
    assert_eq!(dir.role_reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn principal_store_failure_is_an_error() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);
    dir.fail_principals.store(true, Ordering::SeqCst);

    let err = svc.get_effective_scope(7).await.unwrap_err();
    assert!(matches!(err, DomainError::Store(_)));
}

#[tokio::test]
async fn units_are_loaded_only_for_descendant_scopes() {
    let dir = seeded();
    let svc = service_with(&dir, Arc::new(InMemoryScopeCache::new()), true);

    svc.get_effective_scope(8).await.unwrap();
    assert_eq!(dir.unit_reads.load(Ordering::SeqCst), 0);

    svc.get_effective_scope(7).await.unwrap();
    assert_eq!(dir.unit_reads.load(Ordering::SeqCst), 1);
}

/// Simulates a writer that commits a role change and evicts its holder right
/// after a read has loaded the roles, before that read writes its result.
struct RacingDirectory {
    inner: InMemoryDirectory,
    cache: Arc<InMemoryScopeCache>,
    raced: AtomicBool,
}

#[async_trait]
impl PrincipalRepository for RacingDirectory {
    async fn find_principal(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        self.inner.find_principal(id).await
    }

    async fn principals_in_units(
        &self,
        units: &UnitIdSet,
    ) -> Result<Vec<PrincipalId>, DomainError> {
        self.inner.principals_in_units(units).await
    }
}

#[async_trait]
impl RoleRepository for RacingDirectory {
    async fn find_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, DomainError> {
        let loaded = self.inner.find_roles(ids).await?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.upsert_role(Role::new(1, ScopeDeclaration::all()));
            for holder in self.inner.holders_of_role(1).await? {
                self.cache.remove(holder).await?;
            }
        }
        Ok(loaded)
    }

    async fn holders_of_role(&self, role_id: RoleId) -> Result<Vec<PrincipalId>, DomainError> {
        self.inner.holders_of_role(role_id).await
    }
}

#[async_trait]
impl UnitRepository for RacingDirectory {
    async fn list_units(&self) -> Result<Vec<OrgUnit>, DomainError> {
        self.inner.list_units().await
    }
}

#[async_trait]
impl TreeVersionStore for RacingDirectory {
    async fn current(&self) -> Result<u64, DomainError> {
        self.inner.current().await
    }

    async fn bump(&self) -> Result<u64, DomainError> {
        self.inner.bump().await
    }
}

#[tokio::test]
async fn eviction_racing_a_read_is_undone_by_the_write_back() {
    let cache = Arc::new(InMemoryScopeCache::new());
    let dir = Arc::new(RacingDirectory {
        inner: InMemoryDirectory::new(),
        cache: cache.clone(),
        raced: AtomicBool::new(false),
    });
    dir.inner
        .upsert_principal(Principal::new(8, ScopeDeclaration::department(3)).with_roles([1]));
    dir.inner.upsert_role(Role::new(1, ScopeDeclaration::custom([4])));
    let svc = Service::new(
        Directory::from_shared(&dir),
        cache.clone(),
        CacheConfig { enabled: true },
    );

    let raced = svc.get_effective_scope(8).await.unwrap();
    assert_eq!(raced.unit_ids(), &UnitIdSet::from([3, 4]));

    // the old scope was written back under the current version
    assert!(cache.contains(8));
    assert!(!svc.get_effective_scope(8).await.unwrap().is_all());

    // the next eviction repairs it
    svc.evict(8).await.unwrap();
    assert!(svc.get_effective_scope(8).await.unwrap().is_all());
}
