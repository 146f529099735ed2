//! Data-scope module wiring.

use std::sync::Arc;

use data_scope_sdk::DataScopeClient;
use tracing::info;

use crate::config::{CacheConfig, DataScopeConfig};
use crate::domain::{
    DataScopeLocalClient, Directory, DomainError, PrincipalRepository, RoleRepository,
    ScopeCacheStore, Service, TreeVersionStore, UnitRepository, UnitTreeService, UnitTreeStore,
};
use crate::infra::memory::InMemoryScopeCache;
use crate::infra::storage::{self, SeaOrmDirectory};

/// Assembled engine: scope service, tree writer and the public client.
///
/// 1. The directory store serves principals, roles, units and the version
/// 2. The cache store holds computed scopes keyed by principal
/// 3. The tree writer bumps the version and evicts affected principals
pub struct DataScopeModule {
    service: Arc<Service>,
    tree: Arc<UnitTreeService>,
    client: Arc<dyn DataScopeClient>,
}

impl DataScopeModule {
    /// Wire the engine over one directory store and a cache store.
    #[must_use]
    pub fn new<D>(directory: &Arc<D>, cache: Arc<dyn ScopeCacheStore>, config: &CacheConfig) -> Self
    where
        D: PrincipalRepository
            + RoleRepository
            + UnitRepository
            + TreeVersionStore
            + UnitTreeStore
            + 'static,
    {
        let service = Arc::new(Service::new(
            Directory::from_shared(directory),
            cache,
            config.clone(),
        ));
        let tree = Arc::new(UnitTreeService::new(
            directory.clone(),
            directory.clone(),
            service.clone(),
        ));
        let client: Arc<dyn DataScopeClient> = Arc::new(DataScopeLocalClient::new(service.clone()));
        Self {
            service,
            tree,
            client,
        }
    }

    /// Connect to the configured database, run migrations and wire the
    /// engine with an in-process scope cache.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Database`] if connecting or migrating fails.
    #[tracing::instrument(skip_all, fields(cache_enabled = config.cache.enabled))]
    pub async fn connect(config: &DataScopeConfig) -> Result<Self, DomainError> {
        info!("Initializing data_scope module");

        let db = storage::connect(&config.database).await?;
        storage::migrate(&db).await?;
        info!("data_scope migrations applied");

        let directory = Arc::new(SeaOrmDirectory::new(db));
        let module = Self::new(
            &directory,
            Arc::new(InMemoryScopeCache::new()),
            &config.cache,
        );

        info!("data_scope module initialized successfully");
        Ok(module)
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    #[must_use]
    pub fn tree(&self) -> &Arc<UnitTreeService> {
        &self.tree
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn DataScopeClient> {
        self.client.clone()
    }
}
