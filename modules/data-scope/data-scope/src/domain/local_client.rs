//! Local (in-process) client for the data-scope engine.

use std::sync::Arc;

use async_trait::async_trait;
use data_scope_sdk::{DataScopeClient, DataScopeError};
use datascope_model::{EffectiveScope, PrincipalId, RoleId};

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct DataScopeLocalClient {
    svc: Arc<Service>,
}

impl DataScopeLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> DataScopeError {
    tracing::error!(operation = op, error = ?e, "data_scope call failed");
    e.into()
}

#[async_trait]
impl DataScopeClient for DataScopeLocalClient {
    async fn get_effective_scope(
        &self,
        principal_id: PrincipalId,
    ) -> Result<EffectiveScope, DataScopeError> {
        self.svc
            .get_effective_scope(principal_id)
            .await
            .map_err(|e| log_and_convert("get_effective_scope", e))
    }

    async fn evict(&self, principal_id: PrincipalId) -> Result<(), DataScopeError> {
        self.svc
            .evict(principal_id)
            .await
            .map_err(|e| log_and_convert("evict", e))
    }

    async fn evict_many(&self, principal_ids: &[PrincipalId]) -> Result<(), DataScopeError> {
        self.svc
            .evict_many(principal_ids)
            .await
            .map_err(|e| log_and_convert("evict_many", e))
    }

    async fn on_role_changed(&self, role_id: RoleId) -> Result<(), DataScopeError> {
        self.svc
            .on_role_changed(role_id)
            .await
            .map_err(|e| log_and_convert("on_role_changed", e))
    }

    async fn on_principal_roles_changed(
        &self,
        principal_id: PrincipalId,
    ) -> Result<(), DataScopeError> {
        self.svc
            .on_principal_roles_changed(principal_id)
            .await
            .map_err(|e| log_and_convert("on_principal_roles_changed", e))
    }
}
