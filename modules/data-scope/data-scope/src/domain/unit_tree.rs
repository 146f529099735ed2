//! Structural mutations of the organizational-unit tree.
//!
//! The path rules below are shared by every [`UnitTreeStore`] so that the
//! in-memory and SQL stores agree on validation and path layout.

use std::sync::Arc;

use datascope_model::{ROOT_UNIT_ID, UnitId};
use tracing::{info, warn};

use super::error::DomainError;
use super::model::OrgUnit;
use super::repo::{PrincipalRepository, TreeChange, UnitTreeStore};
use super::service::Service;

/// Maximum length of a unit name.
pub const MAX_UNIT_NAME_LEN: usize = 200;

/// Materialized path of unit `id` under `parent` (`None` = root).
#[must_use]
pub fn child_path(parent: Option<&OrgUnit>, id: UnitId) -> String {
    match parent {
        Some(p) => format!("{}{id}/", p.path),
        None => format!("/{id}/"),
    }
}

/// Replace the `old_prefix` of `path` with `new_prefix`.
///
/// Paths outside the subtree are returned unchanged.
#[must_use]
pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    path.strip_prefix(old_prefix)
        .map_or_else(|| path.to_owned(), |rest| format!("{new_prefix}{rest}"))
}

/// Reject moving `unit` under itself or one of its descendants.
///
/// # Errors
///
/// Returns [`DomainError::InvalidMove`] when the target is inside the subtree.
pub fn check_move(unit: &OrgUnit, new_parent: Option<&OrgUnit>) -> Result<(), DomainError> {
    match new_parent {
        Some(parent) if unit.is_ancestor_of(parent) => Err(DomainError::InvalidMove {
            unit_id: unit.id,
            new_parent_id: parent.id,
        }),
        _ => Ok(()),
    }
}

/// # Errors
///
/// Returns [`DomainError::Validation`] for blank or overlong names.
pub fn validate_unit_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    if name.chars().count() > MAX_UNIT_NAME_LEN {
        return Err(DomainError::validation(
            "name",
            format!("exceeds maximum length of {MAX_UNIT_NAME_LEN}"),
        ));
    }
    Ok(())
}

/// Whether `parent_id` designates the synthetic root.
#[must_use]
pub fn is_root(parent_id: UnitId) -> bool {
    parent_id <= ROOT_UNIT_ID
}

/// Unit tree writer.
///
/// Every mutation commits together with its tree-version bump; afterwards the
/// cached scopes of principals sitting in the affected units are evicted on a
/// best-effort basis. Stale entries elsewhere are caught by the version check.
pub struct UnitTreeService {
    tree: Arc<dyn UnitTreeStore>,
    principals: Arc<dyn PrincipalRepository>,
    scopes: Arc<Service>,
}

impl UnitTreeService {
    #[must_use]
    pub fn new(
        tree: Arc<dyn UnitTreeStore>,
        principals: Arc<dyn PrincipalRepository>,
        scopes: Arc<Service>,
    ) -> Self {
        Self {
            tree,
            principals,
            scopes,
        }
    }

    /// Create a unit under `parent_id` (`0` for a top-level unit).
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad name
    /// - `UnitNotFound` if the parent does not exist
    /// - `Database` / `Store` if the write fails
    #[tracing::instrument(skip_all, fields(parent_id = parent_id))]
    pub async fn create_unit(&self, parent_id: UnitId, name: &str) -> Result<OrgUnit, DomainError> {
        validate_unit_name(name)?;
        let change = self.tree.create_unit(parent_id, name).await?;
        info!(
            unit_id = change.unit.id,
            tree_version = change.tree_version,
            "created organizational unit"
        );
        Ok(change.unit)
    }

    /// Move `unit_id` with its whole subtree under `new_parent_id`.
    ///
    /// # Errors
    ///
    /// - `UnitNotFound` if the unit or the target does not exist
    /// - `InvalidMove` if the target lies inside the moved subtree
    /// - `Database` / `Store` if the write fails; nothing is changed then
    #[tracing::instrument(skip_all, fields(unit_id = unit_id, new_parent_id = new_parent_id))]
    pub async fn move_unit(
        &self,
        unit_id: UnitId,
        new_parent_id: UnitId,
    ) -> Result<OrgUnit, DomainError> {
        let change = self.tree.move_unit(unit_id, new_parent_id).await?;
        info!(
            moved = change.affected.len(),
            tree_version = change.tree_version,
            path = %change.unit.path,
            "moved organizational unit"
        );
        self.evict_affected(&change).await;
        Ok(change.unit)
    }

    /// Delete a leaf unit.
    ///
    /// # Errors
    ///
    /// - `UnitNotFound` if the unit does not exist
    /// - `UnitHasChildren` if deleting it would orphan a subtree
    /// - `Database` / `Store` if the write fails
    #[tracing::instrument(skip_all, fields(unit_id = unit_id))]
    pub async fn delete_unit(&self, unit_id: UnitId) -> Result<(), DomainError> {
        let change = self.tree.delete_unit(unit_id).await?;
        info!(
            tree_version = change.tree_version,
            "deleted organizational unit"
        );
        self.evict_affected(&change).await;
        Ok(())
    }

    async fn evict_affected(&self, change: &TreeChange) {
        let principals = match self.principals.principals_in_units(&change.affected).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "could not list principals of affected units");
                return;
            }
        };
        if let Err(e) = self.scopes.evict_many(&principals).await {
            warn!(error = %e, "best-effort scope eviction failed");
        }
    }
}
