//! Transactional unit-tree mutations.
//!
//! Every mutation validates, rewrites the affected rows and bumps the tree
//! version inside one transaction. Returning early drops the transaction,
//! which rolls it back.

use async_trait::async_trait;
use datascope_model::{UnitId, UnitIdSet};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, TransactionTrait,
};

use super::entity::{org_unit, scope_tree_version};
use super::sea_orm_repo::{SeaOrmDirectory, read_version};
use crate::domain::unit_tree::{check_move, child_path, is_root, rebase_path};
use crate::domain::{DomainError, OrgUnit, TreeChange, UnitTreeStore};

/// Increment the tree version within `conn`'s transaction.
pub(super) async fn bump_version<C: ConnectionTrait>(conn: &C) -> Result<u64, DomainError> {
    let res = scope_tree_version::Entity::update_many()
        .col_expr(
            scope_tree_version::Column::Version,
            Expr::col(scope_tree_version::Column::Version).add(1),
        )
        .filter(scope_tree_version::Column::Id.eq(scope_tree_version::VERSION_ROW_ID))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        scope_tree_version::Entity::insert(scope_tree_version::ActiveModel {
            id: ActiveValue::Set(scope_tree_version::VERSION_ROW_ID),
            version: ActiveValue::Set(1),
        })
        .exec_without_returning(conn)
        .await?;
    }

    read_version(conn).await
}

async fn find_unit<C: ConnectionTrait>(conn: &C, id: UnitId) -> Result<OrgUnit, DomainError> {
    org_unit::Entity::find_by_id(id)
        .one(conn)
        .await?
        .map(OrgUnit::from)
        .ok_or(DomainError::UnitNotFound(id))
}

/// `None` for the root; the parent row otherwise.
async fn find_parent<C: ConnectionTrait>(
    conn: &C,
    parent_id: UnitId,
) -> Result<Option<OrgUnit>, DomainError> {
    if is_root(parent_id) {
        return Ok(None);
    }
    find_unit(conn, parent_id).await.map(Some)
}

#[async_trait]
impl UnitTreeStore for SeaOrmDirectory {
    async fn create_unit(&self, parent_id: UnitId, name: &str) -> Result<TreeChange, DomainError> {
        let txn = self.db.begin().await?;
        let parent = find_parent(&txn, parent_id).await?;

        let inserted = org_unit::ActiveModel {
            id: ActiveValue::NotSet,
            parent_id: ActiveValue::Set(parent_id.max(0)),
            name: ActiveValue::Set(name.to_owned()),
            // the id is needed for the path, so it is filled in below
            path: ActiveValue::Set(String::new()),
            active: ActiveValue::Set(true),
        }
        .insert(&txn)
        .await?;

        let path = child_path(parent.as_ref(), inserted.id);
        let mut row: org_unit::ActiveModel = inserted.into();
        row.path = ActiveValue::Set(path);
        let unit = OrgUnit::from(row.update(&txn).await?);

        let tree_version = bump_version(&txn).await?;
        txn.commit().await?;

        Ok(TreeChange {
            affected: UnitIdSet::from([unit.id]),
            unit,
            tree_version,
        })
    }

    async fn move_unit(
        &self,
        unit_id: UnitId,
        new_parent_id: UnitId,
    ) -> Result<TreeChange, DomainError> {
        let txn = self.db.begin().await?;
        let unit = find_unit(&txn, unit_id).await?;
        let parent = find_parent(&txn, new_parent_id).await?;
        check_move(&unit, parent.as_ref())?;

        let new_prefix = child_path(parent.as_ref(), unit.id);
        let subtree = org_unit::Entity::find()
            .filter(org_unit::Column::Path.starts_with(unit.path.as_str()))
            .all(&txn)
            .await?;

        let mut affected = UnitIdSet::new();
        let mut moved = None;
        for row in subtree {
            let id = row.id;
            let path = rebase_path(&row.path, &unit.path, &new_prefix);
            let mut changed: org_unit::ActiveModel = row.into();
            changed.path = ActiveValue::Set(path);
            if id == unit_id {
                changed.parent_id = ActiveValue::Set(new_parent_id.max(0));
            }
            let updated = changed.update(&txn).await?;
            if id == unit_id {
                moved = Some(OrgUnit::from(updated));
            }
            affected.insert(id);
        }
        let moved = moved.ok_or_else(|| {
            DomainError::internal(format!("unit {unit_id} missing from its own subtree"))
        })?;

        let tree_version = bump_version(&txn).await?;
        txn.commit().await?;

        Ok(TreeChange {
            unit: moved,
            affected,
            tree_version,
        })
    }

    async fn delete_unit(&self, unit_id: UnitId) -> Result<TreeChange, DomainError> {
        let txn = self.db.begin().await?;
        let unit = find_unit(&txn, unit_id).await?;

        let children = org_unit::Entity::find()
            .filter(org_unit::Column::ParentId.eq(unit_id))
            .count(&txn)
            .await?;
        if children > 0 {
            return Err(DomainError::UnitHasChildren(unit_id));
        }

        org_unit::Entity::delete_by_id(unit_id).exec(&txn).await?;
        let tree_version = bump_version(&txn).await?;
        txn.commit().await?;

        Ok(TreeChange {
            affected: UnitIdSet::from([unit_id]),
            unit,
            tree_version,
        })
    }
}
