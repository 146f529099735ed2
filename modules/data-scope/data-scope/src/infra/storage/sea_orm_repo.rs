use async_trait::async_trait;
use datascope_model::{
    PrincipalId, RoleId, ScopeDeclaration, UnitId, UnitIdSet, parse_unit_ids,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

use super::entity::{org_unit, principal, principal_role, role, scope_tree_version};
use crate::domain::model::scope_kind_or_self;
use crate::domain::{
    DomainError, OrgUnit, Principal, PrincipalRepository, Role, RoleRepository, TreeVersionStore,
    UnitRepository,
};

/// Directory and unit-tree store over any SeaORM connection.
#[derive(Clone)]
pub struct SeaOrmDirectory {
    pub(super) db: DatabaseConnection,
}

impl SeaOrmDirectory {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn declaration(
    kind: i32,
    base_unit: Option<UnitId>,
    extra_units: Option<&str>,
    custom_units: Option<&str>,
) -> ScopeDeclaration {
    let mut declaration = ScopeDeclaration::new(scope_kind_or_self(kind));
    declaration.base_unit = base_unit;
    declaration.extra_units = parse_unit_ids(extra_units);
    declaration.custom_units = parse_unit_ids(custom_units);
    declaration
}

impl From<org_unit::Model> for OrgUnit {
    fn from(m: org_unit::Model) -> Self {
        Self {
            id: m.id,
            parent_id: m.parent_id,
            name: m.name,
            path: m.path,
            active: m.active,
        }
    }
}

impl From<role::Model> for Role {
    fn from(m: role::Model) -> Self {
        Self {
            id: m.id,
            enabled: m.enabled,
            deleted: m.deleted,
            declaration: declaration(
                m.scope_kind,
                m.unit_id,
                m.extra_unit_ids.as_deref(),
                m.custom_unit_ids.as_deref(),
            ),
        }
    }
}

pub(super) fn to_version(raw: i64) -> Result<u64, DomainError> {
    u64::try_from(raw).map_err(|_| DomainError::internal(format!("negative tree version {raw}")))
}

pub(super) async fn read_version<C: ConnectionTrait>(conn: &C) -> Result<u64, DomainError> {
    scope_tree_version::Entity::find_by_id(scope_tree_version::VERSION_ROW_ID)
        .one(conn)
        .await?
        .map_or(Ok(0), |row| to_version(row.version))
}

#[async_trait]
impl PrincipalRepository for SeaOrmDirectory {
    async fn find_principal(&self, id: PrincipalId) -> Result<Option<Principal>, DomainError> {
        let Some(row) = principal::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let role_ids = principal_role::Entity::find()
            .filter(principal_role::Column::PrincipalId.eq(id))
            .order_by_asc(principal_role::Column::RoleId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.role_id)
            .collect();

        Ok(Some(Principal {
            id: row.id,
            declaration: declaration(
                row.scope_kind,
                row.unit_id,
                row.extra_unit_ids.as_deref(),
                row.custom_unit_ids.as_deref(),
            ),
            role_ids,
        }))
    }

    async fn principals_in_units(
        &self,
        units: &UnitIdSet,
    ) -> Result<Vec<PrincipalId>, DomainError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        Ok(principal::Entity::find()
            .select_only()
            .column(principal::Column::Id)
            .filter(principal::Column::UnitId.is_in(units.iter().copied()))
            .order_by_asc(principal::Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl RoleRepository for SeaOrmDirectory {
    async fn find_roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(role::Entity::find()
            .filter(role::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Role::from)
            .collect())
    }

    async fn holders_of_role(&self, role_id: RoleId) -> Result<Vec<PrincipalId>, DomainError> {
        Ok(principal_role::Entity::find()
            .filter(principal_role::Column::RoleId.eq(role_id))
            .order_by_asc(principal_role::Column::PrincipalId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.principal_id)
            .collect())
    }
}

#[async_trait]
impl UnitRepository for SeaOrmDirectory {
    async fn list_units(&self) -> Result<Vec<OrgUnit>, DomainError> {
        Ok(org_unit::Entity::find()
            .order_by_asc(org_unit::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(OrgUnit::from)
            .collect())
    }
}

#[async_trait]
impl TreeVersionStore for SeaOrmDirectory {
    async fn current(&self) -> Result<u64, DomainError> {
        read_version(&self.db).await
    }

    async fn bump(&self) -> Result<u64, DomainError> {
        let txn = self.db.begin().await?;
        let version = super::tree_writer::bump_version(&txn).await?;
        txn.commit().await?;
        Ok(version)
    }
}
