use sea_orm::entity::prelude::*;

/// A role's scope declaration; `unit_id` is the override base unit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub enabled: bool,
    pub deleted: bool,
    pub scope_kind: i32,
    pub unit_id: Option<i64>,
    pub extra_unit_ids: Option<String>,
    pub custom_unit_ids: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::principal_role::Entity")]
    PrincipalRole,
}

impl Related<super::principal_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrincipalRole.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
