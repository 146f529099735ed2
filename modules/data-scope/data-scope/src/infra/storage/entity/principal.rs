use sea_orm::entity::prelude::*;

/// A principal's own scope declaration.
///
/// `unit_id` is the principal's department and the declaration's base unit.
/// Unit-id lists are stored as JSON array text.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "principal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub unit_id: Option<i64>,
    pub scope_kind: i32,
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
