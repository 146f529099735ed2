use sea_orm_migration::prelude as mig;
use sea_orm_migration::prelude::{Alias, ColumnDef, Index, Table};

pub struct Migration;

impl mig::MigrationName for Migration {
    fn name(&self) -> &'static str {
        "m20260101_000001_create_scope_tables"
    }
}

fn id_col(name: &str) -> ColumnDef {
    ColumnDef::new(Alias::new(name))
        .big_integer()
        .not_null()
        .to_owned()
}

fn unit_list_col(name: &str) -> ColumnDef {
    ColumnDef::new(Alias::new(name)).text().null().to_owned()
}

#[async_trait::async_trait]
impl mig::MigrationTrait for Migration {
    async fn up(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("org_unit"))
                    .if_not_exists()
                    .col(id_col("id").auto_increment().primary_key())
                    .col(id_col("parent_id").default(0))
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("path")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("active"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_unit_path")
                    .table(Alias::new("org_unit"))
                    .col(Alias::new("path"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_org_unit_parent")
                    .table(Alias::new("org_unit"))
                    .col(Alias::new("parent_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("principal"))
                    .if_not_exists()
                    .col(id_col("id").primary_key())
                    .col(ColumnDef::new(Alias::new("unit_id")).big_integer().null())
                    .col(
                        ColumnDef::new(Alias::new("scope_kind"))
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(unit_list_col("extra_unit_ids"))
                    .col(unit_list_col("custom_unit_ids"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_principal_unit")
                    .table(Alias::new("principal"))
                    .col(Alias::new("unit_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("role"))
                    .if_not_exists()
                    .col(id_col("id").primary_key())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("enabled"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("deleted"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("scope_kind"))
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(ColumnDef::new(Alias::new("unit_id")).big_integer().null())
                    .col(unit_list_col("extra_unit_ids"))
                    .col(unit_list_col("custom_unit_ids"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("principal_role"))
                    .if_not_exists()
                    .col(id_col("principal_id"))
                    .col(id_col("role_id"))
                    .primary_key(
                        Index::create()
                            .col(Alias::new("principal_id"))
                            .col(Alias::new("role_id")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_principal_role_role")
                    .table(Alias::new("principal_role"))
                    .col(Alias::new("role_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("scope_tree_version"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("version"))
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &mig::SchemaManager) -> Result<(), mig::DbErr> {
        for table in [
            "scope_tree_version",
            "principal_role",
            "role",
            "principal",
            "org_unit",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
