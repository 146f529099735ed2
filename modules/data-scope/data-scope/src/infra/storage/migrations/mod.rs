use sea_orm_migration::{MigrationTrait, MigratorTrait};

mod m20260101_000001_create_scope_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260101_000001_create_scope_tables::Migration)]
    }
}
