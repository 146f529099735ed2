//! SeaORM persistence for the directory and the unit tree.

pub mod entity;
pub mod migrations;
pub mod sea_orm_repo;
mod tree_writer;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::DatabaseConfig;

pub use migrations::Migrator;
pub use sea_orm_repo::SeaOrmDirectory;

/// Open a connection pool for `cfg`.
///
/// # Errors
///
/// Returns the driver error if the database cannot be reached.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_conns.max(1))
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(opts).await
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns the first failing migration's error.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}
