//! `scope-inspector`: resolve data scopes and edit the unit tree from a shell.

mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use data_scope::DataScopeModule;
use datascope_model::{PrincipalId, ROOT_UNIT_ID, UnitId};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "scope-inspector", version, about = "Data-scope inspector")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and exit
    Migrate,
    /// Print a principal's effective scope as JSON
    Scope {
        #[arg(long)]
        principal: PrincipalId,
    },
    /// Print the row filter a principal's scope produces for a table
    Where {
        #[arg(long)]
        principal: PrincipalId,
        #[arg(long, default_value = "record")]
        table: String,
        #[arg(long, default_value = "created_by")]
        owner_col: String,
        #[arg(long, default_value = "dept_id")]
        dept_col: String,
    },
    /// Organizational-unit tree mutations
    #[command(subcommand)]
    Unit(UnitCommand),
}

#[derive(Subcommand)]
enum UnitCommand {
    /// Create a unit; omit --parent for a top-level unit
    Create {
        #[arg(long, default_value_t = ROOT_UNIT_ID)]
        parent: UnitId,
        #[arg(long)]
        name: String,
    },
    /// Move a unit and its subtree under a new parent
    Move {
        #[arg(long)]
        unit: UnitId,
        #[arg(long)]
        parent: UnitId,
    },
    /// Delete a leaf unit
    Delete {
        #[arg(long)]
        unit: UnitId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::load(cli.config.as_deref())?;
    cfg.logging.json |= cli.json_logs;
    logging::init_logging(&cfg.logging)?;

    let module = DataScopeModule::connect(&cfg.data_scope).await?;

    match cli.command {
        Command::Migrate => {
            tracing::info!("migrations are up to date");
            Ok(())
        }
        Command::Scope { principal } => commands::show_scope(&module, principal).await,
        Command::Where {
            principal,
            table,
            owner_col,
            dept_col,
        } => commands::show_where(&module, principal, &table, &owner_col, &dept_col).await,
        Command::Unit(UnitCommand::Create { parent, name }) => {
            commands::create_unit(&module, parent, &name).await
        }
        Command::Unit(UnitCommand::Move { unit, parent }) => {
            commands::move_unit(&module, unit, parent).await
        }
        Command::Unit(UnitCommand::Delete { unit }) => commands::delete_unit(&module, unit).await,
    }
}
