//! Subcommand handlers.

use anyhow::Result;
use data_scope::DataScopeModule;
use data_scope::domain::OrgUnit;
use data_scope_sdk::DataScopeClient;
use datascope_db::scope_filter;
use datascope_model::{EffectiveScope, PrincipalId, UnitId};
use sea_orm::sea_query::{Alias, Asterisk, Query, SqliteQueryBuilder};
use serde_json::json;

/// A scoped `SELECT`, once with bound parameters and once inlined for reading.
pub struct RenderedQuery {
    pub bound: String,
    pub params: usize,
    pub inlined: String,
}

/// Render the row filter `scope` produces for `principal_id` over `table`.
#[must_use]
pub fn render_scoped_select(
    scope: &EffectiveScope,
    principal_id: PrincipalId,
    table: &str,
    owner_col: &str,
    department_col: &str,
) -> RenderedQuery {
    let mut select = Query::select();
    select.column(Asterisk).from(Alias::new(table));
    if let Some(cond) = scope_filter(
        scope,
        principal_id,
        Alias::new(owner_col),
        Alias::new(department_col),
    ) {
        select.cond_where(cond);
    }

    let (bound, values) = select.build(SqliteQueryBuilder);
    RenderedQuery {
        bound,
        params: values.0.len(),
        inlined: select.to_string(SqliteQueryBuilder),
    }
}

pub async fn show_scope(module: &DataScopeModule, principal_id: PrincipalId) -> Result<()> {
    let scope = module.client().get_effective_scope(principal_id).await?;
    println!("{}", serde_json::to_string_pretty(&scope)?);
    Ok(())
}

pub async fn show_where(
    module: &DataScopeModule,
    principal_id: PrincipalId,
    table: &str,
    owner_col: &str,
    department_col: &str,
) -> Result<()> {
    let scope = module.client().get_effective_scope(principal_id).await?;
    let rendered = render_scoped_select(&scope, principal_id, table, owner_col, department_col);
    let out = json!({
        "principal_id": principal_id,
        "sql": rendered.bound,
        "params": rendered.params,
        "inlined": rendered.inlined,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_unit(unit: &OrgUnit) -> Result<()> {
    let out = json!({
        "id": unit.id,
        "parent_id": unit.parent_id,
        "name": unit.name,
        "path": unit.path,
        "active": unit.active,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub async fn create_unit(module: &DataScopeModule, parent_id: UnitId, name: &str) -> Result<()> {
    let unit = module.tree().create_unit(parent_id, name).await?;
    print_unit(&unit)
}

pub async fn move_unit(
    module: &DataScopeModule,
    unit_id: UnitId,
    new_parent_id: UnitId,
) -> Result<()> {
    let unit = module.tree().move_unit(unit_id, new_parent_id).await?;
    print_unit(&unit)
}

pub async fn delete_unit(module: &DataScopeModule, unit_id: UnitId) -> Result<()> {
    module.tree().delete_unit(unit_id).await?;
    println!("{}", json!({ "deleted": unit_id }));
    Ok(())
}
