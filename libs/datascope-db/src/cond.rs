use sea_orm::sea_query::{Expr, IntoColumnRef};
use sea_orm::{ColumnTrait, Condition, EntityTrait};

use crate::DataScopedEntity;
use datascope_model::{EffectiveScope, PrincipalId, UnitId};

/// Build a deny-all condition (`WHERE false`).
fn deny_all() -> Condition {
    Condition::all().add(Expr::value(false))
}

/// Builds a `SeaORM` `Condition` from an `EffectiveScope` and two column accessors.
///
/// # Policy Rules
///
/// | Scope | Behavior |
/// |-------|----------|
/// | `all` | Empty condition (no filtering) |
/// | `self` | `owner = principal_id` |
/// | non-empty units | `department IN (units)` |
/// | `self` and units | OR of both branches |
/// | neither | `WHERE false` (fail closed) |
///
/// Values are passed as bound parameters; nothing is rendered into SQL text.
pub fn build_scope_condition<O, D>(
    scope: &EffectiveScope,
    principal_id: PrincipalId,
    owner: O,
    department: D,
) -> Condition
where
    O: IntoColumnRef,
    D: IntoColumnRef,
{
    if scope.is_all() {
        return Condition::all();
    }

    let mut any = Condition::any();
    let mut branches = 0usize;

    if scope.includes_self() {
        any = any.add(Expr::col(owner).eq(principal_id));
        branches += 1;
    }

    if !scope.unit_ids().is_empty() {
        let ids: Vec<UnitId> = scope.unit_ids().iter().copied().collect();
        any = any.add(Expr::col(department).is_in(ids));
        branches += 1;
    }

    if branches == 0 {
        tracing::warn!(
            principal_id,
            "effective scope grants nothing; applying deny-all filter"
        );
        return deny_all();
    }

    any
}

/// [`build_scope_condition`] using the columns an entity declares.
pub fn build_entity_condition<E>(scope: &EffectiveScope, principal_id: PrincipalId) -> Condition
where
    E: DataScopedEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    build_scope_condition(scope, principal_id, E::owner_col(), E::department_col())
}

/// The filter to attach for `scope`, or `None` when the scope is `all`.
///
/// Callers skip `.filter()` / `.cond_where()` on `None`; attaching the empty
/// condition would still render a `WHERE TRUE` clause.
#[must_use]
pub fn scope_filter<O, D>(
    scope: &EffectiveScope,
    principal_id: PrincipalId,
    owner: O,
    department: D,
) -> Option<Condition>
where
    O: IntoColumnRef,
    D: IntoColumnRef,
{
    if scope.is_all() {
        return None;
    }
    Some(build_scope_condition(scope, principal_id, owner, department))
}

/// [`scope_filter`] using the columns an entity declares.
#[must_use]
pub fn entity_scope_filter<E>(scope: &EffectiveScope, principal_id: PrincipalId) -> Option<Condition>
where
    E: DataScopedEntity + EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    scope_filter(scope, principal_id, E::owner_col(), E::department_col())
}

/// Evaluate the scope predicate against one row's owner and department.
///
/// Mirrors [`build_scope_condition`] for rows already in memory; a `None`
/// department never matches the unit branch.
#[must_use]
pub fn scope_admits(
    scope: &EffectiveScope,
    principal_id: PrincipalId,
    owner: PrincipalId,
    department: Option<UnitId>,
) -> bool {
    if scope.is_all() {
        return true;
    }
    if scope.includes_self() && owner == principal_id {
        return true;
    }
    department.is_some_and(|d| scope.contains_unit(d))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Query, SqliteQueryBuilder};

    fn render(cond: Option<Condition>) -> (String, Vec<sea_orm::Value>) {
        let mut select = Query::select();
        select.column(Alias::new("id")).from(Alias::new("doc"));
        if let Some(cond) = cond {
            select.cond_where(cond);
        }
        let (sql, values) = select.build(SqliteQueryBuilder);
        (sql, values.0)
    }

    fn cond_for(scope: &EffectiveScope, principal: PrincipalId) -> Option<Condition> {
        scope_filter(scope, principal, Alias::new("owner_id"), Alias::new("dept_id"))
    }

    #[test]
    fn all_scope_adds_no_filter() {
        assert!(cond_for(&EffectiveScope::all(), 1).is_none());
        let (sql, values) = render(cond_for(&EffectiveScope::all(), 1));
        assert!(!sql.contains("WHERE"), "unexpected filter: {sql}");
        assert!(values.is_empty());
    }

    #[test]
    fn all_scope_condition_is_empty() {
        let cond = build_scope_condition(
            &EffectiveScope::all(),
            1,
            Alias::new("owner_id"),
            Alias::new("dept_id"),
        );
        assert!(cond.is_empty());
    }

    #[test]
    fn self_only_filters_by_owner() {
        let (sql, values) = render(cond_for(&EffectiveScope::self_only(), 77));
        assert!(sql.contains(r#""owner_id" = ?"#), "got: {sql}");
        assert!(!sql.contains("IN"), "got: {sql}");
        assert_eq!(values, vec![sea_orm::Value::BigInt(Some(77))]);
    }

    #[test]
    fn units_only_filters_by_department() {
        let (sql, values) = render(cond_for(&EffectiveScope::new(false, [3, 5]), 77));
        assert!(sql.contains(r#""dept_id" IN (?, ?)"#), "got: {sql}");
        assert!(!sql.contains("owner_id"), "got: {sql}");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn self_and_units_are_or_ed() {
        let (sql, _) = render(cond_for(&EffectiveScope::new(true, [3]), 77));
        assert!(sql.contains(" OR "), "got: {sql}");
        assert!(sql.contains("owner_id"), "got: {sql}");
        assert!(sql.contains("dept_id"), "got: {sql}");
    }

    #[test]
    fn empty_scope_fails_closed() {
        let cond = cond_for(&EffectiveScope::default(), 77);
        let (sql, values) = render(cond);
        assert!(sql.contains("WHERE"), "expected a filter: {sql}");
        assert!(!sql.contains("owner_id"), "got: {sql}");
        assert!(!sql.contains("dept_id"), "got: {sql}");
        assert_eq!(values, vec![sea_orm::Value::Bool(Some(false))]);
    }

    #[test]
    fn unit_ids_are_never_inlined() {
        let scope = EffectiveScope::new(true, [424_242, 515_151]);
        let (sql, values) = render(cond_for(&scope, 909_090));
        for raw in ["424242", "515151", "909090"] {
            assert!(!sql.contains(raw), "{raw} leaked into SQL: {sql}");
        }
        assert!(values.contains(&sea_orm::Value::BigInt(Some(424_242))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(515_151))));
        assert!(values.contains(&sea_orm::Value::BigInt(Some(909_090))));
    }

    #[test]
    fn scope_admits_matches_policy_table() {
        let owner_and_units = EffectiveScope::new(true, [3]);
        assert!(scope_admits(&owner_and_units, 1, 1, None));
        assert!(scope_admits(&owner_and_units, 1, 2, Some(3)));
        assert!(!scope_admits(&owner_and_units, 1, 2, Some(4)));
        assert!(!scope_admits(&owner_and_units, 1, 2, None));

        assert!(scope_admits(&EffectiveScope::all(), 1, 2, None));
        assert!(!scope_admits(&EffectiveScope::default(), 1, 1, Some(3)));
    }
}
