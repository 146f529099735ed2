use sea_orm::{ColumnTrait, QueryFilter};

use crate::cond::{entity_scope_filter, scope_admits};
use crate::{DataScopedEntity, ScopeError};
use datascope_model::{PrincipalId, ScopeContext, UnitId};

/// Apply the data-scope filter to any `SeaORM` query that accepts filters.
///
/// Used for write paths (`update_many`, `delete_many`) so that bulk writes
/// are restricted exactly like reads.
///
/// # Example
/// ```rust,ignore
/// let res = document::Entity::delete_many()
///     .filter(document::Column::Archived.eq(true))
///     .filter_data_scope::<document::Entity>(&ctx)
///     .exec(&conn)
///     .await?;
/// ```
pub trait DataScopeFilterExt: QueryFilter + Sized {
    #[must_use]
    fn filter_data_scope<E>(self, ctx: &ScopeContext) -> Self
    where
        E: DataScopedEntity,
        E::Column: ColumnTrait + Copy,
    {
        match entity_scope_filter::<E>(ctx.scope(), ctx.principal_id()) {
            Some(cond) => self.filter(cond),
            None => self,
        }
    }
}

impl<Q: QueryFilter> DataScopeFilterExt for Q {}

/// Check that a row about to be inserted or updated stays inside the scope.
///
/// # Errors
/// Returns `ScopeError::RowOutOfScope` if the scope does not admit the row.
pub fn validate_row_in_scope(
    ctx: &ScopeContext,
    owner: PrincipalId,
    department: Option<UnitId>,
) -> Result<(), ScopeError> {
    if scope_admits(ctx.scope(), ctx.principal_id(), owner, department) {
        return Ok(());
    }
    Err(ScopeError::RowOutOfScope {
        principal_id: ctx.principal_id(),
        owner,
        department,
    })
}
