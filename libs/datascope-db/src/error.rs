use datascope_model::{PrincipalId, UnitId};
use sea_orm::DbErr;

/// Errors raised by scoped query execution and row validation.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("row (owner {owner}, department {department:?}) is outside the data scope of principal {principal_id}")]
    RowOutOfScope {
        principal_id: PrincipalId,
        owner: PrincipalId,
        department: Option<UnitId>,
    },

    #[error(transparent)]
    Db(#[from] DbErr),
}
