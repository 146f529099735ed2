//! Domain errors for the data-scope engine.

use data_scope_sdk::DataScopeError;
use datascope_model::UnitId;
use sea_orm::DbErr;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("store unavailable: {0}")]
    Store(String),

    #[error("scope cache error: {0}")]
    Cache(String),

    #[error("organizational unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("cannot move unit {unit_id} under {new_parent_id}: target is inside its own subtree")]
    InvalidMove {
        unit_id: UnitId,
        new_parent_id: UnitId,
    },

    #[error("organizational unit {0} still has child units")]
    UnitHasChildren(UnitId),

    #[error("validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<datascope_model::ScopeEncodeError> for DomainError {
    fn from(e: datascope_model::ScopeEncodeError) -> Self {
        Self::Cache(e.to_string())
    }
}

impl From<datascope_model::ScopeDecodeError> for DomainError {
    fn from(e: datascope_model::ScopeDecodeError) -> Self {
        Self::Cache(e.to_string())
    }
}

impl From<DomainError> for DataScopeError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Store(msg) => Self::StoreUnavailable(msg),
            DomainError::Database(e) => Self::StoreUnavailable(e.to_string()),
            DomainError::UnitNotFound(_)
            | DomainError::InvalidMove { .. }
            | DomainError::UnitHasChildren(_)
            | DomainError::Validation { .. } => Self::Internal(e.to_string()),
            DomainError::Cache(msg) | DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn store_failures_surface_as_unavailable() {
        let sdk: DataScopeError = DomainError::store("principals").into();
        assert!(matches!(sdk, DataScopeError::StoreUnavailable(msg) if msg == "principals"));

        let sdk: DataScopeError = DomainError::Database(DbErr::Custom("gone".to_owned())).into();
        assert!(matches!(sdk, DataScopeError::StoreUnavailable(_)));
    }

    #[test]
    fn tree_errors_keep_their_message() {
        let sdk: DataScopeError = DomainError::InvalidMove {
            unit_id: 2,
            new_parent_id: 4,
        }
        .into();
        match sdk {
            DataScopeError::Internal(msg) => assert!(msg.contains("unit 2 under 4")),
            DataScopeError::StoreUnavailable(_) => panic!("unexpected store error"),
        }
    }
}
