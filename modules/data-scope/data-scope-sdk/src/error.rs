//! Error types for the data-scope module.

use thiserror::Error;

/// Errors that can occur when using the data-scope API.
///
/// Cache trouble never shows up here: the engine falls back to computing
/// the scope from the durable stores. Only failures of those stores do.
#[derive(Debug, Error)]
pub enum DataScopeError {
    /// A durable store (principals, roles, units) could not be read.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
