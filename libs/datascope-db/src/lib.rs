#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Data-scope predicate binder for `SeaORM`.
//!
//! Translates an [`EffectiveScope`] into a `SeaORM` [`Condition`] over two
//! columns supplied by the caller: the record owner and the record department.
//!
//! # Basic Example
//!
//! ```rust
//! use datascope_db::{build_scope_condition, scope_filter};
//! use datascope_model::EffectiveScope;
//! use sea_orm::sea_query::Alias;
//!
//! let scope = EffectiveScope::new(true, [10, 11]);
//! let cond = build_scope_condition(&scope, 7, Alias::new("created_by"), Alias::new("dept_id"));
//! assert!(!cond.is_empty());
//!
//! // `all` adds no filter at all.
//! let cond = build_scope_condition(&EffectiveScope::all(), 7, Alias::new("created_by"), Alias::new("dept_id"));
//! assert!(cond.is_empty());
//! assert!(scope_filter(&EffectiveScope::all(), 7, Alias::new("created_by"), Alias::new("dept_id")).is_none());
//! ```
//!
//! # Quick Start with entities
//!
//! ```rust,ignore
//! use datascope_db::{DataScopedEntity, SecureEntityExt};
//!
//! impl DataScopedEntity for document::Entity {
//!     fn owner_col() -> Self::Column {
//!         document::Column::CreatedBy
//!     }
//!     fn department_col() -> Self::Column {
//!         document::Column::DeptId
//!     }
//! }
//!
//! let docs = document::Entity::find()
//!     .secure()
//!     .scope_with(&ctx)
//!     .all(&conn)
//!     .await?;
//! ```
//!
//! # Policy
//!
//! | Scope | Behavior |
//! |-------|----------|
//! | `all` | No filtering |
//! | `self` only | `owner = principal` |
//! | units only | `department IN (units)` |
//! | `self` and units | OR of both |
//! | nothing granted | Deny all (`WHERE false`) |
//!
//! Unit ids and the principal id are always bound as query parameters.
//!
//! [`Condition`]: sea_orm::Condition

mod cond;
mod entity_traits;
mod error;
mod filter;
mod select;

pub use datascope_model::{EffectiveScope, PrincipalId, ScopeContext, UnitId};

pub use cond::{
    build_entity_condition, build_scope_condition, entity_scope_filter, scope_admits, scope_filter,
};
pub use entity_traits::DataScopedEntity;
pub use error::ScopeError;
pub use filter::{DataScopeFilterExt, validate_row_in_scope};
pub use select::{Scoped, SecureEntityExt, SecureSelect, Unscoped};
