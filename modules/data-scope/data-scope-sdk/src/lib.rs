#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Data Scope SDK
//!
//! This crate provides the public API for the `data_scope` module:
//!
//! - [`DataScopeClient`] - Public API trait for consumers
//! - [`DataScopeError`] - Error types
//! - [`EffectiveScope`], [`ScopeContext`] - re-exported value types
//!
//! ## Usage
//!
//! ```ignore
//! use data_scope_sdk::DataScopeClient;
//! use datascope_db::SecureEntityExt;
//!
//! let ctx = scopes.resolve_context(principal_id).await?;
//!
//! let docs = document::Entity::find()
//!     .secure()
//!     .scope_with(&ctx)
//!     .all(&conn)
//!     .await?;
//!
//! // after a role assignment commits
//! scopes.on_principal_roles_changed(principal_id).await?;
//! ```

pub mod api;
pub mod error;

pub use api::DataScopeClient;
pub use datascope_model::{EffectiveScope, PrincipalId, RoleId, ScopeContext, UnitId};
pub use error::DataScopeError;
