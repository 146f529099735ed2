//! Data Scope Module
//!
//! Resolves a principal's effective data scope from their own declaration and
//! the declarations of their roles, expands department scopes over the
//! organizational-unit tree, and caches the result per principal until the
//! tree version moves or an eviction hook fires.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{CacheConfig, DataScopeConfig, DatabaseConfig};
pub use module::DataScopeModule;
