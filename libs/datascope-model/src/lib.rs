#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Value types shared by every layer of the data-scope engine.
//!
//! - [`ScopeDeclaration`] / [`ScopeKind`]: what a principal or role declares
//! - [`EffectiveScope`]: the merged, ready-to-apply visibility result
//! - [`ScopeContext`]: explicit per-request carrier of a resolved scope
//! - [`codec`]: versioned binary encoding for external cache stores
pub mod codec;
pub mod context;
pub mod declaration;
pub mod effective_scope;
pub mod unit_set;

pub use codec::{SCOPE_BIN_VERSION, ScopeDecodeError, ScopeEncodeError, decode_scope, encode_scope};
pub use context::{ScopeContext, ScopeContextBuilder};
pub use declaration::{ScopeDeclaration, ScopeKind};
pub use effective_scope::EffectiveScope;
pub use unit_set::{
    PrincipalId, ROOT_UNIT_ID, RoleId, UnitId, UnitIdParseError, UnitIdSet, encode_unit_ids,
    parse_unit_ids, try_parse_unit_ids,
};
