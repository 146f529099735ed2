//! Identifier aliases and the serialized unit-id list format.
//!
//! Storage carries unit-id sets as JSON array text (`"[1,2,3]"`). Parsing is
//! lenient at the engine boundary: [`parse_unit_ids`] turns absent or malformed
//! input into an empty set. [`try_parse_unit_ids`] exposes the failure reason
//! for callers that want to log it.

use std::collections::BTreeSet;

/// Organizational unit identifier.
pub type UnitId = i64;

/// Principal (user) identifier.
pub type PrincipalId = i64;

/// Role identifier.
pub type RoleId = i64;

/// Synthetic parent id of top-level units.
pub const ROOT_UNIT_ID: UnitId = 0;

/// A set of unit ids. Order is irrelevant.
pub type UnitIdSet = BTreeSet<UnitId>;

/// Why a serialized unit-id list could not be read.
#[derive(Debug, thiserror::Error)]
pub enum UnitIdParseError {
    #[error("unit id list is not a JSON array: {0}")]
    NotAnArray(#[from] serde_json::Error),

    #[error("unit id list element is not an integer id: {0}")]
    BadElement(String),
}

/// Parse a serialized unit-id list, reporting malformed input.
///
/// Elements may be JSON integers or strings holding an integer
/// (`[1, "2"]`), since both shapes occur in stored data.
///
/// # Errors
///
/// Returns [`UnitIdParseError`] if the text is not a JSON array or any element
/// is not an integer id.
pub fn try_parse_unit_ids(raw: &str) -> Result<UnitIdSet, UnitIdParseError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    items
        .iter()
        .map(|item| match item {
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| UnitIdParseError::BadElement(n.to_string())),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<UnitId>()
                .map_err(|_| UnitIdParseError::BadElement(s.clone())),
            other => Err(UnitIdParseError::BadElement(other.to_string())),
        })
        .collect()
}

/// Parse a serialized unit-id list; absent or malformed input yields an empty set.
#[must_use]
pub fn parse_unit_ids(raw: Option<&str>) -> UnitIdSet {
    raw.and_then(|s| try_parse_unit_ids(s).ok())
        .unwrap_or_default()
}

/// Serialize a unit-id set into the storage format.
#[must_use]
pub fn encode_unit_ids(ids: &UnitIdSet) -> String {
    let parts: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}
