use serde::{Deserialize, Serialize};

use crate::unit_set::{UnitId, UnitIdSet};

/// The merged visibility result for a principal at a point in time.
///
/// Three independent grants are OR-ed by the query layer:
/// - `all`: every row (implies `self`)
/// - `self`: rows whose owner is the principal
/// - `unit_ids`: rows whose department is one of these units
///
/// `tree_version` is the organizational-tree version the scope was computed
/// against; the cache compares it with the current version on every read.
///
/// # Examples
///
/// ```
/// use datascope_model::EffectiveScope;
///
/// let scope = EffectiveScope::all();
/// assert!(scope.is_all() && scope.includes_self());
///
/// let scope = EffectiveScope::new(false, [10, 11]);
/// assert!(scope.contains_unit(10));
/// assert!(!scope.is_deny_all());
///
/// // The default scope grants nothing.
/// assert!(EffectiveScope::default().is_deny_all());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveScope {
    all: bool,
    #[serde(rename = "self")]
    include_self: bool,
    unit_ids: UnitIdSet,
    tree_version: u64,
}

impl EffectiveScope {
    /// Full visibility. Always includes self and carries no units.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all: true,
            include_self: true,
            unit_ids: UnitIdSet::new(),
            tree_version: 0,
        }
    }

    /// Only rows owned by the principal.
    #[must_use]
    pub fn self_only() -> Self {
        Self::new(true, [])
    }

    /// A restricted scope (not `all`).
    #[must_use]
    pub fn new(include_self: bool, unit_ids: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            all: false,
            include_self,
            unit_ids: unit_ids.into_iter().collect(),
            tree_version: 0,
        }
    }

    /// Stamp the tree version this scope was computed against.
    #[must_use]
    pub fn with_tree_version(mut self, tree_version: u64) -> Self {
        self.tree_version = tree_version;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.all
    }

    #[inline]
    #[must_use]
    pub fn includes_self(&self) -> bool {
        self.include_self
    }

    #[inline]
    #[must_use]
    pub fn unit_ids(&self) -> &UnitIdSet {
        &self.unit_ids
    }

    #[inline]
    #[must_use]
    pub fn tree_version(&self) -> u64 {
        self.tree_version
    }

    #[must_use]
    pub fn contains_unit(&self, id: UnitId) -> bool {
        self.unit_ids.contains(&id)
    }

    /// `true` when the scope grants nothing at all.
    #[must_use]
    pub fn is_deny_all(&self) -> bool {
        !self.all && !self.include_self && self.unit_ids.is_empty()
    }
}
