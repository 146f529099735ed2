use serde::{Deserialize, Serialize};

use crate::unit_set::{UnitId, UnitIdSet};

/// How a single source (principal or role) contributes to visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Every row.
    All,
    /// Rows owned by the principal.
    SelfOnly,
    /// Rows of the base unit and the extra units, without descendants.
    Department,
    /// Rows of the base unit, the extra units, and all their descendants.
    DepartmentAndDescendants,
    /// Rows of an explicit unit list, without descendants.
    Custom,
}

impl ScopeKind {
    /// Integer code used in storage.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::All => 1,
            Self::SelfOnly => 2,
            Self::Department => 3,
            Self::DepartmentAndDescendants => 4,
            Self::Custom => 5,
        }
    }

    /// Decode a storage code. Unknown codes yield `None`.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::All),
            2 => Some(Self::SelfOnly),
            3 => Some(Self::Department),
            4 => Some(Self::DepartmentAndDescendants),
            5 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// A scope declaration, embedded in both principals and roles.
///
/// `base_unit` is the principal's own unit or the role's override unit.
/// `custom_units` is only consulted for [`ScopeKind::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDeclaration {
    pub kind: ScopeKind,
    pub base_unit: Option<UnitId>,
    #[serde(default)]
    pub extra_units: UnitIdSet,
    #[serde(default)]
    pub custom_units: UnitIdSet,
}

impl ScopeDeclaration {
    /// Declaration of the given kind with no units attached.
    #[must_use]
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            base_unit: None,
            extra_units: UnitIdSet::new(),
            custom_units: UnitIdSet::new(),
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(ScopeKind::All)
    }

    #[must_use]
    pub fn self_only() -> Self {
        Self::new(ScopeKind::SelfOnly)
    }

    #[must_use]
    pub fn department(base_unit: UnitId) -> Self {
        Self::new(ScopeKind::Department).with_base_unit(base_unit)
    }

    #[must_use]
    pub fn department_and_descendants(base_unit: UnitId) -> Self {
        Self::new(ScopeKind::DepartmentAndDescendants).with_base_unit(base_unit)
    }

    #[must_use]
    pub fn custom(units: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            custom_units: units.into_iter().collect(),
            ..Self::new(ScopeKind::Custom)
        }
    }

    #[must_use]
    pub fn with_base_unit(mut self, base_unit: UnitId) -> Self {
        self.base_unit = Some(base_unit);
        self
    }

    #[must_use]
    pub fn with_extra_units(mut self, units: impl IntoIterator<Item = UnitId>) -> Self {
        self.extra_units = units.into_iter().collect();
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_for_every_kind() {
        for kind in [
            ScopeKind::All,
            ScopeKind::SelfOnly,
            ScopeKind::Department,
            ScopeKind::DepartmentAndDescendants,
            ScopeKind::Custom,
        ] {
            assert_eq!(ScopeKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn unknown_code_is_none() {
        assert_eq!(ScopeKind::from_code(0), None);
        assert_eq!(ScopeKind::from_code(42), None);
    }

    #[test]
    fn builders_fill_expected_fields() {
        let decl = ScopeDeclaration::department_and_descendants(1).with_extra_units([4]);
        assert_eq!(decl.kind, ScopeKind::DepartmentAndDescendants);
        assert_eq!(decl.base_unit, Some(1));
        assert!(decl.extra_units.contains(&4));
        assert!(decl.custom_units.is_empty());

        let custom = ScopeDeclaration::custom([3, 3, 2]);
        assert_eq!(custom.custom_units.len(), 2);
        assert_eq!(custom.base_unit, None);
    }
}
