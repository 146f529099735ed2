//! Directory records the engine reads: units, principals and roles.

use datascope_model::{PrincipalId, ROOT_UNIT_ID, RoleId, ScopeDeclaration, ScopeKind, UnitId};

/// A node of the organizational-unit tree.
///
/// `path` is materialized as `/1/3/7/`: the parent's path followed by the
/// unit's own id. Units directly under the root have path `/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnit {
    pub id: UnitId,
    pub parent_id: UnitId,
    pub name: String,
    pub path: String,
    pub active: bool,
}

impl OrgUnit {
    /// Whether this unit hangs directly off the synthetic root.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id <= ROOT_UNIT_ID
    }

    /// Whether `other` lies in this unit's subtree (the unit itself included).
    #[must_use]
    pub fn is_ancestor_of(&self, other: &OrgUnit) -> bool {
        other.path.starts_with(&self.path)
    }
}

/// A principal together with its own scope declaration.
///
/// The declaration's `base_unit` is the principal's own department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub declaration: ScopeDeclaration,
    pub role_ids: Vec<RoleId>,
}

impl Principal {
    #[must_use]
    pub fn new(id: PrincipalId, declaration: ScopeDeclaration) -> Self {
        Self {
            id,
            declaration,
            role_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_roles(mut self, role_ids: impl IntoIterator<Item = RoleId>) -> Self {
        self.role_ids = role_ids.into_iter().collect();
        self
    }

    /// The principal's own department, if assigned.
    #[must_use]
    pub fn unit_id(&self) -> Option<UnitId> {
        self.declaration.base_unit
    }
}

/// A role and the scope it grants its holders.
///
/// The declaration's `base_unit` is the role's override unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub enabled: bool,
    pub deleted: bool,
    pub declaration: ScopeDeclaration,
}

impl Role {
    /// An enabled, live role.
    #[must_use]
    pub fn new(id: RoleId, declaration: ScopeDeclaration) -> Self {
        Self {
            id,
            enabled: true,
            deleted: false,
            declaration,
        }
    }

    /// Disabled or soft-deleted roles grant nothing.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.enabled && !self.deleted
    }
}

/// Map a stored scope-kind code, falling back to minimal visibility.
#[must_use]
pub fn scope_kind_or_self(code: i32) -> ScopeKind {
    ScopeKind::from_code(code).unwrap_or_else(|| {
        tracing::warn!(code, "unknown scope kind code, treating as self-only");
        ScopeKind::SelfOnly
    })
}
