//! Merge of a principal's own scope declaration with those of its roles.

use std::ops::ControlFlow;

use datascope_model::{EffectiveScope, ScopeDeclaration, ScopeKind, UnitIdSet};

use super::hierarchy::HierarchyIndex;
use super::model::{Principal, Role};

/// Compute the effective scope of `principal` holding `roles`.
///
/// - no principal: self-only
/// - any source declaring `All` wins outright
/// - otherwise `self` is OR-ed across sources and unit ids are unioned
/// - a result with neither `self` nor units falls back to self-only
///
/// Disabled and soft-deleted roles are skipped. The result carries
/// `tree_version` unchanged; the caller knows which version it read.
#[must_use]
pub fn calculate(
    principal: Option<&Principal>,
    roles: &[Role],
    index: &HierarchyIndex,
    tree_version: u64,
) -> EffectiveScope {
    let Some(principal) = principal else {
        return EffectiveScope::self_only().with_tree_version(tree_version);
    };

    let mut merge = Merge::default();
    let sources = std::iter::once(&principal.declaration).chain(
        roles
            .iter()
            .filter(|r| r.is_effective())
            .map(|r| &r.declaration),
    );
    for declaration in sources {
        if merge.apply(declaration, index).is_break() {
            return EffectiveScope::all().with_tree_version(tree_version);
        }
    }

    merge.finish().with_tree_version(tree_version)
}

/// Whether any source needs the unit tree to be expanded.
///
/// Lets the caller skip loading the unit table when nothing asks for
/// descendants.
#[must_use]
pub fn needs_hierarchy(principal: Option<&Principal>, roles: &[Role]) -> bool {
    let Some(principal) = principal else {
        return false;
    };
    std::iter::once(&principal.declaration)
        .chain(
            roles
                .iter()
                .filter(|r| r.is_effective())
                .map(|r| &r.declaration),
        )
        .any(|d| d.kind == ScopeKind::DepartmentAndDescendants)
}

#[derive(Default)]
struct Merge {
    include_self: bool,
    unit_ids: UnitIdSet,
}

impl Merge {
    fn apply(&mut self, declaration: &ScopeDeclaration, index: &HierarchyIndex) -> ControlFlow<()> {
        match declaration.kind {
            ScopeKind::All => return ControlFlow::Break(()),
            ScopeKind::SelfOnly => self.include_self = true,
            ScopeKind::Department => {
                self.unit_ids.extend(declaration.base_unit);
                self.unit_ids.extend(declaration.extra_units.iter().copied());
            }
            ScopeKind::DepartmentAndDescendants => {
                self.unit_ids.extend(index.closure(declaration.base_unit));
                for &extra in &declaration.extra_units {
                    self.unit_ids.extend(index.closure(Some(extra)));
                }
            }
            ScopeKind::Custom => {
                self.unit_ids
                    .extend(declaration.custom_units.iter().copied());
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(self) -> EffectiveScope {
        // never hand out a scope that shows nothing at all
        let include_self = self.include_self || self.unit_ids.is_empty();
        EffectiveScope::new(include_self, self.unit_ids)
    }
}
