//! Parent-to-children index over the active organizational units.

use std::collections::{HashMap, HashSet, VecDeque};

use datascope_model::{ROOT_UNIT_ID, UnitId, UnitIdSet};

use super::model::OrgUnit;

/// Read-only adjacency index built from a snapshot of the unit table.
///
/// Only active units are indexed. A unit with an unset (zero or negative)
/// parent hangs off the synthetic root [`ROOT_UNIT_ID`].
#[derive(Debug, Default, Clone)]
pub struct HierarchyIndex {
    children: HashMap<UnitId, Vec<UnitId>>,
    units: HashSet<UnitId>,
}

impl HierarchyIndex {
    #[must_use]
    pub fn build<'a>(units: impl IntoIterator<Item = &'a OrgUnit>) -> Self {
        let mut index = Self::default();
        for unit in units.into_iter().filter(|u| u.active) {
            let parent = if unit.parent_id > ROOT_UNIT_ID {
                unit.parent_id
            } else {
                ROOT_UNIT_ID
            };
            index.units.insert(unit.id);
            index.children.entry(parent).or_default().push(unit.id);
        }
        for kids in index.children.values_mut() {
            kids.sort_unstable();
        }
        index
    }

    /// The unit and every active descendant reachable from it.
    ///
    /// Breadth-first; an id is queued at most once, so corrupt data with a
    /// parent cycle still terminates. Unknown or absent start ids yield an
    /// empty set.
    #[must_use]
    pub fn closure(&self, start: Option<UnitId>) -> UnitIdSet {
        let mut visited = UnitIdSet::new();
        let Some(start) = start.filter(|id| self.units.contains(id)) else {
            return visited;
        };

        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(id) = queue.pop_front() {
            for &child in self.children(id) {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        visited
    }

    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains(&id)
    }

    /// Direct active children, ascending. Use [`ROOT_UNIT_ID`] for top-level units.
    #[must_use]
    pub fn children(&self, id: UnitId) -> &[UnitId] {
        self.children.get(&id).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
