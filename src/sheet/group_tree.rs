//! Group forest with memoized depth-first order.
//!
//! Groups are kept in insertion order; that order decides sibling order in
//! the traversal. The depth-first order and per-group rank are rebuilt once
//! per mutation so render and export read the same cached sequence.

use crate::model::{Group, GroupId, SheetError};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// The group forest.
#[derive(Debug, Clone)]
pub struct GroupTree {
    groups: Vec<Group>,
    next_id: GroupId,
    order: Vec<GroupId>,
    rank: HashMap<GroupId, usize>,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// Empty forest; the first group gets id 1.
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            next_id: GroupId::FIRST,
            order: Vec::new(),
            rank: HashMap::new(),
        }
    }

    /// Rebuild a tree from stored groups.
    ///
    /// `next_id_hint` is the persisted counter; it is only trusted when it
    /// exceeds every existing id. Later duplicates of an id are dropped.
    pub fn from_groups(groups: Vec<Group>, next_id_hint: Option<u32>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(groups.len());
        for group in groups {
            if seen.insert(group.id) {
                kept.push(group);
            } else {
                warn!(group = %group.id, "Dropping stored group with duplicate id");
            }
        }

        let max_id = kept.iter().map(|g| g.id.get()).max().unwrap_or(0);
        let next = max_id
            .saturating_add(1)
            .max(next_id_hint.unwrap_or(0))
            .max(GroupId::FIRST.get());

        let mut tree = Self {
            groups: kept,
            next_id: GroupId::new(next),
            order: Vec::new(),
            rank: HashMap::new(),
        };
        tree.rebuild_order();
        tree
    }

    /// The id the next `add` will assign.
    pub fn next_id(&self) -> GroupId {
        self.next_id
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Look up a group by id.
    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Whether a group with `id` exists.
    pub fn contains(&self, id: GroupId) -> bool {
        self.get(id).is_some()
    }

    /// Create a group under `parent_id` (or as a root) and return it.
    ///
    /// # Errors
    ///
    /// `EmptyInput` when either name is blank, `UnknownGroup` when the parent
    /// does not exist.
    pub fn add(
        &mut self,
        name: &str,
        struct_name: &str,
        parent_id: Option<GroupId>,
    ) -> Result<&Group, SheetError> {
        let (name, struct_name) = validate_names(name, struct_name)?;
        if let Some(parent) = parent_id {
            if !self.contains(parent) {
                return Err(SheetError::UnknownGroup(parent));
            }
        }

        let id = self.next_id;
        self.next_id = id.next();
        self.groups.push(Group::new(id, name, struct_name, parent_id));
        self.rebuild_order();

        info!(group = %id, parent = ?parent_id.map(GroupId::get), "Group added");
        let idx = self.groups.len() - 1;
        Ok(&self.groups[idx])
    }

    /// Rename and/or reparent a group.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` when `id` or the new parent is unknown, `EmptyInput` on
    /// blank names, `Cycle` when the new parent is `id` itself or lies below it.
    pub fn update(
        &mut self,
        id: GroupId,
        name: &str,
        struct_name: &str,
        parent_id: Option<GroupId>,
    ) -> Result<(), SheetError> {
        let pos = self.position(id).ok_or(SheetError::UnknownGroup(id))?;
        let (name, struct_name) = validate_names(name, struct_name)?;

        if let Some(parent) = parent_id {
            if parent == id || self.is_descendant_of(parent, id) {
                return Err(SheetError::Cycle { group: id, parent });
            }
            if !self.contains(parent) {
                return Err(SheetError::UnknownGroup(parent));
            }
        }

        let group = &mut self.groups[pos];
        group.name = name;
        group.struct_name = struct_name;
        let reparented = group.parent_id != parent_id;
        group.parent_id = parent_id;
        if reparented {
            self.rebuild_order();
        }

        info!(group = %id, reparented, "Group updated");
        Ok(())
    }

    /// Remove a leaf group.
    ///
    /// Rows referencing the group are the caller's concern; see
    /// `RowStore::has_rows` and `RowStore::reassign_group`.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` for an unknown id, `HasChildren` when any group names
    /// `id` as its parent.
    pub fn remove(&mut self, id: GroupId) -> Result<Group, SheetError> {
        let pos = self.position(id).ok_or(SheetError::UnknownGroup(id))?;
        if self.has_children(id) {
            return Err(SheetError::HasChildren(id));
        }
        let removed = self.groups.remove(pos);
        self.rebuild_order();
        info!(group = %id, "Group removed");
        Ok(removed)
    }

    /// Direct children of `id`, in insertion order.
    pub fn children(&self, id: GroupId) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(move |g| g.parent_id == Some(id))
    }

    /// Whether any group names `id` as its parent.
    pub fn has_children(&self, id: GroupId) -> bool {
        self.children(id).next().is_some()
    }

    /// The resolved parent of `id`. Dangling parent ids resolve to `None`.
    pub fn parent_of(&self, id: GroupId) -> Option<&Group> {
        self.get(id)?.parent_id.and_then(|p| self.get(p))
    }

    /// Ancestors from the immediate parent up to the root.
    ///
    /// Empty for roots and unknown ids. Stops at a dangling parent or at the
    /// first repeated group when stored data contains a cycle.
    pub fn ancestors(&self, id: GroupId) -> Vec<&Group> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parent_of(id);
        while let Some(group) = current {
            if !seen.insert(group.id) {
                break;
            }
            chain.push(group);
            current = self.parent_of(group.id);
        }
        chain
    }

    /// Nesting level: 0 for a root.
    pub fn depth(&self, id: GroupId) -> usize {
        self.ancestors(id).len()
    }

    /// Groups from the root down to `id` inclusive. Empty for unknown ids.
    pub fn path(&self, id: GroupId) -> Vec<&Group> {
        let Some(group) = self.get(id) else {
            return Vec::new();
        };
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(group);
        path
    }

    /// The group at `level` on the path to `id` (level 0 is the root).
    pub fn group_at_level(&self, id: GroupId, level: usize) -> Option<&Group> {
        self.path(id).get(level).copied()
    }

    /// Deepest nesting level in the forest, `None` when there are no groups.
    ///
    /// A renderer needs `max_depth + 1` group columns.
    pub fn max_depth(&self) -> Option<usize> {
        self.groups.iter().map(|g| self.depth(g.id)).max()
    }

    /// Whether walking `a`'s ancestor chain reaches `b`.
    pub fn is_descendant_of(&self, a: GroupId, b: GroupId) -> bool {
        self.ancestors(a).iter().any(|g| g.id == b)
    }

    /// Canonical display and export order of groups.
    pub fn depth_first_order(&self) -> &[GroupId] {
        &self.order
    }

    /// Position of `id` in [`Self::depth_first_order`].
    pub fn rank(&self, id: GroupId) -> Option<usize> {
        self.rank.get(&id).copied()
    }

    fn position(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    fn rebuild_order(&mut self) {
        let ids: HashSet<GroupId> = self.groups.iter().map(|g| g.id).collect();
        let mut children: HashMap<GroupId, Vec<GroupId>> = HashMap::new();
        let mut roots = Vec::new();
        for group in &self.groups {
            match group.parent_id {
                Some(parent) if parent != group.id && ids.contains(&parent) => {
                    children.entry(parent).or_default().push(group.id);
                }
                _ => roots.push(group.id),
            }
        }

        let mut order = Vec::with_capacity(self.groups.len());
        let mut visited = HashSet::with_capacity(self.groups.len());
        // Groups caught in a stored cycle are unreachable from any root; they
        // follow in insertion order.
        let starts = roots
            .into_iter()
            .chain(self.groups.iter().map(|g| g.id))
            .collect::<Vec<_>>();
        for start in starts {
            let mut stack = vec![start];
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                order.push(id);
                if let Some(kids) = children.get(&id) {
                    stack.extend(kids.iter().rev().copied());
                }
            }
        }

        self.rank = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        self.order = order;
    }
}

fn validate_names(name: &str, struct_name: &str) -> Result<(String, String), SheetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SheetError::EmptyInput { input: "group name" });
    }
    let struct_name = struct_name.trim();
    if struct_name.is_empty() {
        return Err(SheetError::EmptyInput {
            input: "struct name",
        });
    }
    Ok((name.to_string(), struct_name.to_string()))
}

#[cfg(test)]
#[path = "group_tree_tests.rs"]
mod tests;
