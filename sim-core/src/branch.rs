use crate::{
    types::{BranchId, PositionKey},
    vector::{UP, Vector2, Vector2Ext},
};
use std::{collections::HashMap, ops::Index};

/// A node of the growth graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub pos: Vector2,
    pub parent: Option<BranchId>,
    /// Direction the branch was created with. Seeds the per-iteration
    /// grow-direction accumulator.
    pub grow_dir: Vector2,
    /// Thickness; only ever raised after creation.
    pub size: f64,
}

impl Branch {
    pub fn new_root(pos: Vector2, grow_dir: Vector2, size: f64) -> Self {
        Self {
            pos,
            parent: None,
            grow_dir,
            size,
        }
    }

    pub fn new_child(pos: Vector2, grow_dir: Vector2, size: f64, parent: BranchId) -> Self {
        Self {
            pos,
            parent: Some(parent),
            grow_dir,
            size,
        }
    }
}

/// Arena of branches, unique by exact position.
///
/// Ids are indices into the arena and follow insertion order, which is also
/// the order growth scans branches in.
#[derive(Clone, Debug, Default)]
pub struct BranchSet {
    branches: Vec<Branch>,
    by_pos: HashMap<PositionKey, BranchId>,
}

impl BranchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the root at `origin` and a straight trunk above it.
    ///
    /// Branches are appended `branch_length` apart along `(0, -1)` until the
    /// last one is at least `trunk_height` from the root. At least one
    /// branch is always appended above the root.
    pub fn trunk(origin: Vector2, branch_length: f64, trunk_height: f64, size: f64) -> Self {
        let mut set = Self::new();
        let Some(root) = set.insert_unique(Branch::new_root(origin, UP, size)) else {
            return set;
        };

        let mut current = root;
        loop {
            let pos = set[current].pos + UP * branch_length;
            match set.insert_unique(Branch::new_child(pos, UP, size, current)) {
                Some(id) => current = id,
                // Only reachable when branch_length vanishes against the
                // magnitude of the coordinates.
                None => break,
            }
            if (set[root].pos - set[current].pos).length() >= trunk_height {
                break;
            }
        }

        set
    }

    /// Inserts `branch` unless a branch already sits at exactly its position.
    ///
    /// ### Returns
    /// The new id, or `None` if the position was taken.
    pub fn insert_unique(&mut self, branch: Branch) -> Option<BranchId> {
        let key = branch.pos.position_key();
        if self.by_pos.contains_key(&key) {
            return None;
        }
        let id = self.branches.len();
        self.by_pos.insert(key, id);
        self.branches.push(branch);
        Some(id)
    }

    #[inline]
    pub fn get(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: BranchId) -> Option<&mut Branch> {
        self.branches.get_mut(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Branches with their ids, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (BranchId, &Branch)> + '_ {
        self.branches.iter().enumerate()
    }

    /// Ids on the path from `id`'s parent up to the root.
    pub fn ancestors(&self, id: BranchId) -> impl Iterator<Item = BranchId> + '_ {
        std::iter::successors(self.branches.get(id).and_then(|b| b.parent), |&p| {
            self.branches[p].parent
        })
    }
}

impl Index<BranchId> for BranchSet {
    type Output = Branch;

    #[inline]
    fn index(&self, id: BranchId) -> &Branch {
        &self.branches[id]
    }
}
