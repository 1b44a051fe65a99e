use crate::{branch::BranchSet, types::BranchId, vector::Vector2};

/// Per-iteration scratch that accumulates grow directions per branch.
///
/// For each `BranchId`, this buffer stores:
///
/// - The accumulated grow direction, seeded with the branch's own creation
///   direction and then summed with every unit pull it receives.
/// - The number of pulls that were added.
///
/// The seed is not counted, so the average is
/// `(grow_dir + sum of pulls) / count`.
#[derive(Debug, Default)]
pub struct InfluenceBuffer {
    /// Accumulated direction vectors for each branch.
    dir: Vec<Vector2>,
    /// Number of pulls for each branch.
    pub count: Vec<u32>,
}

impl InfluenceBuffer {
    /// Creates a buffer with `len` zeroed entries.
    pub fn with_len(len: usize) -> Self {
        Self {
            dir: vec![Vector2::ZERO; len],
            count: vec![0; len],
        }
    }

    /// Resizes the buffer to cover every branch in `branches` and resets
    /// each entry to that branch's creation direction with a zero count.
    pub fn ensure_len_from(&mut self, branches: &BranchSet) {
        self.dir.clear();
        self.dir.extend(branches.iter().map(|(_, b)| b.grow_dir));
        self.count.clear();
        self.count.resize(branches.len(), 0);
    }

    /// Restores one entry to `seed` with a zero count.
    ///
    /// Spawning calls this for every branch it grows from, whether or not
    /// the new branch ends up being kept.
    #[inline]
    pub fn reset_entry(&mut self, id: BranchId, seed: Vector2) {
        self.dir[id] = seed;
        self.count[id] = 0;
    }

    /// Adds one pull for the given branch.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds for the internal arrays.
    #[inline]
    pub fn add(&mut self, id: BranchId, dir: Vector2) {
        self.dir[id] += dir;
        self.count[id] += 1;
    }

    /// Accumulated direction divided by the pull count, or `Vector2::ZERO`
    /// when the branch received no pulls.
    #[inline]
    pub fn avg_dir(&self, id: BranchId) -> Vector2 {
        let c = self.count[id];
        if c == 0 {
            Vector2::ZERO
        } else {
            self.dir[id] / f64::from(c)
        }
    }

    #[inline]
    pub fn is_influenced(&self, id: BranchId) -> bool {
        self.count[id] > 0
    }

    /// Ids of branches with at least one pull, in ascending order.
    pub fn influenced_indices(&self) -> impl Iterator<Item = BranchId> + '_ {
        (0..self.count.len()).filter(move |&i| self.is_influenced(i))
    }
}
