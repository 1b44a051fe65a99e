//! The phases of one growth iteration.
//!
//! A step runs them in order:
//! 1. [`association_phase`] — every attraction point is either consumed by
//!    a branch within `min_distance` or pulls on its nearest branch within
//!    `max_distance`, accumulating into an [`InfluenceBuffer`].
//! 2. [`spawn_phase`] — every pulled branch proposes one child along its
//!    averaged direction and has its accumulator reset.
//! 3. [`insertion_phase`] — proposals are added unless a branch already
//!    sits at exactly the same position.
//! 4. [`thickening_phase`] — sizes are propagated from each new tip toward
//!    the root.

use crate::{
    attractor::AttractorSet,
    branch::{Branch, BranchSet},
    config::GrowthParams,
    influence_buffer::InfluenceBuffer,
    types::BranchId,
    vector::{Vector2, Vector2Ext},
};

/// Outcome of scanning the branches for one attraction point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Association {
    /// A branch is within `min_distance`; the point is used up.
    Consumed,
    /// The point pulls on this branch.
    Pulled(BranchId),
    /// No branch is within `max_distance`.
    Free,
}

/// A proposed child branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub parent: BranchId,
    pub pos: Vector2,
    pub dir: Vector2,
}

/// Finds what a point at `pos` does this iteration.
///
/// Distances to branches are rounded to the nearest integer before being
/// compared with the thresholds. The first in-range branch is held, and a
/// later one replaces it only when the exact distance to the held branch is
/// greater than the later branch's rounded distance. The scan stops at the
/// first branch within `min_distance`.
pub fn associate(branches: &BranchSet, pos: Vector2, params: &GrowthParams) -> Association {
    let mut closest: Option<BranchId> = None;

    for (id, b) in branches.iter() {
        let distance = (pos - b.pos).length().round();

        if distance <= params.min_distance {
            return Association::Consumed;
        }
        if distance <= params.max_distance {
            closest = match closest {
                Some(held) if (pos - branches[held].pos).length() <= distance => Some(held),
                _ => Some(id),
            };
        }
    }

    closest.map_or(Association::Free, Association::Pulled)
}

/// Associates every remaining attraction point with the tree.
///
/// Consumed points are removed from `attractors`; the survivors keep their
/// relative order. For a pulled point the unit direction from the branch to
/// the point is added to that branch's entry in `acc` and the branch is
/// recorded as the point's `closest_branch`.
///
/// The buffer is resized and reseeded from `branches` first via
/// [`InfluenceBuffer::ensure_len_from`].
///
/// ### Returns
/// The number of points consumed.
pub fn association_phase(
    branches: &BranchSet,
    attractors: &mut AttractorSet,
    params: &GrowthParams,
    acc: &mut InfluenceBuffer,
) -> usize {
    acc.ensure_len_from(branches);

    let mut consumed = 0;
    attractors.points.retain_mut(|a| {
        a.closest_branch = None;

        match associate(branches, a.pos, params) {
            Association::Consumed => {
                consumed += 1;
                false
            }
            Association::Pulled(id) => {
                a.closest_branch = Some(id);
                acc.add(id, (a.pos - branches[id].pos).normalized());
                true
            }
            Association::Free => true,
        }
    });

    consumed
}

/// Proposes one child for every branch that was pulled this iteration.
///
/// The child sits `branch_length` along the normalized average direction,
/// and that direction becomes its creation direction. Each parent's entry
/// in `acc` is reset to its creation direction. Candidates come out in
/// branch order.
pub fn spawn_phase(
    branches: &BranchSet,
    acc: &mut InfluenceBuffer,
    params: &GrowthParams,
) -> Vec<Candidate> {
    let pulled: Vec<BranchId> = acc.influenced_indices().collect();
    let mut candidates = Vec::with_capacity(pulled.len());

    for id in pulled {
        let parent = &branches[id];
        let dir = acc.avg_dir(id).normalized();

        candidates.push(Candidate {
            parent: id,
            pos: parent.pos + dir * params.branch_length,
            dir,
        });
        acc.reset_entry(id, parent.grow_dir);
    }

    candidates
}

/// Inserts candidates whose position is not already taken.
///
/// Candidates are checked in order against the set as it grows, so two
/// candidates landing on the same spot keep only the first.
///
/// ### Returns
/// Ids of the inserted branches in insertion order.
pub fn insertion_phase(
    branches: &mut BranchSet,
    candidates: &[Candidate],
    params: &GrowthParams,
) -> Vec<BranchId> {
    candidates
        .iter()
        .filter_map(|c| {
            branches.insert_unique(Branch::new_child(
                c.pos,
                c.dir,
                params.initial_size,
                c.parent,
            ))
        })
        .collect()
}

/// Thickens the ancestors of each new tip.
///
/// For every tip, in order: the tip gets `initial_size`, then walking up
/// from its parent, each branch `p` that has a parent sets that parent's
/// size to `p.size + grow_increment`. A write never lowers a size that an
/// earlier walk raised higher.
pub fn thickening_phase(branches: &mut BranchSet, tips: &[BranchId], params: &GrowthParams) {
    for &tip in tips {
        let Some(b) = branches.get_mut(tip) else {
            continue;
        };
        b.size = params.initial_size;

        let mut cursor = b.parent;
        while let Some(p) = cursor {
            let child_size = branches[p].size;
            let up = branches[p].parent;
            if let Some(gp) = up.and_then(|gp| branches.get_mut(gp)) {
                gp.size = gp.size.max(child_size + params.grow_increment);
            }
            cursor = up;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attractor::AttractorSet, vector::UP};

    fn params(min_distance: f64, max_distance: f64, branch_length: f64) -> GrowthParams {
        GrowthParams {
            min_distance,
            max_distance,
            branch_length,
            ..GrowthParams::default()
        }
    }

    fn single_root(pos: Vector2) -> BranchSet {
        let mut set = BranchSet::new();
        set.insert_unique(Branch::new_root(pos, UP, 0.002));
        set
    }

    #[test]
    fn associate_consumes_within_min_distance() {
        let branches = single_root(Vector2::ZERO);
        let p = params(2.0, 15.0, 2.0);

        assert_eq!(
            associate(&branches, Vector2::new(1.0, 0.0), &p),
            Association::Consumed
        );
        // 2.4 rounds to 2, which is still within min_distance.
        assert_eq!(
            associate(&branches, Vector2::new(2.4, 0.0), &p),
            Association::Consumed
        );
        assert_eq!(
            associate(&branches, Vector2::new(2.5, 0.0), &p),
            Association::Pulled(0)
        );
    }

    #[test]
    fn associate_ignores_branches_beyond_max_distance() {
        let branches = single_root(Vector2::ZERO);
        let p = params(2.0, 15.0, 2.0);

        assert_eq!(
            associate(&branches, Vector2::new(15.4, 0.0), &p),
            Association::Pulled(0)
        );
        assert_eq!(
            associate(&branches, Vector2::new(15.5, 0.0), &p),
            Association::Free
        );
    }

    #[test]
    fn associate_stops_scanning_at_first_consuming_branch() {
        // The far branch comes first and would be held; the near one consumes.
        let mut branches = single_root(Vector2::new(0.0, 10.0));
        branches.insert_unique(Branch::new_child(Vector2::new(0.0, 1.0), UP, 0.002, 0));
        let p = params(2.0, 15.0, 2.0);

        assert_eq!(
            associate(&branches, Vector2::ZERO, &p),
            Association::Consumed
        );
    }

    #[test]
    fn associate_keeps_earlier_branch_on_exact_tie() {
        // Both branches are exactly 10 away.
        let mut branches = single_root(Vector2::new(-10.0, 0.0));
        branches.insert_unique(Branch::new_child(Vector2::new(10.0, 0.0), UP, 0.002, 0));
        let p = params(2.0, 15.0, 2.0);

        assert_eq!(
            associate(&branches, Vector2::ZERO, &p),
            Association::Pulled(0)
        );
    }

    #[test]
    fn associate_compares_exact_held_distance_with_rounded_new_distance() {
        // Held branch is 10.2 away, the later one 9.6 away which rounds to 10:
        // 10.2 > 10, so the later branch wins.
        let mut branches = single_root(Vector2::new(10.2, 0.0));
        branches.insert_unique(Branch::new_child(Vector2::new(-9.6, 0.0), UP, 0.002, 0));
        let p = params(2.0, 15.0, 2.0);
        assert_eq!(
            associate(&branches, Vector2::ZERO, &p),
            Association::Pulled(1)
        );

        // Held branch is 9.6 away, the later one 10.2 away (rounds to 10):
        // 9.6 <= 10, so the held branch stays.
        let mut branches = single_root(Vector2::new(-9.6, 0.0));
        branches.insert_unique(Branch::new_child(Vector2::new(10.2, 0.0), UP, 0.002, 0));
        assert_eq!(
            associate(&branches, Vector2::ZERO, &p),
            Association::Pulled(0)
        );
    }

    #[test]
    fn association_phase_removes_consumed_points_and_keeps_order() {
        let branches = single_root(Vector2::ZERO);
        let mut attractors = AttractorSet::from_positions(vec![
            Vector2::new(5.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 100.0),
            Vector2::new(0.0, -5.0),
        ]);
        let mut acc = InfluenceBuffer::default();

        let consumed = association_phase(&branches, &mut attractors, &params(2.0, 15.0, 2.0), &mut acc);

        assert_eq!(consumed, 1);
        let left: Vec<Vector2> = attractors.points.iter().map(|a| a.pos).collect();
        assert_eq!(
            left,
            vec![
                Vector2::new(5.0, 0.0),
                Vector2::new(0.0, 100.0),
                Vector2::new(0.0, -5.0)
            ]
        );
        assert_eq!(attractors.points[0].closest_branch, Some(0));
        assert_eq!(attractors.points[1].closest_branch, None);
        assert_eq!(attractors.points[2].closest_branch, Some(0));
        assert_eq!(acc.count[0], 2);
    }

    #[test]
    fn association_phase_clears_stale_associations() {
        let branches = single_root(Vector2::ZERO);
        let mut attractors = AttractorSet::from_positions(vec![Vector2::new(50.0, 0.0)]);
        attractors.points[0].closest_branch = Some(0);
        let mut acc = InfluenceBuffer::default();

        association_phase(&branches, &mut attractors, &params(2.0, 15.0, 2.0), &mut acc);

        assert_eq!(attractors.points[0].closest_branch, None);
        assert!(!acc.is_influenced(0));
    }

    #[test]
    fn spawn_phase_grows_along_average_and_resets_accumulator() {
        let branches = BranchSet::trunk(Vector2::ZERO, 2.0, 2.0, 0.002);
        let mut acc = InfluenceBuffer::default();
        acc.ensure_len_from(&branches);
        // Pull straight up on the top branch: seed (0,-1) plus (0,-1).
        acc.add(1, UP);

        let candidates = spawn_phase(&branches, &mut acc, &params(2.0, 15.0, 2.0));

        assert_eq!(
            candidates,
            vec![Candidate {
                parent: 1,
                pos: Vector2::new(0.0, -4.0),
                dir: UP,
            }]
        );
        assert!(!acc.is_influenced(1));
        assert_eq!(acc.avg_dir(1), Vector2::ZERO);
    }

    #[test]
    fn spawn_phase_blends_pull_with_creation_direction() {
        let branches = single_root(Vector2::ZERO);
        let mut acc = InfluenceBuffer::default();
        acc.ensure_len_from(&branches);
        acc.add(0, Vector2::new(1.0, 0.0));

        let candidates = spawn_phase(&branches, &mut acc, &params(2.0, 15.0, 2.0));

        let expected = Vector2::new(1.0, -1.0).normalized();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].dir, expected);
        assert_eq!(candidates[0].pos, expected * 2.0);
    }

    #[test]
    fn spawn_phase_with_no_pulls_is_empty() {
        let branches = single_root(Vector2::ZERO);
        let mut acc = InfluenceBuffer::default();
        acc.ensure_len_from(&branches);

        assert!(spawn_phase(&branches, &mut acc, &params(2.0, 15.0, 2.0)).is_empty());
    }

    #[test]
    fn insertion_phase_drops_colliding_candidates() {
        let mut branches = BranchSet::trunk(Vector2::ZERO, 2.0, 2.0, 0.002);
        let p = params(2.0, 15.0, 2.0);
        let candidates = [
            // Lands on the existing top branch.
            Candidate {
                parent: 0,
                pos: Vector2::new(0.0, -2.0),
                dir: UP,
            },
            Candidate {
                parent: 1,
                pos: Vector2::new(2.0, -2.0),
                dir: Vector2::new(1.0, 0.0),
            },
            // Same spot as the previous candidate.
            Candidate {
                parent: 0,
                pos: Vector2::new(2.0, -2.0),
                dir: Vector2::new(1.0, -1.0).normalized(),
            },
        ];

        let inserted = insertion_phase(&mut branches, &candidates, &p);

        assert_eq!(inserted, vec![2]);
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[2].parent, Some(1));
        assert_eq!(branches[2].grow_dir, Vector2::new(1.0, 0.0));
        assert_eq!(branches[2].size, p.initial_size);
    }

    #[test]
    fn thickening_grows_toward_the_root() {
        // root(0) <- 1 <- 2 <- 3
        let mut branches = BranchSet::trunk(Vector2::ZERO, 1.0, 3.0, 0.25);
        let p = GrowthParams {
            initial_size: 1.0,
            grow_increment: 0.5,
            ..GrowthParams::default()
        };

        thickening_phase(&mut branches, &[3], &p);

        assert_eq!(branches[3].size, 1.0);
        // The tip's parent is not written by its own walk.
        assert_eq!(branches[2].size, 0.25);
        assert_eq!(branches[1].size, 0.75);
        assert_eq!(branches[0].size, 1.25);
    }

    #[test]
    fn thickening_never_shrinks_a_branch() {
        // root(0) <- 1 <- 2, and a short side branch 3 off the root.
        let mut branches = BranchSet::trunk(Vector2::ZERO, 1.0, 2.0, 1.0);
        branches.insert_unique(Branch::new_child(Vector2::new(1.0, 0.0), UP, 1.0, 0));
        branches.insert_unique(Branch::new_child(Vector2::new(2.0, 0.0), UP, 1.0, 3));
        let p = GrowthParams {
            initial_size: 1.0,
            grow_increment: 1.0,
            ..GrowthParams::default()
        };

        thickening_phase(&mut branches, &[2], &p);
        assert_eq!(branches[0].size, 2.0);

        branches.get_mut(1).unwrap().size = 5.0;
        thickening_phase(&mut branches, &[2], &p);
        assert_eq!(branches[0].size, 6.0);

        // The side walk would write 1 + 1 = 2 into the root.
        thickening_phase(&mut branches, &[4], &p);
        assert_eq!(branches[0].size, 6.0);
    }

    #[test]
    fn thickening_tips_sharing_an_ancestor_in_one_call() {
        // root(0) <- 1 <- 2 <- 3, and tip 4 off branch 1.
        let p = GrowthParams {
            initial_size: 1.0,
            grow_increment: 1.0,
            ..GrowthParams::default()
        };
        let build = || {
            let mut b = BranchSet::trunk(Vector2::ZERO, 1.0, 2.0, 1.0);
            b.insert_unique(Branch::new_child(Vector2::new(0.0, -3.0), UP, 1.0, 2));
            b.insert_unique(Branch::new_child(Vector2::new(1.0, -1.0), UP, 1.0, 1));
            b
        };

        for tips in [[3, 4], [4, 3]] {
            let mut branches = build();
            assert_eq!(branches.len(), 5);
            thickening_phase(&mut branches, &tips, &p);

            // Both walks reach the root; the deeper one sets it and the
            // shorter one neither adds to nor lowers it.
            let sizes: Vec<f64> = branches.iter().map(|(_, b)| b.size).collect();
            assert_eq!(sizes, vec![3.0, 2.0, 1.0, 1.0, 1.0], "tips {tips:?}");
        }
    }
}
