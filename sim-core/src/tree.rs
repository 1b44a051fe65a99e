//! The growth engine.
//!
//! A [`Tree`] owns its branches, the remaining attraction points and the
//! parameters it was generated with. It is built once (crown scattered,
//! trunk grown) and then advanced one iteration at a time with
//! [`Tree::step`] until it reports done.

use crate::{
    attractor::{AttractionPoint, AttractorSet},
    branch::BranchSet,
    config::{GrowthParams, TreeConfig},
    crown::Crown,
    error::ConfigError,
    influence_buffer::InfluenceBuffer,
    phases,
    types::BranchId,
    vector::Vector2,
};
use log::{debug, trace};
use rand::Rng;
use std::fmt;

/// Why a tree stopped growing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoneReason {
    /// Every attraction point has been consumed.
    NoPointsLeft,
    /// No branch was pulled by any point.
    NoCandidates,
    /// Every proposed branch landed on an existing one.
    AllCandidatesCollided,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthState {
    Growing,
    Done(DoneReason),
}

/// What a call to [`Tree::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tree was already done; nothing changed.
    AlreadyDone,
    /// The tree grew and keeps growing.
    Grew {
        consumed: usize,
        inserted: usize,
        collided: usize,
    },
    /// This step moved the tree to [`GrowthState::Done`].
    Finished(DoneReason),
}

/// Read-only view of a tree for drawing and reporting.
#[derive(Clone, Copy, Debug)]
pub struct TreeSnapshot<'a> {
    pub root: BranchId,
    pub branches: &'a BranchSet,
    pub points: &'a [AttractionPoint],
    pub done: bool,
    pub crown: Crown,
    pub params: GrowthParams,
}

/// Counts and parameters in the form shown to users.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeStatus {
    pub branch_count: usize,
    pub point_count: usize,
    pub crown_width: f64,
    pub crown_height: f64,
    pub trunk_height: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub branch_length: f64,
}

impl fmt::Display for TreeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Branches: {}", self.branch_count)?;
        writeln!(f, "Total Leaves: {}", self.point_count)?;
        writeln!(f, "Crown Width: {}", self.crown_width.round())?;
        writeln!(f, "Crown Height: {}", self.crown_height.round())?;
        writeln!(f, "Trunk Height: {}", self.trunk_height.round())?;
        writeln!(f, "Min. Point Distance: {}", self.min_distance)?;
        writeln!(f, "Max. Point Distance: {}", self.max_distance)?;
        writeln!(f, "Branch Length: {}", self.branch_length)
    }
}

#[derive(Debug)]
pub struct Tree {
    origin: Vector2,
    params: GrowthParams,
    crown: Crown,
    root: BranchId,
    branches: BranchSet,
    attractors: AttractorSet,
    acc: InfluenceBuffer,
    state: GrowthState,
    last_inserted: Vec<BranchId>,
}

impl Tree {
    /// Samples parameters from `cfg`, scatters the crown and grows the trunk.
    pub fn new(origin: Vector2, cfg: &TreeConfig, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        let params = cfg.sample(rng)?;
        Self::with_params(origin, params, rng)
    }

    /// Builds a tree from fixed parameters, scattering
    /// `params.attraction_point_count` points in the crown.
    pub fn with_params(
        origin: Vector2,
        params: GrowthParams,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let crown = Crown::above(
            origin,
            params.crown_width,
            params.crown_height,
            params.trunk_height,
        );
        let attractors =
            AttractorSet::random_in_crown(&crown, params.attraction_point_count, rng);
        Ok(Self::assemble(origin, params, crown, attractors))
    }

    /// Builds a tree around explicitly placed attraction points.
    ///
    /// The crown rectangle is still derived from `params`, but points need
    /// not lie inside it. `params.attraction_point_count` is replaced by the
    /// number of points given.
    pub fn from_parts(
        origin: Vector2,
        mut params: GrowthParams,
        attractors: AttractorSet,
    ) -> Result<Self, ConfigError> {
        if attractors.is_empty() {
            return Err(ConfigError::ZeroPointCount);
        }
        params.validate_geometry()?;
        params.attraction_point_count = attractors.len();
        let crown = Crown::above(
            origin,
            params.crown_width,
            params.crown_height,
            params.trunk_height,
        );
        Ok(Self::assemble(origin, params, crown, attractors))
    }

    fn assemble(
        origin: Vector2,
        params: GrowthParams,
        crown: Crown,
        attractors: AttractorSet,
    ) -> Self {
        let branches = BranchSet::trunk(
            origin,
            params.branch_length,
            params.trunk_height,
            params.initial_size,
        );
        debug!(
            "new tree at {origin}: {} points, crown {:.1}x{:.1}, trunk {} branches, \
             distances {:.2}..{:.2}, branch length {:.2}",
            attractors.len(),
            crown.width,
            crown.height,
            branches.len(),
            params.min_distance,
            params.max_distance,
            params.branch_length,
        );

        Self {
            origin,
            params,
            crown,
            root: 0,
            acc: InfluenceBuffer::with_len(branches.len()),
            branches,
            attractors,
            state: GrowthState::Growing,
            last_inserted: Vec::new(),
        }
    }

    /// Runs one growth iteration.
    ///
    /// Once the tree is done this is a no-op returning
    /// [`StepOutcome::AlreadyDone`].
    pub fn step(&mut self) -> StepOutcome {
        if self.is_done() {
            return StepOutcome::AlreadyDone;
        }
        if self.attractors.is_empty() {
            return self.finish(DoneReason::NoPointsLeft);
        }

        let consumed = phases::association_phase(
            &self.branches,
            &mut self.attractors,
            &self.params,
            &mut self.acc,
        );

        let candidates = phases::spawn_phase(&self.branches, &mut self.acc, &self.params);
        if candidates.is_empty() {
            return self.finish(DoneReason::NoCandidates);
        }

        let inserted = phases::insertion_phase(&mut self.branches, &candidates, &self.params);
        if inserted.is_empty() {
            return self.finish(DoneReason::AllCandidatesCollided);
        }
        phases::thickening_phase(&mut self.branches, &inserted, &self.params);

        let collided = candidates.len() - inserted.len();
        trace!(
            "step: consumed {consumed}, inserted {}, collided {collided}, {} branches, {} points left",
            inserted.len(),
            self.branches.len(),
            self.attractors.len(),
        );

        let outcome = StepOutcome::Grew {
            consumed,
            inserted: inserted.len(),
            collided,
        };
        self.last_inserted = inserted;
        outcome
    }

    fn finish(&mut self, reason: DoneReason) -> StepOutcome {
        debug!(
            "tree done ({reason:?}): {} branches, {} points left",
            self.branches.len(),
            self.attractors.len()
        );
        self.state = GrowthState::Done(reason);
        self.last_inserted.clear();
        StepOutcome::Finished(reason)
    }

    /// Steps until done or until `max_steps` steps have run.
    ///
    /// ### Returns
    /// The number of steps that changed the tree or finished it.
    pub fn grow_to_completion(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && !self.is_done() {
            self.step();
            steps += 1;
        }
        steps
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self.state, GrowthState::Done(_))
    }

    #[inline]
    pub fn state(&self) -> GrowthState {
        self.state
    }

    pub fn origin(&self) -> Vector2 {
        self.origin
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    pub fn crown(&self) -> &Crown {
        &self.crown
    }

    pub fn root(&self) -> BranchId {
        self.root
    }

    pub fn branches(&self) -> &BranchSet {
        &self.branches
    }

    pub fn attractors(&self) -> &AttractorSet {
        &self.attractors
    }

    /// Branches inserted by the most recent growing step.
    pub fn last_inserted(&self) -> &[BranchId] {
        &self.last_inserted
    }

    pub fn snapshot(&self) -> TreeSnapshot<'_> {
        TreeSnapshot {
            root: self.root,
            branches: &self.branches,
            points: &self.attractors.points,
            done: self.is_done(),
            crown: self.crown,
            params: self.params,
        }
    }

    pub fn status(&self) -> TreeStatus {
        TreeStatus {
            branch_count: self.branches.len(),
            point_count: self.attractors.len(),
            crown_width: self.params.crown_width,
            crown_height: self.params.crown_height,
            trunk_height: self.params.trunk_height,
            min_distance: self.params.min_distance,
            max_distance: self.params.max_distance,
            branch_length: self.params.branch_length,
        }
    }
}
