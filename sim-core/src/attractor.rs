use crate::{crown::Crown, types::BranchId, vector::Vector2};
use rand::Rng;

/// A location that pulls nearby branch growth toward itself.
#[derive(Clone, Debug, PartialEq)]
pub struct AttractionPoint {
    pub pos: Vector2,
    /// Nearest in-range branch found during the current iteration.
    pub closest_branch: Option<BranchId>,
}

impl AttractionPoint {
    pub fn new(pos: Vector2) -> Self {
        Self {
            pos,
            closest_branch: None,
        }
    }
}

/// The attraction points still in play, in scatter order.
///
/// Consumed points are removed outright; the order of the survivors is
/// preserved because association ties depend on it.
#[derive(Clone, Debug, Default)]
pub struct AttractorSet {
    pub points: Vec<AttractionPoint>,
}

impl AttractorSet {
    pub fn from_positions(positions: Vec<Vector2>) -> Self {
        let points = positions.into_iter().map(AttractionPoint::new).collect();

        Self { points }
    }

    /// Scatters `count` points uniformly over the closed crown rectangle.
    ///
    /// Coordinates are drawn independently, x first, so duplicates are
    /// possible and legal.
    pub fn random_in_crown(crown: &Crown, count: usize, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                let x = rng.random_range(crown.left..=crown.right());
                let y = rng.random_range(crown.top..=crown.bottom());
                Vector2::new(x, y)
            })
            .collect();

        Self::from_positions(positions)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
