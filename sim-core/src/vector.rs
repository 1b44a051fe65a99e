//! 2-D vector helpers for the growth engine.
//!
//! The vector type itself is [`glam::DVec2`]; arithmetic, length and
//! component-wise products come from glam. This module adds the
//! normalization policy used throughout growth and the exact position key
//! used to deduplicate branches.

use crate::types::PositionKey;
use glam::DVec2;

/// Immutable 2-D vector in tree space (y grows downward, the trunk grows
/// along `(0, -1)`).
pub type Vector2 = DVec2;

/// Lengths at or below this value normalize to [`Vector2::ZERO`].
pub const NORMALIZE_EPSILON: f64 = 1e-5;

/// Upward growth direction of the trunk.
pub const UP: Vector2 = DVec2::new(0.0, -1.0);

pub trait Vector2Ext {
    /// Unit vector in the same direction, or zero when the length is not
    /// above [`NORMALIZE_EPSILON`].
    fn normalized(self) -> Self;

    /// Key under which a branch at this position is stored.
    fn position_key(self) -> PositionKey;
}

impl Vector2Ext for DVec2 {
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len > NORMALIZE_EPSILON {
            self / len
        } else {
            DVec2::ZERO
        }
    }

    #[inline]
    fn position_key(self) -> PositionKey {
        // -0.0 == 0.0 as values, so fold the sign before taking bits.
        let fold = |v: f64| if v == 0.0 { 0.0f64 } else { v };
        PositionKey([fold(self.x).to_bits(), fold(self.y).to_bits()])
    }
}
