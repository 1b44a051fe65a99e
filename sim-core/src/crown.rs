use crate::vector::Vector2;

/// Axis-aligned rectangle the attraction points are scattered in.
///
/// Tree space has y growing downward, so `top < bottom` and the crown sits
/// at smaller y than the trunk origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crown {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Crown {
    /// Rectangle horizontally centered on `origin` whose bottom edge is
    /// `trunk_height` above it.
    pub fn above(origin: Vector2, width: f64, height: f64, trunk_height: f64) -> Self {
        Self {
            left: origin.x - width / 2.0,
            top: origin.y - height - trunk_height,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// `true` if `p` lies inside the closed rectangle.
    pub fn contains(&self, p: Vector2) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}
