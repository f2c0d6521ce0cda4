use crate::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in a surface's `(u, v)` parameter plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRect {
    pub min: Point2,
    pub max: Point2,
}

impl ParamRect {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// The `[0, 1] x [0, 1]` square.
    pub fn unit() -> Self {
        Self::new(Point2::ZERO, Point2::ONE)
    }

    pub fn from_ranges(u: (f64, f64), v: (f64, f64)) -> Self {
        Self::new(Point2::new(u.0, v.0), Point2::new(u.1, v.1))
    }

    pub fn u_range(&self) -> (f64, f64) {
        (self.min.x, self.max.x)
    }

    pub fn v_range(&self) -> (f64, f64) {
        (self.min.y, self.max.y)
    }

    pub fn size(&self) -> Vector2 {
        self.max - self.min
    }

    /// Inclusive containment: points on the boundary are inside.
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Map a point of this rectangle onto the unit square.
    pub fn normalize(&self, p: Point2) -> Point2 {
        (p - self.min) / self.size()
    }

    /// Inverse of [`ParamRect::normalize`].
    pub fn denormalize(&self, p: Point2) -> Point2 {
        self.min + p * self.size()
    }

    /// Smallest rectangle containing both this one and `p`.
    pub fn include(&self, p: Point2) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn clamp(&self, p: Point2) -> Point2 {
        p.clamp(self.min, self.max)
    }
}

impl Default for ParamRect {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn test_contains_point_inclusive() {
        let rect = ParamRect::unit();
        assert!(rect.contains_point(dvec2(0.5, 0.5)));
        assert!(rect.contains_point(dvec2(1.0, 0.0)));
        assert!(!rect.contains_point(dvec2(1.5, 0.5)));
    }

    #[test]
    fn test_normalize_roundtrip() {
        let rect = ParamRect::from_ranges((0.0, 4.0), (-1.0, 1.0));
        let p = dvec2(3.0, 0.5);
        let n = rect.normalize(p);
        assert!((n - dvec2(0.75, 0.75)).length() < 1e-12);
        assert!((rect.denormalize(n) - p).length() < 1e-12);
    }

    #[test]
    fn test_include_grows() {
        let rect = ParamRect::unit().include(dvec2(1.3, -0.2));
        assert_eq!(rect.min, dvec2(0.0, -0.2));
        assert_eq!(rect.max, dvec2(1.3, 1.0));
    }
}
