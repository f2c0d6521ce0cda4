//! The 3D cursor treated as a point-like surface.

use mcad_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricSurface;

/// A single point in space. Its tangents vanish, so minimizing the distance to
/// it only moves the parameters of the other surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub position: Point3,
}

impl Cursor {
    pub fn new(position: Point3) -> Self {
        Self { position }
    }
}

impl ParametricSurface for Cursor {
    fn point_at(&self, _u: f64, _v: f64) -> Point3 {
        self.position
    }

    fn tangent_u(&self, _u: f64, _v: f64) -> Vector3 {
        DVec3::ZERO
    }

    fn tangent_v(&self, _u: f64, _v: f64) -> Vector3 {
        DVec3::ZERO
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_degenerate(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_is_constant() {
        let c = Cursor::new(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(c.point_at(0.1, 0.9), c.point_at(0.7, 0.2));
        assert_eq!(c.tangent_u(0.5, 0.5), DVec3::ZERO);
        assert!(c.is_degenerate());
    }
}
