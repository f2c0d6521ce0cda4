//! Finite cylinder.

use std::f64::consts::TAU;

use mcad_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricSurface;

/// A finite cylindrical surface parameterized by angle `u` in `[0, 1]` (periodic)
/// and height fraction `v` in `[0, 1]`.
///
/// Points are computed as:
/// `P(u, v) = origin + radius * (cos(2 PI u) * ref_dir + sin(2 PI u) * cross_dir) + v * height * axis`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cylinder {
    pub origin: Point3,
    pub axis: Vector3,
    pub radius: f64,
    pub height: f64,
}

impl Cylinder {
    pub fn new(origin: Point3, axis: Vector3, radius: f64, height: f64) -> Self {
        Self {
            origin,
            axis: axis.normalize(),
            radius,
            height,
        }
    }

    fn local_frame(&self) -> (DVec3, DVec3) {
        let n = self.axis;
        let ref_vec = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let u = n.cross(ref_vec).normalize();
        let v = n.cross(u).normalize();
        (u, v)
    }
}

impl ParametricSurface for Cylinder {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (ref_dir, cross_dir) = self.local_frame();
        let (s, c) = (TAU * u).sin_cos();
        self.origin + self.radius * (c * ref_dir + s * cross_dir) + v * self.height * self.axis
    }

    fn tangent_u(&self, u: f64, _v: f64) -> Vector3 {
        let (ref_dir, cross_dir) = self.local_frame();
        let (s, c) = (TAU * u).sin_cos();
        TAU * self.radius * (-s * ref_dir + c * cross_dir)
    }

    fn tangent_v(&self, _u: f64, _v: f64) -> Vector3 {
        self.height * self.axis
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn wraps_u(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_point_on_cylinder() {
        let cyl = Cylinder::new(DVec3::ZERO, DVec3::Z, 2.0, 1.0);

        for i in 0..8 {
            let u = i as f64 / 8.0;
            let p = cyl.point_at(u, 0.0);
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!(
                (r - 2.0).abs() < 1e-10,
                "Point not on cylinder at u={}: r={}",
                u,
                r
            );
            assert!(p.z.abs() < 1e-10);
        }
    }

    #[test]
    fn test_cylinder_height() {
        let cyl = Cylinder::new(DVec3::ZERO, DVec3::Z, 1.0, 4.0);
        let p = cyl.point_at(0.0, 1.0);
        assert!((p.z - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_cylinder_normal_outward() {
        let cyl = Cylinder::new(DVec3::ZERO, DVec3::Z, 1.0, 1.0);

        for i in 0..8 {
            let u = i as f64 / 8.0;
            let n = cyl.normal_at(u, 0.5);
            let p = cyl.point_at(u, 0.5);
            let radial = DVec3::new(p.x, p.y, 0.0).normalize();
            assert!(
                (n.cross(radial)).length() < 1e-10,
                "Normal not radial at u={}",
                u
            );
        }
    }

    #[test]
    fn test_cylinder_wraps_only_around() {
        let cyl = Cylinder::new(DVec3::ZERO, DVec3::Z, 1.0, 1.0);
        assert!(cyl.wraps_u());
        assert!(!cyl.wraps_v());
    }
}
