//! Torus.

use std::f64::consts::TAU;

use mcad_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricSurface;

/// A torus parameterized by `u` (around the axis) and `v` (around the tube),
/// both in `[0, 1]` and both periodic.
///
/// `major_radius` is the distance from center to the tube center,
/// `minor_radius` the radius of the tube.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torus {
    pub center: Point3,
    pub axis: Vector3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Torus {
    pub fn new(center: Point3, axis: Vector3, major_radius: f64, minor_radius: f64) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            major_radius,
            minor_radius,
        }
    }

    fn local_frame(&self) -> (DVec3, DVec3) {
        let n = self.axis;
        let ref_vec = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
        let u = n.cross(ref_vec).normalize();
        let v = n.cross(u).normalize();
        (u, v)
    }

    /// Radial direction at angle `2 * PI * u` and its derivative with respect to the angle.
    fn radial(&self, u: f64) -> (DVec3, DVec3) {
        let (x_dir, y_dir) = self.local_frame();
        let (s, c) = (TAU * u).sin_cos();
        (c * x_dir + s * y_dir, -s * x_dir + c * y_dir)
    }
}

impl ParametricSurface for Torus {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (radial, _) = self.radial(u);
        let (s, c) = (TAU * v).sin_cos();
        self.center
            + (self.major_radius + self.minor_radius * c) * radial
            + self.minor_radius * s * self.axis
    }

    fn tangent_u(&self, u: f64, v: f64) -> Vector3 {
        let (_, d_radial) = self.radial(u);
        let c = (TAU * v).cos();
        TAU * (self.major_radius + self.minor_radius * c) * d_radial
    }

    fn tangent_v(&self, u: f64, v: f64) -> Vector3 {
        let (radial, _) = self.radial(u);
        let (s, c) = (TAU * v).sin_cos();
        TAU * self.minor_radius * (-s * radial + c * self.axis)
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

    fn wraps_v(&self) -> bool {
        true
    }
}
