//! Bicubic Bezier patches and C0 patch grids.

use mcad_core::{McadError, Result, Validate};
use mcad_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{fold_parameter, ParametricSurface};
use crate::bezier::{bernstein3, bernstein3_derivative};

/// A single bicubic Bezier patch over `[0, 1] x [0, 1]`.
///
/// `points[i][j]` is the control point at column `i` (u-direction) and row `j`
/// (v-direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierPatch {
    pub points: [[Point3; 4]; 4],
}

impl BezierPatch {
    pub fn new(points: [[Point3; 4]; 4]) -> Self {
        Self { points }
    }

    /// The four corner control points in the order `(0,0), (3,0), (0,3), (3,3)`.
    pub fn corners(&self) -> [Point3; 4] {
        [
            self.points[0][0],
            self.points[3][0],
            self.points[0][3],
            self.points[3][3],
        ]
    }

    /// Whether `p` is bit-for-bit one of the 16 control points.
    pub fn has_control_point(&self, p: Point3) -> bool {
        self.points.iter().flatten().any(|&q| q == p)
    }

    fn combine(&self, bu: [f64; 4], bv: [f64; 4]) -> DVec3 {
        let mut acc = DVec3::ZERO;
        for (i, column) in self.points.iter().enumerate() {
            for (j, &cp) in column.iter().enumerate() {
                acc += bu[i] * bv[j] * cp;
            }
        }
        acc
    }
}

impl ParametricSurface for BezierPatch {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.combine(bernstein3(u), bernstein3(v))
    }

    fn tangent_u(&self, u: f64, v: f64) -> Vector3 {
        self.combine(bernstein3_derivative(u), bernstein3(v))
    }

    fn tangent_v(&self, u: f64, v: f64) -> Vector3 {
        self.combine(bernstein3(u), bernstein3_derivative(v))
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

/// A grid of `patches_u x patches_v` bicubic patches sharing boundary control
/// points (C0), mapped onto `[0, 1] x [0, 1]`.
///
/// `control_points[i][j]` has `3 * patches_u + 1` columns, or `3 * patches_u`
/// when the surface wraps around in u (the last patch reuses column 0), and
/// `3 * patches_v + 1` rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BezierSurface {
    pub patches_u: usize,
    pub patches_v: usize,
    pub wrap_u: bool,
    pub control_points: Vec<Vec<Point3>>,
}

impl BezierSurface {
    pub fn new(
        patches_u: usize,
        patches_v: usize,
        wrap_u: bool,
        control_points: Vec<Vec<Point3>>,
    ) -> Self {
        let surface = Self {
            patches_u,
            patches_v,
            wrap_u,
            control_points,
        };
        debug_assert!(
            surface.validate().is_ok(),
            "control grid does not match {} x {} patches",
            patches_u,
            patches_v
        );
        surface
    }

    /// Flat rectangle `origin + s * size_u + t * size_v` split into the given
    /// number of patches, with control points evenly spaced so the
    /// parametrization is linear.
    pub fn flat(
        origin: Point3,
        size_u: Vector3,
        size_v: Vector3,
        patches_u: usize,
        patches_v: usize,
    ) -> Self {
        let cols = 3 * patches_u + 1;
        let rows = 3 * patches_v + 1;
        let control_points = (0..cols)
            .map(|i| {
                let s = i as f64 / (cols - 1) as f64;
                (0..rows)
                    .map(|j| {
                        let t = j as f64 / (rows - 1) as f64;
                        origin + s * size_u + t * size_v
                    })
                    .collect()
            })
            .collect();
        Self::new(patches_u, patches_v, false, control_points)
    }

    fn columns(&self) -> usize {
        if self.wrap_u {
            3 * self.patches_u
        } else {
            3 * self.patches_u + 1
        }
    }

    /// Extract patch `(i, j)` as a standalone bicubic patch.
    pub fn patch(&self, i: usize, j: usize) -> BezierPatch {
        let cols = self.columns();
        let mut points = [[DVec3::ZERO; 4]; 4];
        for (a, column) in points.iter_mut().enumerate() {
            for (b, cp) in column.iter_mut().enumerate() {
                *cp = self.control_points[(3 * i + a) % cols][3 * j + b];
            }
        }
        BezierPatch::new(points)
    }

    /// Split a global parameter into a patch index and a local parameter.
    /// Parameters past either end extrapolate the outermost patch.
    fn locate(t: f64, count: usize) -> (usize, f64) {
        let s = t * count as f64;
        let index = (s.floor().max(0.0) as usize).min(count - 1);
        (index, s - index as f64)
    }

    fn evaluate(&self, u: f64, v: f64, du: bool, dv: bool) -> DVec3 {
        let u = if self.wrap_u {
            fold_parameter(u, (0.0, 1.0), true)
        } else {
            u
        };
        let (pi, lu) = Self::locate(u, self.patches_u);
        let (pj, lv) = Self::locate(v, self.patches_v);
        let bu = if du { bernstein3_derivative(lu) } else { bernstein3(lu) };
        let bv = if dv { bernstein3_derivative(lv) } else { bernstein3(lv) };
        let cols = self.columns();

        let mut acc = DVec3::ZERO;
        for a in 0..4 {
            let column = &self.control_points[(3 * pi + a) % cols];
            for b in 0..4 {
                acc += bu[a] * bv[b] * column[3 * pj + b];
            }
        }
        let mut scale = 1.0;
        if du {
            scale *= self.patches_u as f64;
        }
        if dv {
            scale *= self.patches_v as f64;
        }
        acc * scale
    }
}

impl Validate for BezierSurface {
    fn validate(&self) -> Result<()> {
        if self.patches_u == 0 || self.patches_v == 0 {
            return Err(McadError::Geometry("Bezier surface needs at least one patch".into()));
        }
        if self.control_points.len() != self.columns() {
            return Err(McadError::Geometry(format!(
                "expected {} control columns, got {}",
                self.columns(),
                self.control_points.len()
            )));
        }
        let rows = 3 * self.patches_v + 1;
        if let Some(bad) = self.control_points.iter().position(|c| c.len() != rows) {
            return Err(McadError::Geometry(format!(
                "control column {} has {} rows, expected {}",
                bad,
                self.control_points[bad].len(),
                rows
            )));
        }
        Ok(())
    }
}

impl ParametricSurface for BezierSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.evaluate(u, v, false, false)
    }

    fn tangent_u(&self, u: f64, v: f64) -> Vector3 {
        self.evaluate(u, v, true, false)
    }

    fn tangent_v(&self, u: f64, v: f64) -> Vector3 {
        self.evaluate(u, v, false, true)
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn wraps_u(&self) -> bool {
        self.wrap_u
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_surface_is_linear() {
        let surf = BezierSurface::flat(DVec3::ZERO, DVec3::X * 4.0, DVec3::Y * 2.0, 3, 2);
        let p = surf.point_at(0.3, 0.8);
        assert_relative_eq!(p.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.6, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
        let tu = surf.tangent_u(0.3, 0.8);
        assert!((tu - DVec3::X * 4.0).length() < 1e-12);
        let tv = surf.tangent_v(0.71, 0.2);
        assert!((tv - DVec3::Y * 2.0).length() < 1e-12);
    }

    #[test]
    fn test_patch_extraction_matches_surface() {
        let mut surf = BezierSurface::flat(DVec3::ZERO, DVec3::X, DVec3::Y, 2, 2);
        surf.control_points[4][4].z = 1.0;
        let patch = surf.patch(1, 1);
        for &(u, v) in &[(0.1, 0.2), (0.5, 0.5), (0.9, 0.3)] {
            let on_patch = patch.point_at(u, v);
            let on_surface = surf.point_at(0.5 + 0.5 * u, 0.5 + 0.5 * v);
            assert!((on_patch - on_surface).length() < 1e-12);
        }
    }

    #[test]
    fn test_wrapped_surface_is_periodic() {
        // Coarse tube: 4 patches around, 1 along.
        let cols = 12;
        let control_points = (0..cols)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / cols as f64;
                (0..4)
                    .map(|j| DVec3::new(a.cos(), a.sin(), j as f64 / 3.0))
                    .collect()
            })
            .collect();
        let surf = BezierSurface::new(4, 1, true, control_points);
        surf.validate().unwrap();
        let a = surf.point_at(0.0, 0.4);
        let b = surf.point_at(1.0, 0.4);
        assert!((a - b).length() < 1e-12);
    }

    #[test]
    fn test_patch_tangents_match_finite_differences() {
        let mut surf = BezierSurface::flat(DVec3::ZERO, DVec3::X, DVec3::Y, 1, 1);
        surf.control_points[1][2].z = 0.7;
        surf.control_points[2][1].z = -0.4;
        let patch = surf.patch(0, 0);
        let h = 1e-6;
        let (u, v) = (0.3, 0.6);
        let du = (patch.point_at(u + h, v) - patch.point_at(u - h, v)) / (2.0 * h);
        let dv = (patch.point_at(u, v + h) - patch.point_at(u, v - h)) / (2.0 * h);
        assert!((du - patch.tangent_u(u, v)).length() < 1e-6);
        assert!((dv - patch.tangent_v(u, v)).length() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_bad_grid() {
        let surf = BezierSurface {
            patches_u: 1,
            patches_v: 1,
            wrap_u: false,
            control_points: vec![vec![DVec3::ZERO; 4]; 3],
        };
        assert!(surf.validate().is_err());
    }

    #[test]
    fn test_corners() {
        let surf = BezierSurface::flat(DVec3::ZERO, DVec3::X, DVec3::Y, 1, 1);
        let patch = surf.patch(0, 0);
        let corners = patch.corners();
        assert_eq!(corners[0], DVec3::ZERO);
        assert_eq!(corners[3], DVec3::new(1.0, 1.0, 0.0));
        assert!(patch.has_control_point(corners[1]));
    }
}
