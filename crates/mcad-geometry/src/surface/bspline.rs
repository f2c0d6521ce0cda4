//! Uniform bicubic B-spline surfaces.

use mcad_core::{McadError, Result, Validate};
use mcad_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{fold_parameter, ParametricSurface};
use crate::spline::{deboor, uniform_knots};

const DEGREE: usize = 3;

/// A bicubic B-spline surface on uniform integer knots, reparametrized onto
/// `[0, 1] x [0, 1]`.
///
/// `control_points[i][j]` is the de Boor point at column `i` (u-direction) and
/// row `j` (v-direction). A surface that wraps in u stores its first three
/// columns a second time at the end, so the seam is C2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineSurface {
    pub wrap_u: bool,
    pub knots_u: Vec<f64>,
    pub knots_v: Vec<f64>,
    pub control_points: Vec<Vec<Point3>>,
}

impl BSplineSurface {
    /// Build a surface from a de Boor grid. When `wrap_u` is set the grid is
    /// closed by repeating its first three columns.
    pub fn new(mut control_points: Vec<Vec<Point3>>, wrap_u: bool) -> Self {
        if wrap_u {
            let head: Vec<_> = control_points.iter().take(DEGREE).cloned().collect();
            control_points.extend(head);
        }
        let n_u = control_points.len();
        let n_v = control_points.first().map_or(0, Vec::len);
        let surface = Self {
            wrap_u,
            knots_u: uniform_knots(n_u + DEGREE + 1),
            knots_v: uniform_knots(n_v + DEGREE + 1),
            control_points,
        };
        debug_assert!(
            surface.validate().is_ok(),
            "bicubic B-spline needs at least 4 x 4 control points, got {} x {}",
            n_u,
            n_v
        );
        surface
    }

    /// Map a global parameter in `[0, 1]` onto the valid knot range `[3, n]`.
    /// Values outside extrapolate the end spans.
    fn knot_parameter(t: f64, count: usize) -> f64 {
        DEGREE as f64 + t * (count - DEGREE) as f64
    }

    fn knot_u(&self, u: f64) -> f64 {
        let u = if self.wrap_u {
            fold_parameter(u, (0.0, 1.0), true)
        } else {
            u
        };
        Self::knot_parameter(u, self.control_points.len())
    }

    fn spans(&self) -> (f64, f64) {
        (
            (self.control_points.len() - DEGREE) as f64,
            (self.control_points[0].len() - DEGREE) as f64,
        )
    }

    fn derivs(&self, u: f64, v: f64) -> (Vector3, Vector3) {
        let (su, sv) = self.spans();
        let (du, dv) = deboor::surface_derivs(
            DEGREE,
            DEGREE,
            &self.knots_u,
            &self.knots_v,
            &self.control_points,
            self.knot_u(u),
            Self::knot_parameter(v, self.control_points[0].len()),
        );
        (du * su, dv * sv)
    }
}

impl Validate for BSplineSurface {
    fn validate(&self) -> Result<()> {
        let n_u = self.control_points.len();
        let n_v = self.control_points.first().map_or(0, Vec::len);
        if n_u <= DEGREE || n_v <= DEGREE {
            return Err(McadError::Geometry(format!(
                "bicubic B-spline needs at least 4 x 4 control points, got {} x {}",
                n_u, n_v
            )));
        }
        if self.control_points.iter().any(|c| c.len() != n_v) {
            return Err(McadError::Geometry("ragged control grid".into()));
        }
        if self.knots_u.len() != n_u + DEGREE + 1 || self.knots_v.len() != n_v + DEGREE + 1 {
            return Err(McadError::Geometry("knot vector length mismatch".into()));
        }
        Ok(())
    }
}

impl ParametricSurface for BSplineSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        deboor::surface_point(
            DEGREE,
            DEGREE,
            &self.knots_u,
            &self.knots_v,
            &self.control_points,
            self.knot_u(u),
            Self::knot_parameter(v, self.control_points[0].len()),
        )
    }

    fn tangent_u(&self, u: f64, v: f64) -> Vector3 {
        self.derivs(u, v).0
    }

    fn tangent_v(&self, u: f64, v: f64) -> Vector3 {
        self.derivs(u, v).1
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
