//! Uniform cubic B-spline curves and their Bezier form.

use mcad_core::{McadError, Result, Validate};
use mcad_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::Curve;
use crate::spline::{deboor, uniform_knots};

const DEGREE: usize = 3;

/// A cubic B-spline on uniform integer knots, defined by its de Boor points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BSplineCurve {
    pub de_boor: Vec<Point3>,
    pub knots: Vec<f64>,
}

impl BSplineCurve {
    pub fn new(de_boor: Vec<Point3>) -> Self {
        let knots = uniform_knots(de_boor.len() + DEGREE + 1);
        Self { de_boor, knots }
    }

    /// Bezier control points of every cubic span, as one flat list in which
    /// consecutive spans share their end point.
    ///
    /// With `snap_ends` the first and last de Boor points are tripled so the
    /// curve starts and ends exactly on them. Fewer than four (effective) de
    /// Boor points yield an empty list.
    pub fn to_bezier_points(&self, snap_ends: bool) -> Vec<Point3> {
        let mut d = self.de_boor.clone();
        if snap_ends {
            if let (Some(&first), Some(&last)) = (d.first(), d.last()) {
                d.splice(0..0, [first, first]);
                d.extend([last, last]);
            }
        }
        if d.len() <= DEGREE {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(3 * (d.len() - DEGREE) + 1);
        for w in d.windows(4) {
            let b0 = (w[0] + 4.0 * w[1] + w[2]) / 6.0;
            let b1 = (2.0 * w[1] + w[2]) / 3.0;
            let b2 = (w[1] + 2.0 * w[2]) / 3.0;
            let b3 = (w[1] + 4.0 * w[2] + w[3]) / 6.0;
            if out.is_empty() {
                out.push(b0);
            }
            out.extend([b1, b2, b3]);
        }
        out
    }
}

impl Validate for BSplineCurve {
    fn validate(&self) -> Result<()> {
        if self.de_boor.len() <= DEGREE {
            return Err(McadError::Geometry(format!(
                "cubic B-spline needs at least 4 de Boor points, got {}",
                self.de_boor.len()
            )));
        }
        if self.knots.len() != self.de_boor.len() + DEGREE + 1 {
            return Err(McadError::Geometry("knot vector length mismatch".into()));
        }
        Ok(())
    }
}

impl Curve for BSplineCurve {
    fn point_at(&self, t: f64) -> Point3 {
        deboor::curve_point(DEGREE, &self.knots, &self.de_boor, t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        deboor::curve_tangent(DEGREE, &self.knots, &self.de_boor, t)
    }

    fn domain(&self) -> (f64, f64) {
        (self.knots[DEGREE], self.knots[self.knots.len() - DEGREE - 1])
    }
}
