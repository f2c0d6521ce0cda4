//! Natural cubic interpolation through a list of points.

use mcad_core::Result;
use mcad_math::{solve_tridiagonal, Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Consecutive knots closer than this are treated as duplicates.
const DUPLICATE_KNOT: f64 = 1e-9;

/// A C2 curve passing through every knot, chord-length parametrized, with zero
/// second derivative at both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpolatedCurve {
    pub knots: Vec<Point3>,
}

impl InterpolatedCurve {
    pub fn new(knots: Vec<Point3>) -> Self {
        Self { knots }
    }

    /// Knots with consecutive duplicates removed.
    fn distinct_knots(&self) -> Vec<Point3> {
        let mut out: Vec<Point3> = Vec::with_capacity(self.knots.len());
        for &p in &self.knots {
            match out.last() {
                Some(&q) if (p - q).length() < DUPLICATE_KNOT => {
                    debug!(?p, "skipping duplicate interpolation knot");
                }
                _ => out.push(p),
            }
        }
        out
    }

    /// Cubic Bezier control points of every segment between consecutive
    /// distinct knots: the first knot, then three points per segment ending on
    /// the next knot.
    ///
    /// A single distinct knot yields just that point; no knots yield an empty
    /// list.
    pub fn to_bezier_points(&self) -> Result<Vec<Point3>> {
        let x = self.distinct_knots();
        if x.len() < 2 {
            return Ok(x);
        }

        let segments = x.len() - 1;
        let h: Vec<f64> = x.windows(2).map(|w| (w[1] - w[0]).length()).collect();
        let slope: Vec<Vector3> = (0..segments).map(|i| (x[i + 1] - x[i]) / h[i]).collect();

        // Second derivatives at the interior knots; natural ends are zero.
        let interior = segments - 1;
        let mut sub = Vec::with_capacity(interior);
        let mut diag = Vec::with_capacity(interior);
        let mut sup = Vec::with_capacity(interior);
        let mut rhs = Vec::with_capacity(interior);
        for i in 1..segments {
            sub.push(h[i - 1]);
            diag.push(2.0 * (h[i - 1] + h[i]));
            sup.push(h[i]);
            rhs.push(6.0 * (slope[i] - slope[i - 1]));
        }
        let solved = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

        let mut m = Vec::with_capacity(x.len());
        m.push(Vector3::ZERO);
        m.extend(solved);
        m.push(Vector3::ZERO);

        let mut out = Vec::with_capacity(3 * segments + 1);
        out.push(x[0]);
        for i in 0..segments {
            let hi = h[i];
            let a = x[i];
            let b = slope[i] - hi * (2.0 * m[i] + m[i + 1]) / 6.0;
            let c = m[i] / 2.0;
            let d = (m[i + 1] - m[i]) / (6.0 * hi);

            // Power basis over t = s / h.
            let bb = b * hi;
            let cc = c * hi * hi;
            let dd = d * hi * hi * hi;
            out.push(a + bb / 3.0);
            out.push(a + 2.0 * bb / 3.0 + cc / 3.0);
            out.push(a + bb + cc + dd);
        }
        Ok(out)
    }
}
