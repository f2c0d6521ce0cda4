//! The 20-point Gregory patch net.

use mcad_geometry::bezier::{bernstein3, bernstein3_derivative};
use mcad_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A bicubic Gregory patch.
///
/// `boundary[i][j]` holds the 12 boundary control points of a 4 x 4 net
/// (interior entries are ignored). Each interior position carries two points:
/// `along_u[k]` is tied to the nearer row (`j = 0` or `j = 3`) and `along_v[k]`
/// to the nearer column (`i = 0` or `i = 3`), for the interior positions in
/// the order `(1,1), (2,1), (1,2), (2,2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GregoryPoints {
    pub boundary: [[Point3; 4]; 4],
    pub along_u: [Point3; 4],
    pub along_v: [Point3; 4],
}

const INTERIOR: [(usize, usize); 4] = [(1, 1), (2, 1), (1, 2), (2, 2)];

impl GregoryPoints {
    /// The 20 control points: 12 boundary points row by row, then the eight
    /// interior points as `along_u`, `along_v` pairs.
    pub fn control_points(&self) -> Vec<Point3> {
        let mut out = Vec::with_capacity(20);
        for j in 0..4 {
            for i in 0..4 {
                if !INTERIOR.contains(&(i, j)) {
                    out.push(self.boundary[i][j]);
                }
            }
        }
        for k in 0..4 {
            out.push(self.along_u[k]);
            out.push(self.along_v[k]);
        }
        out
    }

    /// The Bezier net at `(u, v)`, each interior point blended from its pair
    /// by the distance to the row and column it is tied to.
    fn net_at(&self, u: f64, v: f64) -> [[Point3; 4]; 4] {
        let mut net = self.boundary;
        for (k, &(i, j)) in INTERIOR.iter().enumerate() {
            let to_column = if i == 1 { u } else { 1.0 - u };
            let to_row = if j == 1 { v } else { 1.0 - v };
            net[i][j] = blend(self.along_u[k], to_column, self.along_v[k], to_row);
        }
        net
    }

    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        let net = self.net_at(u, v);
        let (bu, bv) = (bernstein3(u), bernstein3(v));
        let mut acc = DVec3::ZERO;
        for (i, column) in net.iter().enumerate() {
            for (j, &p) in column.iter().enumerate() {
                acc += bu[i] * bv[j] * p;
            }
        }
        acc
    }

    /// Partial derivatives along `u` and `v`.
    ///
    /// Differentiates the Bernstein basis and the blended interior points
    /// together, so the result stays exact next to the edges where the blend
    /// changes fastest.
    pub fn tangents_at(&self, u: f64, v: f64) -> (Vector3, Vector3) {
        let mut net = self.boundary;
        let mut net_du = [[DVec3::ZERO; 4]; 4];
        let mut net_dv = [[DVec3::ZERO; 4]; 4];
        for (k, &(i, j)) in INTERIOR.iter().enumerate() {
            let (to_column, sign_u) = if i == 1 { (u, 1.0) } else { (1.0 - u, -1.0) };
            let (to_row, sign_v) = if j == 1 { (v, 1.0) } else { (1.0 - v, -1.0) };
            let (a, b) = (self.along_u[k], self.along_v[k]);
            let p = blend(a, to_column, b, to_row);
            net[i][j] = p;
            let total = to_column + to_row;
            if total.abs() >= 1e-12 {
                net_du[i][j] = (a - p) * (sign_u / total);
                net_dv[i][j] = (b - p) * (sign_v / total);
            }
        }

        let (bu, bv) = (bernstein3(u), bernstein3(v));
        let (du, dv) = (bernstein3_derivative(u), bernstein3_derivative(v));
        let (mut tu, mut tv) = (DVec3::ZERO, DVec3::ZERO);
        for i in 0..4 {
            for j in 0..4 {
                tu += du[i] * bv[j] * net[i][j] + bu[i] * bv[j] * net_du[i][j];
                tv += bu[i] * dv[j] * net[i][j] + bu[i] * bv[j] * net_dv[i][j];
            }
        }
        (tu, tv)
    }

    /// Unit normal, `tangent_u x tangent_v`.
    pub fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        let (tu, tv) = self.tangents_at(u, v);
        tu.cross(tv).normalize_or_zero()
    }
}

/// `(wa * a + wb * b) / (wa + wb)`, where `wa` is the distance from the column
/// `b` belongs to and `wb` the distance from the row `a` belongs to. At a
/// corner where both vanish the points are averaged.
fn blend(a: Point3, wa: f64, b: Point3, wb: f64) -> Point3 {
    let total = wa + wb;
    if total.abs() < 1e-12 {
        (a + b) * 0.5
    } else {
        (a * wa + b * wb) / total
    }
}
