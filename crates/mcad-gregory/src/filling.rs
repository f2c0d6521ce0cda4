//! Boundary curves and cross-boundary tangent fields of one hole filling.

use mcad_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::points::GregoryPoints;

/// Cubic curve from the midpoint of a patch edge to the centre of the hole.
///
/// `bottom` is the edge midpoint, `second` continues the patch across the edge,
/// `fourth` is the centre shared by all three curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCurve {
    pub bottom: Point3,
    pub second: Point3,
    pub third: Point3,
    pub fourth: Point3,
}

impl BoundaryCurve {
    /// Control points from the centre out to the patch edge.
    pub fn from_center(&self) -> [Point3; 4] {
        [self.fourth, self.third, self.second, self.bottom]
    }

    /// Tangent at the centre, for the curve run from the centre outwards.
    pub fn center_tangent(&self) -> Vector3 {
        (self.third - self.fourth) * 3.0
    }

    /// Quadratic Bezier coefficients of the derivative, centre outwards.
    pub fn derivative(&self) -> [Vector3; 3] {
        let p = self.from_center();
        [
            (p[1] - p[0]) * 3.0,
            (p[2] - p[1]) * 3.0,
            (p[3] - p[2]) * 3.0,
        ]
    }
}

/// Everything computed for one of the three pie-slice fills.
///
/// Index 0 of each pair belongs to the curve running along `v = 0` of the
/// Gregory patch, index 1 to the curve along `u = 0`. Fields are parametrized
/// from the hole centre outwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillingData {
    pub boundary: [BoundaryCurve; 2],
    /// Halves of the two patch edges, from their midpoints to the shared corner.
    pub edges: [[Point3; 4]; 2],
    /// Linear blend of the cross tangents at the centre and at the edge.
    pub g_field: [[Vector3; 3]; 2],
    /// Derivative of the boundary curve.
    pub c_field: [[Vector3; 3]; 2],
    /// Cross-boundary derivative of this fill, in the span of the G and C fields.
    pub d_field: [[Vector3; 4]; 2],
    pub gregory: GregoryPoints,
}

/// Quadratic Bezier coefficients of the linear blend from `g0` to `g2`.
pub fn g_field(g0: Vector3, g2: Vector3) -> [Vector3; 3] {
    [g0, (g0 + g2) * 0.5, g2]
}

/// Cubic Bezier coefficients of `g(t) - (1 - t) / 2 * c(t)`.
///
/// With `g(0)` set to half the difference of the two neighbouring centre
/// tangents and `g(1)` the patch edge tangent, this interpolates the tangent
/// of the neighbouring boundary curve at the centre and the edge tangent at
/// the patch. The fill on the other side of the curve uses `-g`, so both
/// cross derivatives stay in the plane spanned by `g` and `c`.
pub fn d_field(g: &[Vector3; 3], c: &[Vector3; 3]) -> [Vector3; 4] {
    // Degree-elevate g and multiply c by (1 - t).
    let g3 = [
        g[0],
        (g[0] + g[1] * 2.0) / 3.0,
        (g[1] * 2.0 + g[2]) / 3.0,
        g[2],
    ];
    let c3 = [c[0], c[1] * (2.0 / 3.0), c[2] * (1.0 / 3.0), Vector3::ZERO];
    [
        g3[0] - c3[0] * 0.5,
        g3[1] - c3[1] * 0.5,
        g3[2] - c3[2] * 0.5,
        g3[3] - c3[3] * 0.5,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcad_geometry::bezier::{cubic_point, quadratic};
    use mcad_math::DVec3;

    #[test]
    fn test_d_field_matches_its_definition() {
        let g = g_field(DVec3::new(1.0, 0.0, 0.5), DVec3::new(-0.5, 2.0, 0.0));
        let c = [
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(2.0, -1.0, 0.0),
        ];
        let d = d_field(&g, &c);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let expected = quadratic(&g, t) - quadratic(&c, t) * ((1.0 - t) * 0.5);
            assert!((cubic_point(&d, t) - expected).length() < 1e-12);
        }
    }

    #[test]
    fn test_derivative_of_straight_curve_is_constant() {
        let curve = BoundaryCurve {
            bottom: DVec3::new(3.0, 0.0, 0.0),
            second: DVec3::new(2.0, 0.0, 0.0),
            third: DVec3::new(1.0, 0.0, 0.0),
            fourth: DVec3::ZERO,
        };
        for d in curve.derivative() {
            assert_eq!(d, DVec3::new(3.0, 0.0, 0.0));
        }
        assert_eq!(curve.center_tangent(), DVec3::new(3.0, 0.0, 0.0));
    }
}
