//! The parametric surface contract and the surfaces implementing it.

mod bezier;
mod bspline;
mod cursor;
mod cylinder;
mod kind;
mod torus;

use mcad_math::{DVec3, ParamRect, Point2, Point3, Vector3};

pub use bezier::{BezierPatch, BezierSurface};
pub use bspline::BSplineSurface;
pub use cursor::Cursor;
pub use cylinder::Cylinder;
pub use kind::SurfaceKind;
pub use torus::Torus;

/// A surface that can be evaluated at `(u, v)` together with its two tangents.
///
/// Evaluation is not limited to the domain: wrapping axes repeat with their
/// period and polynomial surfaces extrapolate past their edges. [`fold`]
/// brings a pair back into range, wrapping periodic axes and clamping the
/// others (see [`fold_parameter`]).
///
/// [`fold`]: ParametricSurface::fold
pub trait ParametricSurface: Send + Sync {
    /// Evaluate the surface at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Point3;

    /// Partial derivative along `u`.
    fn tangent_u(&self, u: f64, v: f64) -> Vector3;

    /// Partial derivative along `v`.
    fn tangent_v(&self, u: f64, v: f64) -> Vector3;

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64);

    /// Whether the u axis is periodic.
    fn wraps_u(&self) -> bool {
        false
    }

    /// Whether the v axis is periodic.
    fn wraps_v(&self) -> bool {
        false
    }

    /// Degenerate surfaces (a single point) have no free parameters.
    fn is_degenerate(&self) -> bool {
        false
    }

    /// Unit normal, `+Z` where the tangents are parallel.
    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        let n = self.tangent_u(u, v).cross(self.tangent_v(u, v));
        let len = n.length();
        if len < 1e-15 {
            DVec3::Z
        } else {
            n / len
        }
    }

    fn bounds(&self) -> ParamRect {
        ParamRect::from_ranges(self.domain_u(), self.domain_v())
    }

    /// Fold wrapped axes into range and clamp the others.
    fn fold(&self, p: Point2) -> Point2 {
        Point2::new(
            fold_parameter(p.x, self.domain_u(), self.wraps_u()),
            fold_parameter(p.y, self.domain_v(), self.wraps_v()),
        )
    }

    /// Whether `p` is a valid parameter pair; wrapped axes accept any value.
    fn accepts(&self, p: Point2) -> bool {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        (self.wraps_u() || (p.x >= u0 && p.x <= u1)) && (self.wraps_v() || (p.y >= v0 && p.y <= v1))
    }
}

/// Bring `x` into `range`: periodic folding when `wraps`, clamping otherwise.
pub fn fold_parameter(x: f64, range: (f64, f64), wraps: bool) -> f64 {
    let (min, max) = range;
    if wraps {
        let period = max - min;
        if period <= 0.0 {
            return min;
        }
        let folded = min + (x - min).rem_euclid(period);
        // rem_euclid may round up to exactly one period
        if folded >= max {
            min
        } else {
            folded
        }
    } else {
        x.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_wraps_both_directions() {
        assert!((fold_parameter(1.25, (0.0, 1.0), true) - 0.25).abs() < 1e-12);
        assert!((fold_parameter(-0.25, (0.0, 1.0), true) - 0.75).abs() < 1e-12);
        assert!((fold_parameter(7.5, (2.0, 4.0), true) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_fold_clamps_without_wrap() {
        assert_eq!(fold_parameter(1.25, (0.0, 1.0), false), 1.0);
        assert_eq!(fold_parameter(-0.25, (0.0, 1.0), false), 0.0);
    }

    #[test]
    fn test_fold_tiny_negative_stays_in_range() {
        let x = fold_parameter(-1e-18, (0.0, 1.0), true);
        assert!((0.0..1.0).contains(&x));
    }
}
