//! De Boor evaluation of B-spline curves and tensor-product surfaces.

use mcad_math::{DVec3, Point3, Vector3};

use super::knot::{basis_functions, basis_functions_derivs, find_span};

/// Evaluate a B-spline curve at parameter `t`.
pub fn curve_point(degree: usize, knots: &[f64], control_points: &[Point3], t: f64) -> Point3 {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let basis = basis_functions(degree, knots, span, t);

    basis
        .iter()
        .enumerate()
        .fold(DVec3::ZERO, |acc, (i, &b)| {
            acc + b * control_points[span - degree + i]
        })
}

/// First derivative of a B-spline curve at parameter `t`.
pub fn curve_tangent(degree: usize, knots: &[f64], control_points: &[Point3], t: f64) -> Vector3 {
    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, t);
    let (_, dn) = basis_functions_derivs(degree, knots, span, t);

    dn.iter().enumerate().fold(DVec3::ZERO, |acc, (i, &d)| {
        acc + d * control_points[span - degree + i]
    })
}

/// Evaluate a B-spline surface at `(u, v)`, `control_points[i][j]` with `i` along u.
#[allow(clippy::needless_range_loop)]
pub fn surface_point(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[f64],
    knots_v: &[f64],
    control_points: &[Vec<Point3>],
    u: f64,
    v: f64,
) -> Point3 {
    let span_u = find_span(degree_u, knots_u, control_points.len() - 1, u);
    let basis_u = basis_functions(degree_u, knots_u, span_u, u);
    let span_v = find_span(degree_v, knots_v, control_points[0].len() - 1, v);
    let basis_v = basis_functions(degree_v, knots_v, span_v, v);

    let mut point = DVec3::ZERO;
    for i in 0..=degree_u {
        let column = &control_points[span_u - degree_u + i];
        for j in 0..=degree_v {
            point += basis_u[i] * basis_v[j] * column[span_v - degree_v + j];
        }
    }
    point
}

/// Partial derivatives `(dS/du, dS/dv)` of a B-spline surface at `(u, v)`.
#[allow(clippy::needless_range_loop)]
pub fn surface_derivs(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[f64],
    knots_v: &[f64],
    control_points: &[Vec<Point3>],
    u: f64,
    v: f64,
) -> (Vector3, Vector3) {
    let span_u = find_span(degree_u, knots_u, control_points.len() - 1, u);
    let (basis_u, dbasis_u) = basis_functions_derivs(degree_u, knots_u, span_u, u);
    let span_v = find_span(degree_v, knots_v, control_points[0].len() - 1, v);
    let (basis_v, dbasis_v) = basis_functions_derivs(degree_v, knots_v, span_v, v);

    let mut du = DVec3::ZERO;
    let mut dv = DVec3::ZERO;
    for i in 0..=degree_u {
        let column = &control_points[span_u - degree_u + i];
        for j in 0..=degree_v {
            let cp = column[span_v - degree_v + j];
            du += dbasis_u[i] * basis_v[j] * cp;
            dv += basis_u[i] * dbasis_v[j] * cp;
        }
    }
    (du, dv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::knot::uniform_knots;

    #[test]
    fn test_curve_point_linear() {
        let knots = vec![0.0, 0.0, 1.0, 2.0, 2.0];
        let cps = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
        ];

        let p = curve_point(1, &knots, &cps, 0.5);
        assert!((p - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-10);
        let p = curve_point(1, &knots, &cps, 1.5);
        assert!((p - DVec3::new(1.0, 0.5, 0.0)).length() < 1e-10);
        let t = curve_tangent(1, &knots, &cps, 1.5);
        assert!((t - DVec3::Y).length() < 1e-10);
    }

    #[test]
    fn test_uniform_cubic_at_knot_is_weighted_average() {
        let cps = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 3.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(3.0, 3.0, 0.0),
        ];
        let knots = uniform_knots(8);
        let p = curve_point(3, &knots, &cps, 3.0);
        let expected = (cps[0] + 4.0 * cps[1] + cps[2]) / 6.0;
        assert!((p - expected).length() < 1e-12);
    }

    #[test]
    fn test_surface_point_bilinear() {
        let knots = vec![0.0, 0.0, 1.0, 1.0];
        let cps = vec![
            vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(0.0, 1.0, 0.0)],
            vec![DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 1.0, 0.0)],
        ];

        let p = surface_point(1, 1, &knots, &knots, &cps, 0.25, 0.5);
        assert!((p - DVec3::new(0.25, 0.5, 0.0)).length() < 1e-10);
        let (du, dv) = surface_derivs(1, 1, &knots, &knots, &cps, 0.25, 0.5);
        assert!((du - DVec3::X).length() < 1e-10);
        assert!((dv - DVec3::Y).length() < 1e-10);
    }
}
