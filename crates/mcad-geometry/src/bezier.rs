//! Cubic Bernstein evaluation and De Casteljau subdivision.

use mcad_math::{Point3, Vector3};

/// Cubic Bernstein basis at `t`.
pub fn bernstein3(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

/// Derivatives of the cubic Bernstein basis at `t`.
pub fn bernstein3_derivative(t: f64) -> [f64; 4] {
    let s = 1.0 - t;
    [
        -3.0 * s * s,
        3.0 * s * s - 6.0 * t * s,
        6.0 * t * s - 3.0 * t * t,
        3.0 * t * t,
    ]
}

/// Point on the cubic Bezier segment `cp` at `t`.
pub fn cubic_point(cp: &[Point3; 4], t: f64) -> Point3 {
    let b = bernstein3(t);
    cp[0] * b[0] + cp[1] * b[1] + cp[2] * b[2] + cp[3] * b[3]
}

/// First derivative of the cubic Bezier segment `cp` at `t`.
pub fn cubic_derivative(cp: &[Point3; 4], t: f64) -> Vector3 {
    let b = bernstein3_derivative(t);
    cp[0] * b[0] + cp[1] * b[1] + cp[2] * b[2] + cp[3] * b[3]
}

/// Quadratic Bezier combination of three vectors.
pub fn quadratic(cp: &[Vector3; 3], t: f64) -> Vector3 {
    let s = 1.0 - t;
    cp[0] * (s * s) + cp[1] * (2.0 * t * s) + cp[2] * (t * t)
}

/// Split a cubic segment at `t = 0.5` by repeated averaging.
///
/// The first half runs from `cp[0]` to the midpoint, the second from the
/// midpoint to `cp[3]`; both share the midpoint as an end control point.
pub fn split_half(cp: &[Point3; 4]) -> ([Point3; 4], [Point3; 4]) {
    let a = (cp[0] + cp[1]) * 0.5;
    let b = (cp[1] + cp[2]) * 0.5;
    let c = (cp[2] + cp[3]) * 0.5;
    let ab = (a + b) * 0.5;
    let bc = (b + c) * 0.5;
    let mid = (ab + bc) * 0.5;
    ([cp[0], a, ab, mid], [mid, bc, c, cp[3]])
}

/// Control points of the `[0, 0.5]` half of `cp`, reparametrized to `[0, 1]`.
pub fn first_half(cp: &[Point3; 4]) -> [Point3; 4] {
    split_half(cp).0
}

/// Control points of the `[0.5, 1]` half of `cp`, reparametrized to `[0, 1]`.
pub fn second_half(cp: &[Point3; 4]) -> [Point3; 4] {
    split_half(cp).1
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcad_math::DVec3;

    fn sample() -> [Point3; 4] {
        [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(3.0, 2.0, 1.0),
            DVec3::new(4.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_bernstein_partition_of_unity() {
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let sum: f64 = bernstein3(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-14);
            let dsum: f64 = bernstein3_derivative(t).iter().sum();
            assert!(dsum.abs() < 1e-14);
        }
    }

    #[test]
    fn test_halves_reproduce_curve() {
        let cp = sample();
        let (left, right) = split_half(&cp);
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            let on_left = cubic_point(&left, t);
            let on_right = cubic_point(&right, t);
            assert!((on_left - cubic_point(&cp, 0.5 * t)).length() < 1e-12);
            assert!((on_right - cubic_point(&cp, 0.5 + 0.5 * t)).length() < 1e-12);
        }
    }

    #[test]
    fn test_halves_are_c1_at_midpoint() {
        let (left, right) = split_half(&sample());
        assert_eq!(left[3], right[0]);
        let d_left = cubic_derivative(&left, 1.0);
        let d_right = cubic_derivative(&right, 0.0);
        assert!((d_left - d_right).length() < 1e-12);
        // Half-curves run at half the speed of the original.
        let d = cubic_derivative(&sample(), 0.5);
        assert!((d_left * 2.0 - d).length() < 1e-12);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let cp = sample();
        let h = 1e-6;
        for &t in &[0.1, 0.4, 0.9] {
            let fd = (cubic_point(&cp, t + h) - cubic_point(&cp, t - h)) / (2.0 * h);
            assert!((fd - cubic_derivative(&cp, t)).length() < 1e-6);
        }
    }

    #[test]
    fn test_quadratic_endpoints() {
        let cp = [DVec3::X, DVec3::Y, DVec3::Z];
        assert_eq!(quadratic(&cp, 0.0), DVec3::X);
        assert_eq!(quadratic(&cp, 1.0), DVec3::Z);
    }
}
