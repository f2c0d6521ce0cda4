//! Knot vector utilities for B-spline evaluation.

/// Uniform integer knot vector `0, 1, ..., count - 1`.
pub fn uniform_knots(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64).collect()
}

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`, clamped to
/// `[degree, n]` so the upper end of the domain maps onto the last span.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// The `degree + 1` basis functions that do not vanish on `span`, i.e.
/// `N_{span-degree, degree}(t)` through `N_{span, degree}(t)`.
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Basis functions on `span` together with their first derivatives.
///
/// Derivatives come from the degree-lowering identity
/// `N'_{i,p} = p N_{i,p-1} / (u_{i+p} - u_i) - p N_{i+1,p-1} / (u_{i+p+1} - u_{i+1})`.
pub fn basis_functions_derivs(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
) -> (Vec<f64>, Vec<f64>) {
    let values = basis_functions(degree, knots, span, t);
    if degree == 0 {
        return (values, vec![0.0]);
    }

    let lower = basis_functions(degree - 1, knots, span, t);
    let p = degree as f64;
    let ratio = |num: f64, den: f64| if den.abs() < 1e-15 { 0.0 } else { num / den };

    let derivs = (0..=degree)
        .map(|k| {
            let first = if k >= 1 { lower[k - 1] } else { 0.0 };
            let second = if k < degree { lower[k] } else { 0.0 };
            let i = span + k - degree;
            p * ratio(first, knots[i + degree] - knots[i])
                - p * ratio(second, knots[i + degree + 1] - knots[i + 1])
        })
        .collect();

    (values, derivs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_uniform() {
        let knots = uniform_knots(9);
        let n = 4;
        let degree = 3;

        assert_eq!(find_span(degree, &knots, n, 3.0), 3);
        assert_eq!(find_span(degree, &knots, n, 3.5), 3);
        assert_eq!(find_span(degree, &knots, n, 4.0), 4);
        assert_eq!(find_span(degree, &knots, n, 4.9), 4);
        assert_eq!(find_span(degree, &knots, n, 5.0), 4);
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let knots = uniform_knots(10);
        let degree = 3;
        let n = 5;

        for i in 0..=12 {
            let t = 3.0 + i as f64 / 4.0;
            let span = find_span(degree, &knots, n, t);
            let (basis, derivs) = basis_functions_derivs(degree, &knots, span, t);
            let sum: f64 = basis.iter().sum();
            let dsum: f64 = derivs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at t={}: {}", t, sum);
            assert!(dsum.abs() < 1e-12, "derivative sum at t={}: {}", t, dsum);
            assert!(basis.iter().all(|&b| b >= -1e-15));
        }
    }

    #[test]
    fn test_uniform_cubic_weights() {
        // At a knot the uniform cubic basis is (1, 4, 1, 0) / 6.
        let knots = uniform_knots(8);
        let span = find_span(3, &knots, 3, 3.0);
        let basis = basis_functions(3, &knots, span, 3.0);
        assert!((basis[0] - 1.0 / 6.0).abs() < 1e-12);
        assert!((basis[1] - 4.0 / 6.0).abs() < 1e-12);
        assert!((basis[2] - 1.0 / 6.0).abs() < 1e-12);
        assert!(basis[3].abs() < 1e-12);
    }

    #[test]
    fn test_derivatives_match_finite_differences() {
        let knots = vec![0.0, 0.0, 0.0, 1.0, 2.5, 3.0, 3.0, 3.0];
        let degree = 2;
        let n = 4;
        let h = 1e-6;
        for &t in &[0.3, 1.7, 2.8] {
            let span = find_span(degree, &knots, n, t);
            let (_, d) = basis_functions_derivs(degree, &knots, span, t);
            let plus = basis_functions(degree, &knots, span, t + h);
            let minus = basis_functions(degree, &knots, span, t - h);
            for k in 0..=degree {
                let fd = (plus[k] - minus[k]) / (2.0 * h);
                assert!((fd - d[k]).abs() < 1e-6, "t={} k={}: {} vs {}", t, k, fd, d[k]);
            }
        }
    }
}
