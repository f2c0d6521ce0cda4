//! Thomas algorithm for tridiagonal systems with vector right-hand sides.

use mcad_core::{McadError, Result};

use crate::Vector3;

/// Solve `sub[i] * x[i-1] + diag[i] * x[i] + sup[i] * x[i+1] = rhs[i]`.
///
/// `sub[0]` and `sup[n-1]` are ignored. Fails on a vanishing pivot, which for
/// the diagonally dominant systems of spline interpolation only happens with
/// degenerate input.
pub fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[Vector3],
) -> Result<Vec<Vector3>> {
    let n = diag.len();
    if sub.len() != n || sup.len() != n || rhs.len() != n {
        return Err(McadError::InvalidOperation(format!(
            "tridiagonal system size mismatch: {} / {} / {} / {}",
            sub.len(),
            n,
            sup.len(),
            rhs.len()
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut c = vec![0.0; n];
    let mut d = vec![Vector3::ZERO; n];

    // Forward sweep
    let mut pivot = diag[0];
    if pivot.abs() < 1e-15 {
        return Err(McadError::Geometry("zero pivot in tridiagonal solve".into()));
    }
    c[0] = sup[0] / pivot;
    d[0] = rhs[0] / pivot;
    for i in 1..n {
        pivot = diag[i] - sub[i] * c[i - 1];
        if pivot.abs() < 1e-15 {
            return Err(McadError::Geometry("zero pivot in tridiagonal solve".into()));
        }
        c[i] = sup[i] / pivot;
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / pivot;
    }

    // Back substitution
    let mut x = d;
    for i in (0..n - 1).rev() {
        x[i] = x[i] - c[i] * x[i + 1];
    }
    Ok(x)
}
