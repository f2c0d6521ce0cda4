//! Conjugate-gradient minimization of the squared distance between two surfaces.

use mcad_core::TraceSettings;
use mcad_geometry::ParametricSurface;
use mcad_math::{DVec2, DVec3, DVec4, Vec4Swizzles};
use serde::{Deserialize, Serialize};

/// Outcome of a distance minimization over the packed parameters
/// `(u1, v1, u2, v2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minimization {
    pub params: DVec4,
    /// Distance `|S1(u1, v1) - S2(u2, v2)|` at `params`.
    pub distance: f64,
    pub iterations: usize,
    /// False when the iteration cap was hit before the step size collapsed.
    pub converged: bool,
}

/// The two surfaces seen as one function of four parameters.
#[derive(Clone, Copy)]
pub(crate) struct SurfacePair<'a> {
    pub first: &'a dyn ParametricSurface,
    pub second: &'a dyn ParametricSurface,
}

impl<'a> SurfacePair<'a> {
    pub fn new(first: &'a dyn ParametricSurface, second: &'a dyn ParametricSurface) -> Self {
        Self { first, second }
    }

    /// Fold both parameter pairs into their surface domains.
    pub fn fold(&self, p: DVec4) -> DVec4 {
        let a = self.first.fold(p.xy());
        let b = self.second.fold(p.zw());
        DVec4::new(a.x, a.y, b.x, b.y)
    }

    pub fn difference(&self, p: DVec4) -> DVec3 {
        self.first.point_at(p.x, p.y) - self.second.point_at(p.z, p.w)
    }

    pub fn squared_distance(&self, p: DVec4) -> f64 {
        self.difference(p).length_squared()
    }

    pub fn gradient(&self, p: DVec4) -> DVec4 {
        let d = self.difference(p) * 2.0;
        DVec4::new(
            d.dot(self.first.tangent_u(p.x, p.y)),
            d.dot(self.first.tangent_v(p.x, p.y)),
            -d.dot(self.second.tangent_u(p.z, p.w)),
            -d.dot(self.second.tangent_v(p.z, p.w)),
        )
    }
}

fn mask(v: DVec4, free: [bool; 4]) -> DVec4 {
    DVec4::new(
        if free[0] { v.x } else { 0.0 },
        if free[1] { v.y } else { 0.0 },
        if free[2] { v.z } else { 0.0 },
        if free[3] { v.w } else { 0.0 },
    )
}

/// Golden-section search for the minimum of `f` on `[0, upper]`.
///
/// Returns `0.0` when no sampled step improves on `f(0)`.
pub(crate) fn golden_section(f: impl Fn(f64) -> f64, upper: f64, steps: usize) -> f64 {
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let (mut lo, mut hi) = (0.0, upper);
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for _ in 0..steps {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - ratio * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + ratio * (hi - lo);
            f2 = f(x2);
        }
    }

    let t = 0.5 * (lo + hi);
    if f(t) < f(0.0) {
        t
    } else {
        0.0
    }
}

/// Polak–Ribière conjugate gradients on `|S1 - S2|^2`, moving only the
/// parameters flagged in `free`.
///
/// Each search direction is normalized and searched with golden sections on
/// `[0, line_search_max]`; parameters are folded after every step. The descent
/// ends as converged once a step shorter than `cg_min_step` is taken.
pub(crate) fn minimize(
    pair: SurfacePair<'_>,
    start: DVec4,
    free: [bool; 4],
    settings: &TraceSettings,
) -> Minimization {
    let steps = settings.line_search_steps();
    let mut x = pair.fold(start);
    let mut g = mask(pair.gradient(x), free);
    let mut dir = -g;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < settings.cg_max_iterations {
        iterations += 1;
        if dir.dot(g) >= 0.0 {
            dir = -g;
        }
        let unit = dir.normalize_or_zero();
        if unit == DVec4::ZERO {
            // Stationary point.
            converged = true;
            break;
        }

        let alpha = golden_section(
            |t| pair.squared_distance(pair.fold(x + unit * t)),
            settings.line_search_max,
            steps,
        );
        let next = pair.fold(x + unit * alpha);
        if alpha < settings.cg_min_step {
            x = next;
            converged = true;
            break;
        }

        let g_next = mask(pair.gradient(next), free);
        let denom = g.length_squared();
        let beta = if denom > 0.0 {
            (g_next.dot(g_next - g) / denom).max(0.0)
        } else {
            0.0
        };
        dir = -g_next + dir * beta;
        x = next;
        g = g_next;
    }

    Minimization {
        params: x,
        distance: pair.squared_distance(x).sqrt(),
        iterations,
        converged,
    }
}

/// Parameters of `surface` nearest to `point`, refined from the best sample of
/// an `n x n` grid.
pub(crate) fn project(
    surface: &dyn ParametricSurface,
    point: DVec3,
    settings: &TraceSettings,
) -> Minimization {
    let cursor = mcad_geometry::Cursor::new(point);
    let start = grid_samples(surface, settings.seed_samples)
        .into_iter()
        .map(|uv| (uv, surface.point_at(uv.x, uv.y).distance_squared(point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(DVec2::ZERO, |(uv, _)| uv);

    minimize(
        SurfacePair::new(&cursor, surface),
        DVec4::new(0.0, 0.0, start.x, start.y),
        [false, false, true, true],
        settings,
    )
}

/// Cell-centred samples `((i + 0.5) / n, (j + 0.5) / n)` mapped into the domain.
pub(crate) fn grid_samples(surface: &dyn ParametricSurface, n: usize) -> Vec<DVec2> {
    let (u0, u1) = surface.domain_u();
    let (v0, v1) = surface.domain_v();
    let mut out = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let s = (i as f64 + 0.5) / n as f64;
            let t = (j as f64 + 0.5) / n as f64;
            out.push(DVec2::new(u0 + s * (u1 - u0), v0 + t * (v1 - v0)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcad_geometry::{BezierSurface, Cursor, Torus};

    #[test]
    fn test_golden_section_finds_parabola_minimum() {
        let t = golden_section(|t| (t - 0.13).powi(2), 0.2, 24);
        assert!((t - 0.13).abs() < 1e-5);
    }

    #[test]
    fn test_golden_section_returns_zero_without_descent() {
        let t = golden_section(|t| t, 0.2, 24);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_coincident_points_converge_immediately() {
        let a = Cursor::new(DVec3::new(1.0, 2.0, 3.0));
        let b = Cursor::new(DVec3::new(1.0, 2.0, 3.0));
        let settings = TraceSettings::default();
        let m = minimize(SurfacePair::new(&a, &b), DVec4::splat(0.5), [true; 4], &settings);
        assert!(m.converged);
        assert!(m.iterations < settings.cg_max_iterations);
        assert!(m.distance < 1e-12);
    }

    #[test]
    fn test_cursor_projects_onto_flat_patch() {
        let plane = BezierSurface::flat(DVec3::ZERO, DVec3::X * 2.0, DVec3::Y * 2.0, 1, 1);
        let settings = TraceSettings::default();
        let m = project(&plane, DVec3::new(0.6, 1.4, 0.0), &settings);
        assert!(m.converged);
        assert!(m.distance < 1e-4, "distance {}", m.distance);
        assert!((m.params.z - 0.3).abs() < 1e-3);
        assert!((m.params.w - 0.7).abs() < 1e-3);
    }

    #[test]
    fn test_projection_onto_torus_lands_on_nearest_point() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 2.0, 0.5);
        let settings = TraceSettings::default();
        // Straight above the tube centre at distance 1 from the tube axis.
        let m = project(&torus, DVec3::new(0.0, 2.0, 1.0), &settings);
        assert!((m.distance - 0.5).abs() < 1e-3, "distance {}", m.distance);
    }

    #[test]
    fn test_fixed_parameters_do_not_move() {
        let plane = BezierSurface::flat(DVec3::ZERO, DVec3::X, DVec3::Y, 1, 1);
        let cursor = Cursor::new(DVec3::new(0.2, 0.2, 0.0));
        let settings = TraceSettings::default();
        let m = minimize(
            SurfacePair::new(&plane, &cursor),
            DVec4::new(0.8, 0.8, 0.1, 0.1),
            [false, true, false, false],
            &settings,
        );
        assert_eq!(m.params.x, 0.8);
        assert!((m.params.y - 0.2).abs() < 1e-3);
    }
}
