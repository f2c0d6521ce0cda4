//! Starting points for tracing: coarse sampling followed by gradient refinement.

use mcad_geometry::ParametricSurface;
use mcad_math::{DVec2, DVec4, Point3, Vec4Swizzles};
use tracing::{debug, instrument};

use crate::minimize::{grid_samples, project};
use crate::tracer::IntersectionTracer;

impl<'a> IntersectionTracer<'a> {
    /// Find parameters `(u1, v1, u2, v2)` where the surfaces meet.
    ///
    /// Both surfaces are sampled on a coarse grid; candidate pairs are ranked by
    /// distance and refined with conjugate gradients, at most `seed_attempts`
    /// of them. For a self-intersection the two parameter pairs must also stay
    /// apart.
    #[instrument(skip(self))]
    pub fn find_starting_point(&self) -> Option<DVec4> {
        let candidates = if self.self_intersection {
            self.self_candidates()
        } else {
            self.pair_candidates()
        };
        let seed = candidates
            .into_iter()
            .take(self.settings.seed_attempts)
            .find_map(|c| self.refine(c, [true; 4]));
        if seed.is_none() {
            debug!("no starting point found");
        }
        seed
    }

    /// Like [`find_starting_point`](Self::find_starting_point), but starting
    /// from the projections of `cursor` onto the surfaces.
    ///
    /// The cursor is projected onto the first surface. For a self-intersection
    /// the second pair is seeded from the grid, away from the first; otherwise
    /// the cursor is projected onto the second surface as well. Falls back to
    /// the plain grid search.
    #[instrument(skip(self))]
    pub fn find_starting_point_near(&self, cursor: Point3) -> Option<DVec4> {
        let first = self.pair.first;
        let uv1 = project(first, cursor, &self.settings).params.zw();

        // On a self-intersection the first pair stays on the cursor projection.
        let free = if self.self_intersection {
            [false, false, true, true]
        } else {
            [true; 4]
        };
        let candidates: Vec<DVec4> = if self.self_intersection {
            let anchor = first.point_at(uv1.x, uv1.y);
            let mut ranked: Vec<(f64, DVec4)> = grid_samples(first, self.settings.seed_samples)
                .into_iter()
                .filter(|&uv| parameter_gap(first, uv1, uv) > self.settings.distinct_parameters)
                .map(|uv| {
                    let d = first.point_at(uv.x, uv.y).distance_squared(anchor);
                    (d, DVec4::new(uv1.x, uv1.y, uv.x, uv.y))
                })
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            ranked.into_iter().map(|(_, c)| c).collect()
        } else {
            let uv2 = project(self.pair.second, cursor, &self.settings).params.zw();
            vec![DVec4::new(uv1.x, uv1.y, uv2.x, uv2.y)]
        };

        candidates
            .into_iter()
            .take(self.settings.seed_attempts)
            .find_map(|c| self.refine(c, free))
            .or_else(|| {
                debug!("no seed near the cursor, falling back to the grid search");
                self.find_starting_point()
            })
    }

    /// Refine a candidate over the parameters flagged in `free` and accept it
    /// when the surfaces meet there.
    fn refine(&self, start: DVec4, free: [bool; 4]) -> Option<DVec4> {
        let m = self.minimize(start, free);
        if m.distance >= self.settings.seed_tolerance {
            return None;
        }
        if self.self_intersection
            && parameter_gap(self.pair.first, m.params.xy(), m.params.zw())
                <= self.settings.distinct_parameters
        {
            return None;
        }
        debug!(params = ?m.params, distance = m.distance, iterations = m.iterations, "accepted seed");
        Some(m.params)
    }

    /// All sample pairs across the two surfaces, nearest first.
    fn pair_candidates(&self) -> Vec<DVec4> {
        let n = self.settings.seed_samples;
        let a = sample(self.pair.first, n);
        let b = sample(self.pair.second, n);

        let mut ranked = Vec::with_capacity(a.len() * b.len());
        for &(uv1, p1) in &a {
            for &(uv2, p2) in &b {
                ranked.push((p1.distance_squared(p2), DVec4::new(uv1.x, uv1.y, uv2.x, uv2.y)));
            }
        }
        ranked.sort_by(|x, y| x.0.total_cmp(&y.0));
        ranked.into_iter().map(|(_, c)| c).collect()
    }

    /// Distinct sample pairs on the one surface, nearest first.
    fn self_candidates(&self) -> Vec<DVec4> {
        let surface = self.pair.first;
        let samples = sample(surface, self.settings.seed_samples);

        let mut ranked = Vec::new();
        for (i, &(uv1, p1)) in samples.iter().enumerate() {
            for &(uv2, p2) in &samples[i + 1..] {
                if parameter_gap(surface, uv1, uv2) <= self.settings.distinct_parameters {
                    continue;
                }
                ranked.push((p1.distance_squared(p2), DVec4::new(uv1.x, uv1.y, uv2.x, uv2.y)));
            }
        }
        ranked.sort_by(|x, y| x.0.total_cmp(&y.0));
        ranked.into_iter().map(|(_, c)| c).collect()
    }
}

fn sample(surface: &dyn ParametricSurface, n: usize) -> Vec<(DVec2, Point3)> {
    grid_samples(surface, n)
        .into_iter()
        .map(|uv| (uv, surface.point_at(uv.x, uv.y)))
        .collect()
}

/// Parameter-space distance between two points of one surface, measured the
/// short way round on periodic axes.
pub(crate) fn parameter_gap(surface: &dyn ParametricSurface, a: DVec2, b: DVec2) -> f64 {
    let axis = |x: f64, y: f64, range: (f64, f64), wraps: bool| {
        let d = (x - y).abs();
        if wraps {
            d.min((range.1 - range.0) - d).max(0.0)
        } else {
            d
        }
    };
    let du = axis(a.x, b.x, surface.domain_u(), surface.wraps_u());
    let dv = axis(a.y, b.y, surface.domain_v(), surface.wraps_v());
    (du * du + dv * dv).sqrt()
}
