//! Predictor-corrector continuation of the intersection curve of two surfaces.

use mcad_core::{McadError, Result, TraceSettings, Validate};
use mcad_geometry::{fold_parameter, ParametricSurface};
use mcad_math::{clip_line, DMat2, DVec2, DVec3, DVec4, Point3, Vec4Swizzles};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use tracing::{debug, instrument, warn};

use crate::intersection::{Intersection, IntersectionPoint, IntersectionType};
use crate::loops::ParameterLoop;
use crate::minimize::{self, Minimization, SurfacePair};

/// Traces the intersection of two surfaces, or of one surface with itself.
pub struct IntersectionTracer<'a> {
    pub(crate) pair: SurfacePair<'a>,
    pub(crate) self_intersection: bool,
    pub(crate) settings: TraceSettings,
}

/// Result of one continuation step.
enum Advance {
    Inside(DVec4),
    /// The step left a non-periodic domain and was cut back onto its edge.
    Boundary(DVec4),
    Failed,
}

/// How one direction of the march ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum March {
    Closed,
    Boundary,
    Failed,
    Capped,
}

impl March {
    fn converged(self) -> bool {
        matches!(self, Self::Closed | Self::Boundary)
    }
}

impl<'a> IntersectionTracer<'a> {
    pub fn new(
        first: &'a dyn ParametricSurface,
        second: &'a dyn ParametricSurface,
        settings: TraceSettings,
    ) -> Result<Self> {
        settings.validate()?;
        if first.is_degenerate() || second.is_degenerate() {
            return Err(McadError::InvalidOperation(
                "cannot trace an intersection with a degenerate surface".into(),
            ));
        }
        Ok(Self {
            pair: SurfacePair::new(first, second),
            self_intersection: false,
            settings,
        })
    }

    /// Tracer for the curve along which `surface` meets itself.
    pub fn self_intersection(surface: &'a dyn ParametricSurface, settings: TraceSettings) -> Result<Self> {
        let mut tracer = Self::new(surface, surface, settings)?;
        tracer.self_intersection = true;
        Ok(tracer)
    }

    pub fn is_self_intersection(&self) -> bool {
        self.self_intersection
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Conjugate-gradient descent on the squared distance, moving only the
    /// parameters flagged in `free`.
    pub fn minimize(&self, start: DVec4, free: [bool; 4]) -> Minimization {
        minimize::minimize(self.pair, start, free, &self.settings)
    }

    /// Distance between the two surface points addressed by `params`.
    pub fn distance(&self, params: DVec4) -> f64 {
        self.pair.squared_distance(params).sqrt()
    }

    /// Seed (near `cursor` when given) and trace the intersection curve.
    ///
    /// Fails with [`McadError::NoIntersection`] when no starting point is found.
    #[instrument(skip(self))]
    pub fn find_intersection(&self, step: f64, cursor: Option<Point3>) -> Result<Intersection> {
        check_step(step)?;
        let seed = match cursor {
            Some(c) => self.find_starting_point_near(c),
            None => self.find_starting_point(),
        };
        let seed = seed.ok_or_else(|| {
            McadError::NoIntersection("no starting point closer than the seed tolerance".into())
        })?;
        self.trace(seed, step)
    }

    /// March from `seed` in steps of length `step` until the curve closes, and
    /// otherwise in both directions until each leaves the domain.
    #[instrument(skip(self))]
    pub fn trace(&self, seed: DVec4, step: f64) -> Result<Intersection> {
        check_step(step)?;
        let start = self.point(self.pair.fold(seed));

        let mut forward = vec![start];
        let ahead = self.march(&mut forward, step, false);
        let (points, closed, converged) = if ahead == March::Closed {
            (forward, true, true)
        } else {
            debug!(?ahead, "curve did not close, tracing backwards from the seed");
            let mut backward = vec![start];
            let behind = self.march(&mut backward, step, true);
            backward.remove(0);
            backward.reverse();
            backward.extend(forward);
            (backward, false, ahead.converged() && behind.converged())
        };

        debug!(points = points.len(), closed, converged, "traced intersection");
        Ok(self.assemble(points, closed, converged))
    }

    fn march(&self, points: &mut Vec<IntersectionPoint>, step: f64, reversed: bool) -> March {
        let origin = points[0].location;
        loop {
            if points.len() >= self.settings.max_points {
                warn!(max_points = self.settings.max_points, "point cap reached");
                return March::Capped;
            }
            let current = points[points.len() - 1];
            match self.advance(current, step, reversed) {
                Advance::Inside(x) => {
                    let next = self.point(x);
                    if points.len() >= 3 && next.location.distance(origin) < step {
                        return March::Closed;
                    }
                    points.push(next);
                }
                Advance::Boundary(x) => {
                    debug!(params = ?x, "trace left the domain");
                    points.push(self.point(x));
                    return March::Boundary;
                }
                Advance::Failed => {
                    warn!(params = ?current.coords, "Newton correction did not converge");
                    return March::Failed;
                }
            }
        }
    }

    /// One predictor-corrector step from `current` along `n1 x n2`.
    fn advance(&self, current: IntersectionPoint, step: f64, reversed: bool) -> Advance {
        let (a, b) = (self.pair.first, self.pair.second);
        let p = current.coords;
        let n1 = a.normal_at(p.x, p.y);
        let n2 = b.normal_at(p.z, p.w);
        let mut dir = n1.cross(n2);
        if dir.length_squared() < 1e-24 {
            debug!(params = ?p, "surfaces are tangent");
            return Advance::Failed;
        }
        dir = dir.normalize();
        if reversed {
            dir = -dir;
        }

        let (Some(d1), Some(d2)) = (
            tangent_step(a, p.xy(), dir * step),
            tangent_step(b, p.zw(), dir * step),
        ) else {
            return Advance::Failed;
        };
        let mut x = self.fold_periodic(p + DVec4::new(d1.x, d1.y, d2.x, d2.y));

        let origin = current.location;
        let mut converged = false;
        for _ in 0..self.settings.newton_max_iterations {
            let s1 = a.point_at(x.x, x.y);
            let s2 = b.point_at(x.z, x.w);
            let diff = s1 - s2;
            let f = Vector4::new(diff.x, diff.y, diff.z, (s1 - origin).dot(dir) - step);
            if f.norm() < self.settings.newton_tolerance {
                converged = true;
                break;
            }

            let (au, av) = (a.tangent_u(x.x, x.y), a.tangent_v(x.x, x.y));
            let (bu, bv) = (b.tangent_u(x.z, x.w), b.tangent_v(x.z, x.w));
            #[rustfmt::skip]
            let jacobian = Matrix4::new(
                au.x, av.x, -bu.x, -bv.x,
                au.y, av.y, -bu.y, -bv.y,
                au.z, av.z, -bu.z, -bv.z,
                au.dot(dir), av.dot(dir), 0.0, 0.0,
            );
            let Some(dx) = jacobian.lu().solve(&(-f)) else {
                break;
            };
            x = self.fold_periodic(x + DVec4::new(dx[0], dx[1], dx[2], dx[3]));
        }
        if !converged {
            converged = self.residual(x, origin, dir, step) < self.settings.newton_tolerance;
        }

        if a.accepts(x.xy()) && b.accepts(x.zw()) {
            return if converged { Advance::Inside(x) } else { Advance::Failed };
        }

        let (cut, pinned) = self.truncate(p, x);
        let settled = match pinned {
            Some(axis) => self.settle_on_edge(cut, axis),
            None if converged => Some(cut),
            None => None,
        };
        match settled.map(|y| self.pair.fold(y)) {
            Some(y) if self.distance(y) < self.settings.newton_tolerance => Advance::Boundary(y),
            _ => {
                debug!(params = ?cut, "could not settle the exit point on the domain edge");
                Advance::Failed
            }
        }
    }

    /// Newton iteration on `S1 - S2 = 0` with parameter `pinned` held on the
    /// domain edge and the other three free.
    fn settle_on_edge(&self, mut x: DVec4, pinned: usize) -> Option<DVec4> {
        let (a, b) = (self.pair.first, self.pair.second);
        let free: Vec<usize> = (0..4).filter(|&k| k != pinned).collect();
        for _ in 0..=self.settings.newton_max_iterations {
            let diff = self.pair.difference(x);
            if diff.length() < self.settings.newton_tolerance {
                return Some(x);
            }
            let columns = [
                a.tangent_u(x.x, x.y),
                a.tangent_v(x.x, x.y),
                -b.tangent_u(x.z, x.w),
                -b.tangent_v(x.z, x.w),
            ];
            let column = |k: usize| Vector3::new(columns[k].x, columns[k].y, columns[k].z);
            let jacobian = Matrix3::from_columns(&[column(free[0]), column(free[1]), column(free[2])]);
            let dx = jacobian.lu().solve(&Vector3::new(-diff.x, -diff.y, -diff.z))?;
            for (slot, &k) in free.iter().enumerate() {
                x[k] += dx[slot];
            }
            x = self.fold_periodic(x);
        }
        None
    }

    fn residual(&self, x: DVec4, origin: Point3, dir: DVec3, step: f64) -> f64 {
        let s1 = self.pair.first.point_at(x.x, x.y);
        let diff = self.pair.squared_distance(x);
        let along = (s1 - origin).dot(dir) - step;
        (diff + along * along).sqrt()
    }

    /// Fold periodic axes only; values outside a non-periodic domain are kept
    /// so the boundary exit can be detected.
    fn fold_periodic(&self, x: DVec4) -> DVec4 {
        let (a, b) = (self.pair.first, self.pair.second);
        let fold = |v: f64, range: (f64, f64), wraps: bool| {
            if wraps {
                fold_parameter(v, range, true)
            } else {
                v
            }
        };
        DVec4::new(
            fold(x.x, a.domain_u(), a.wraps_u()),
            fold(x.y, a.domain_v(), a.wraps_v()),
            fold(x.z, b.domain_u(), b.wraps_u()),
            fold(x.w, b.domain_v(), b.wraps_v()),
        )
    }

    /// `x - p` with periodic components taken to the nearest image.
    fn unwrapped_delta(&self, p: DVec4, x: DVec4) -> DVec4 {
        let (a, b) = (self.pair.first, self.pair.second);
        let near = |d: f64, range: (f64, f64), wraps: bool| {
            let period = range.1 - range.0;
            if !wraps || period <= 0.0 {
                d
            } else {
                d - period * (d / period).round()
            }
        };
        let d = x - p;
        DVec4::new(
            near(d.x, a.domain_u(), a.wraps_u()),
            near(d.y, a.domain_v(), a.wraps_v()),
            near(d.z, b.domain_u(), b.wraps_u()),
            near(d.w, b.domain_v(), b.wraps_v()),
        )
    }

    /// Cut the step `p -> x` where it first leaves a non-periodic domain edge,
    /// interpolating all four parameters by the same fraction.
    ///
    /// Also returns the index of the parameter lying on the edge, when the
    /// crossing was found.
    fn truncate(&self, p: DVec4, x: DVec4) -> (DVec4, Option<usize>) {
        let delta = self.unwrapped_delta(p, x);
        let target = p + delta;
        let sides: [(usize, &dyn ParametricSurface, DVec2, DVec2); 2] = [
            (0, self.pair.first, p.xy(), target.xy()),
            (1, self.pair.second, p.zw(), target.zw()),
        ];

        let mut best: Option<(f64, usize, DVec2)> = None;
        for (k, surface, from, to) in sides {
            if surface.accepts(to) {
                continue;
            }
            let u = clip_range(surface.domain_u(), surface.wraps_u(), from.x, to.x);
            let v = clip_range(surface.domain_v(), surface.wraps_v(), from.y, to.y);
            let Some(clip) = clip_line(from, to, u, v) else {
                continue;
            };
            let len = (to - from).length();
            let lambda = if len > 0.0 {
                (clip.exit - from).length() / len
            } else {
                0.0
            };
            if best.map_or(true, |(l, _, _)| lambda < l) {
                best = Some((lambda, k, clip.exit));
            }
        }

        let Some((lambda, k, exit)) = best else {
            return (self.pair.fold(x), None);
        };
        let surface = if k == 0 { self.pair.first } else { self.pair.second };
        let mut out = p + delta * lambda;
        out[2 * k] = exit.x;
        out[2 * k + 1] = exit.y;
        (self.pair.fold(out), Some(2 * k + edge_axis(surface, exit)))
    }

    pub(crate) fn point(&self, coords: DVec4) -> IntersectionPoint {
        IntersectionPoint {
            coords,
            location: self.pair.first.point_at(coords.x, coords.y),
        }
    }

    fn assemble(&self, points: Vec<IntersectionPoint>, closed: bool, converged: bool) -> Intersection {
        let (a, b) = (self.pair.first, self.pair.second);
        let first: Vec<_> = points.iter().map(|p| p.coords.xy()).collect();
        let second: Vec<_> = points.iter().map(|p| p.coords.zw()).collect();
        let loops = [
            ParameterLoop::build(&first, closed, a.bounds(), a.wraps_u(), a.wraps_v()),
            ParameterLoop::build(&second, closed, b.bounds(), b.wraps_u(), b.wraps_v()),
        ];
        let kind = IntersectionType::from_flags(loops[0].is_contractible(), loops[1].is_contractible());
        Intersection {
            points,
            loops,
            kind,
            closed,
            converged,
        }
    }
}

fn check_step(step: f64) -> Result<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(McadError::InvalidOperation(format!(
            "step size must be positive, got {step}"
        )))
    }
}

/// Clip bounds for one axis: the domain itself, or a range wide enough never
/// to clip on a periodic axis.
fn clip_range(domain: (f64, f64), wraps: bool, a: f64, b: f64) -> (f64, f64) {
    if wraps {
        let period = domain.1 - domain.0;
        (a.min(b).min(domain.0) - period, a.max(b).max(domain.1) + period)
    } else {
        domain
    }
}

/// Which parameter of `uv` (0 for u, 1 for v) sits on a non-periodic edge of
/// `surface`: the one closer to its bounds.
fn edge_axis(surface: &dyn ParametricSurface, uv: DVec2) -> usize {
    let gap = |x: f64, (lo, hi): (f64, f64), wraps: bool| {
        if wraps {
            f64::INFINITY
        } else {
            (x - lo).abs().min((x - hi).abs())
        }
    };
    let du = gap(uv.x, surface.domain_u(), surface.wraps_u());
    let dv = gap(uv.y, surface.domain_v(), surface.wraps_v());
    if du <= dv {
        0
    } else {
        1
    }
}

/// Parameter increment on `surface` whose image best matches the 3D step `d`:
/// the least-squares solution of `[Su Sv] x = d`.
fn tangent_step(surface: &dyn ParametricSurface, uv: DVec2, d: DVec3) -> Option<DVec2> {
    let su = surface.tangent_u(uv.x, uv.y);
    let sv = surface.tangent_v(uv.x, uv.y);
    let gram = DMat2::from_cols(
        DVec2::new(su.dot(su), su.dot(sv)),
        DVec2::new(su.dot(sv), sv.dot(sv)),
    );
    if gram.determinant().abs() < 1e-15 {
        return None;
    }
    Some(gram.inverse() * DVec2::new(su.dot(d), sv.dot(d)))
}
