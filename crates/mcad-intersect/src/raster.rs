//! Scanline rasterization of parameter loops into trimming masks.

use mcad_core::{McadError, Result};
use mcad_math::{dvec2, DVec2, ParamRect, Point2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::loops::ParameterLoop;

/// Two square masks over a surface's normalized domain, row-major with rows
/// along v. A value of 1 marks a pixel inside the trimmed region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimMasks {
    pub resolution: usize,
    pub inside: Vec<u8>,
    /// `inside` plus every pixel the trimming curve passes through.
    pub with_boundary: Vec<u8>,
}

impl TrimMasks {
    fn index(&self, u: f64, v: f64) -> usize {
        let res = self.resolution;
        let cell = |t: f64| ((t * res as f64).floor().max(0.0) as usize).min(res - 1);
        cell(v) * res + cell(u)
    }

    /// Whether the normalized parameter `(u, v)` lies inside.
    pub fn inside_at(&self, u: f64, v: f64) -> bool {
        self.inside[self.index(u, v)] != 0
    }

    pub fn boundary_at(&self, u: f64, v: f64) -> bool {
        self.with_boundary[self.index(u, v)] != 0
    }

    /// Fraction of pixels inside.
    pub fn coverage(&self) -> f64 {
        let count = self.inside.iter().filter(|&&b| b != 0).count();
        count as f64 / self.inside.len() as f64
    }
}

/// Rasterize `loops` (all on the same surface) at `resolution x resolution`.
///
/// Each loop is stitched back into one continuous polygon in unwrapped,
/// normalized coordinates and closed as follows:
/// * a contractible loop closes on itself,
/// * a loop winding around u closes along `v = 0`, one winding around v along
///   `u = 0`,
/// * an open trace closes counter-clockwise along the domain rectangle.
///
/// Scanlines use the even-odd rule. On periodic axes the polygon is also
/// sampled one period up and down, so regions straddling a seam fill on both
/// sides.
#[instrument(skip(loops))]
pub fn rasterize<'a>(
    loops: impl IntoIterator<Item = &'a ParameterLoop>,
    resolution: usize,
) -> Result<TrimMasks> {
    if resolution == 0 {
        return Err(McadError::InvalidOperation("trim resolution must be positive".into()));
    }
    let loops: Vec<&ParameterLoop> = loops.into_iter().collect();
    let wraps_u = loops.iter().any(|l| l.wraps_u);
    let wraps_v = loops.iter().any(|l| l.wraps_v);

    let mut edges = Vec::new();
    for l in &loops {
        let polygon = outline(l);
        if polygon.len() < 3 {
            continue;
        }
        for i in 0..polygon.len() {
            edges.push((polygon[i], polygon[(i + 1) % polygon.len()]));
        }
    }
    debug!(loops = loops.len(), edges = edges.len(), "rasterizing");

    let shifts_u: &[f64] = if wraps_u { &[0.0, -1.0, 1.0] } else { &[0.0] };
    let shifts_v: &[f64] = if wraps_v { &[0.0, -1.0, 1.0] } else { &[0.0] };

    let mut inside = vec![0u8; resolution * resolution];
    inside
        .par_chunks_mut(resolution)
        .enumerate()
        .for_each(|(row, line)| {
            let y = (row as f64 + 0.5) / resolution as f64;
            let mut xs = Vec::new();
            for &dy in shifts_v {
                crossings(&edges, y + dy, &mut xs);
                for span in xs.chunks_exact(2) {
                    for &dx in shifts_u {
                        fill_span(line, span[0] + dx, span[1] + dx);
                    }
                }
            }
        });

    let mut with_boundary = inside.clone();
    for l in &loops {
        for segment in &l.segments {
            let pts: Vec<Point2> = segment.iter().map(|&p| l.bounds.normalize(p)).collect();
            for pair in pts.windows(2) {
                mark_edge(&mut with_boundary, resolution, pair[0], pair[1]);
            }
            if let [only] = pts.as_slice() {
                mark_edge(&mut with_boundary, resolution, *only, *only);
            }
        }
    }

    Ok(TrimMasks {
        resolution,
        inside,
        with_boundary,
    })
}

/// X coordinates where the horizontal line at `y` crosses `edges`, sorted.
/// Half-open in y so shared vertices count once.
fn crossings(edges: &[(Point2, Point2)], y: f64, xs: &mut Vec<f64>) {
    xs.clear();
    for &(a, b) in edges {
        if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
            xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
        }
    }
    xs.sort_by(|p, q| p.total_cmp(q));
}

/// Set pixels of one row whose centres lie in `[lo, hi)`.
fn fill_span(line: &mut [u8], lo: f64, hi: f64) {
    let res = line.len() as f64;
    let first = (lo * res - 0.5).ceil().max(0.0);
    let last = (hi * res - 0.5).ceil().min(res);
    if first >= last {
        return;
    }
    for px in &mut line[first as usize..last as usize] {
        *px = 1;
    }
}

fn mark_edge(mask: &mut [u8], resolution: usize, a: Point2, b: Point2) {
    let res = resolution as f64;
    let samples = ((b - a).length() * res * 2.0).ceil().max(1.0) as usize;
    let cell = |t: f64| ((t * res).floor().max(0.0) as usize).min(resolution - 1);
    for i in 0..=samples {
        let p = a.lerp(b, i as f64 / samples as f64);
        mask[cell(p.y) * resolution + cell(p.x)] = 1;
    }
}

/// One closed polygon in normalized, unwrapped coordinates.
fn outline(l: &ParameterLoop) -> Vec<Point2> {
    let mut polygon: Vec<Point2> = Vec::new();
    let mut offset = DVec2::ZERO;
    for segment in &l.segments {
        let mut pts = segment.iter().map(|&p| l.bounds.normalize(p));
        let Some(first) = pts.next() else {
            continue;
        };
        if let Some(&last) = polygon.last() {
            // The segment starts on the opposite edge of where the previous
            // one left; shift it by the whole periods in between.
            offset += (last - (first + offset)).round();
        }
        polygon.push(first + offset);
        polygon.extend(pts.map(|p| p + offset));
    }
    let (Some(&a), Some(&b)) = (polygon.first(), polygon.last()) else {
        return polygon;
    };

    if l.closed {
        if l.winding[0] != 0 {
            polygon.extend([dvec2(b.x, 0.0), dvec2(a.x, 0.0)]);
        } else if l.winding[1] != 0 {
            polygon.extend([dvec2(0.0, b.y), dvec2(0.0, a.y)]);
        }
    } else {
        polygon.extend(boundary_walk(a, b));
    }
    polygon
}

/// Corners met walking counter-clockwise from `b` to `a` around the unit
/// square grown to contain both.
fn boundary_walk(a: Point2, b: Point2) -> Vec<Point2> {
    let rect = ParamRect::unit().include(a).include(b);
    let (w, h) = (rect.size().x, rect.size().y);
    let perimeter = 2.0 * (w + h);
    let corners = [
        (w, dvec2(rect.max.x, rect.min.y)),
        (w + h, rect.max),
        (2.0 * w + h, dvec2(rect.min.x, rect.max.y)),
        (perimeter, rect.min),
    ];

    let start = perimeter_position(&rect, b);
    let mut end = perimeter_position(&rect, a);
    if end < start {
        end += perimeter;
    }
    let mut out = Vec::new();
    for lap in [0.0, perimeter] {
        for &(s, corner) in &corners {
            let s = s + lap;
            if s > start && s < end {
                out.push(corner);
            }
        }
    }
    out
}

/// Arc-length position of `p` (projected onto the nearest edge) along the
/// rectangle boundary, counter-clockwise from the minimum corner.
fn perimeter_position(rect: &ParamRect, p: Point2) -> f64 {
    let (w, h) = (rect.size().x, rect.size().y);
    let distances = [
        p.y - rect.min.y,
        rect.max.x - p.x,
        rect.max.y - p.y,
        p.x - rect.min.x,
    ];
    let edge = (0..4)
        .min_by(|&i, &j| distances[i].total_cmp(&distances[j]))
        .unwrap_or(0);
    match edge {
        0 => p.x - rect.min.x,
        1 => w + (p.y - rect.min.y),
        2 => w + h + (rect.max.x - p.x),
        _ => 2.0 * w + h + (rect.max.y - p.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(center: Point2, radius: f64, n: usize) -> Vec<Point2> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                let p = center + radius * dvec2(a.cos(), a.sin());
                dvec2(p.x.rem_euclid(1.0), p.y.rem_euclid(1.0))
            })
            .collect()
    }

    #[test]
    fn test_circle_area() {
        let l = ParameterLoop::build(
            &circle(dvec2(0.5, 0.5), 0.25, 400),
            true,
            ParamRect::unit(),
            false,
            false,
        );
        let masks = rasterize([&l], 256).unwrap();
        let expected = std::f64::consts::PI * 0.0625;
        assert_relative_eq!(masks.coverage(), expected, max_relative = 0.01);
        assert!(masks.inside_at(0.5, 0.5));
        assert!(!masks.inside_at(0.1, 0.1));
    }

    #[test]
    fn test_rasterizing_twice_is_identical() {
        let l = ParameterLoop::build(
            &circle(dvec2(0.3, 0.6), 0.2, 100),
            true,
            ParamRect::unit(),
            true,
            true,
        );
        let a = rasterize([&l], 128).unwrap();
        let b = rasterize([&l], 128).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_region_across_seam_fills_both_sides() {
        let l = ParameterLoop::build(
            &circle(dvec2(0.95, 0.5), 0.2, 200),
            true,
            ParamRect::unit(),
            true,
            false,
        );
        let masks = rasterize([&l], 200).unwrap();
        assert!(masks.inside_at(0.05, 0.5));
        assert!(masks.inside_at(0.9, 0.5));
        assert!(!masks.inside_at(0.5, 0.5));
        assert_relative_eq!(masks.coverage(), std::f64::consts::PI * 0.04, max_relative = 0.02);
    }

    #[test]
    fn test_winding_loop_closes_along_bottom_edge() {
        let pts: Vec<_> = (0..50).map(|i| dvec2(i as f64 / 50.0, 0.3)).collect();
        let l = ParameterLoop::build(&pts, true, ParamRect::unit(), true, false);
        let masks = rasterize([&l], 100).unwrap();
        assert!(masks.inside_at(0.5, 0.1));
        assert!(!masks.inside_at(0.5, 0.6));
        assert_relative_eq!(masks.coverage(), 0.3, max_relative = 0.02);
    }

    #[test]
    fn test_open_trace_closes_along_domain_edge() {
        let pts = vec![dvec2(0.0, 0.2), dvec2(0.5, 0.45), dvec2(1.0, 0.7)];
        let l = ParameterLoop::build(&pts, false, ParamRect::unit(), false, false);
        let masks = rasterize([&l], 100).unwrap();
        assert!(masks.inside_at(0.5, 0.9));
        assert!(!masks.inside_at(0.5, 0.1));
        assert_relative_eq!(masks.coverage(), 0.55, max_relative = 0.02);
    }

    #[test]
    fn test_boundary_mask_covers_curve() {
        let l = ParameterLoop::build(
            &circle(dvec2(0.5, 0.5), 0.25, 400),
            true,
            ParamRect::unit(),
            false,
            false,
        );
        let masks = rasterize([&l], 128).unwrap();
        assert!(masks.boundary_at(0.75, 0.5));
        assert!(masks.boundary_at(0.5, 0.25));
        assert!(masks
            .inside
            .iter()
            .zip(&masks.with_boundary)
            .all(|(&i, &b)| b >= i));
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let l = ParameterLoop::build(&[], false, ParamRect::unit(), false, false);
        assert!(rasterize([&l], 0).is_err());
    }

    #[test]
    fn test_boundary_walk_turns_counter_clockwise() {
        let corners = boundary_walk(dvec2(0.0, 0.2), dvec2(1.0, 0.7));
        assert_eq!(corners, vec![dvec2(1.0, 1.0), dvec2(0.0, 1.0)]);
    }
}
