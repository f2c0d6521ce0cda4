//! Per-surface parameter polylines of an intersection curve, split at the seams
//! of periodic axes.

use mcad_math::{clip_line, ClipResult, DVec2, ParamRect, Point2};
use serde::{Deserialize, Serialize};

/// The trace of an intersection curve in one surface's parameter domain.
///
/// Every segment lies inside `bounds`. Consecutive segments are joined through a
/// seam: the last point of one is the clipper's exit point and the first point
/// of the next is the matching entry on the opposite edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterLoop {
    pub segments: Vec<Vec<Point2>>,
    /// The 3D curve closed on itself.
    pub closed: bool,
    pub bounds: ParamRect,
    pub wraps_u: bool,
    pub wraps_v: bool,
    /// Net number of seam crossings along u and v, signed by direction.
    pub winding: [i32; 2],
}

impl ParameterLoop {
    /// Split the folded parameter trace `points` at seam crossings.
    ///
    /// A step longer than half a period along a periodic axis is taken to have
    /// crossed the seam. For closed traces the closing edge is handled the same
    /// way and the first segment is merged onto the last, so segments always
    /// start and end at seams (or at the trace ends).
    pub fn build(
        points: &[Point2],
        closed: bool,
        bounds: ParamRect,
        wraps_u: bool,
        wraps_v: bool,
    ) -> Self {
        let mut this = Self {
            segments: Vec::new(),
            closed,
            bounds,
            wraps_u,
            wraps_v,
            winding: [0, 0],
        };
        let Some(&first) = points.first() else {
            return this;
        };

        let mut segments = vec![vec![first]];
        let mut prev = first;
        for &p in &points[1..] {
            this.push_step(&mut segments, prev, p);
            prev = p;
        }

        if closed && points.len() > 2 {
            this.push_step(&mut segments, prev, first);
            if segments.len() > 1 {
                // The last segment now ends on `first`; continue it with the
                // opening segment.
                let opening = segments.remove(0);
                if let Some(last) = segments.last_mut() {
                    last.extend(opening.into_iter().skip(1));
                }
            } else if let Some(only) = segments.first_mut() {
                only.pop();
            }
        }

        this.segments = segments;
        this
    }

    /// Period of each axis, zero on non-wrapping axes.
    fn periods(&self) -> DVec2 {
        let size = self.bounds.size();
        DVec2::new(
            if self.wraps_u { size.x } else { 0.0 },
            if self.wraps_v { size.y } else { 0.0 },
        )
    }

    /// `p` shifted by whole periods to be nearest to `from`.
    fn unwrap_towards(&self, from: Point2, p: Point2) -> (Point2, [i32; 2]) {
        let periods = self.periods();
        let mut q = p;
        let mut shift = [0, 0];
        for (axis, period) in [(0usize, periods.x), (1, periods.y)] {
            if period <= 0.0 {
                continue;
            }
            let d = q[axis] - from[axis];
            if d > 0.5 * period {
                q[axis] -= period;
                shift[axis] = -1;
            } else if d < -0.5 * period {
                q[axis] += period;
                shift[axis] = 1;
            }
        }
        (q, shift)
    }

    /// Append the step `prev -> p`, opening a new segment when it crosses a seam.
    fn push_step(&mut self, segments: &mut Vec<Vec<Point2>>, prev: Point2, p: Point2) {
        let (q, shift) = self.unwrap_towards(prev, p);
        if shift == [0, 0] {
            if let Some(current) = segments.last_mut() {
                current.push(p);
            }
            return;
        }

        // `q` can sit exactly on the far edge, where the clipper sees nothing
        // to clip.
        let clip = clip_line(prev, q, self.bounds.u_range(), self.bounds.v_range())
            .unwrap_or(ClipResult { exit: q, entry: p });
        self.winding[0] += shift[0];
        self.winding[1] += shift[1];
        if let Some(current) = segments.last_mut() {
            current.push(clip.exit);
        }
        let mut next = vec![clip.entry];
        if p != clip.entry {
            next.push(p);
        }
        segments.push(next);
    }

    /// Whether the loop bounds a region of the domain on its own: it closed and
    /// does not wind around a periodic axis.
    pub fn is_contractible(&self) -> bool {
        self.closed && self.winding == [0, 0]
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}
