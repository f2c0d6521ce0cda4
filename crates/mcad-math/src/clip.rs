//! Cohen–Sutherland clipping of parameter-space segments.
//!
//! Used when a traced parameter polyline leaves a surface's domain: the exit
//! point lies on the crossed edge and, for periodic axes, the entry point is the
//! same location on the opposite edge.

use serde::{Deserialize, Serialize};

use crate::{ParamRect, Point2};

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

/// Relative distance under which a clipped coordinate is snapped onto an edge.
const SNAP: f64 = 1e-12;

/// Where a segment leaves the rectangle and where it re-enters after wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipResult {
    /// Point on the crossed edge.
    pub exit: Point2,
    /// `exit` moved to the opposite edge along every crossed axis.
    pub entry: Point2,
}

fn region_code(p: Point2, rect: &ParamRect) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.min.x {
        code |= LEFT;
    } else if p.x > rect.max.x {
        code |= RIGHT;
    }
    if p.y < rect.min.y {
        code |= BOTTOM;
    } else if p.y > rect.max.y {
        code |= TOP;
    }
    code
}

/// Move the outside endpoint `p` towards `other` onto the edge named by `code`.
fn clip_to_edge(p: Point2, other: Point2, code: u8, rect: &ParamRect) -> Point2 {
    let d = other - p;
    let mut q = if code & TOP != 0 {
        Point2::new(p.x + d.x * (rect.max.y - p.y) / d.y, rect.max.y)
    } else if code & BOTTOM != 0 {
        Point2::new(p.x + d.x * (rect.min.y - p.y) / d.y, rect.min.y)
    } else if code & RIGHT != 0 {
        Point2::new(rect.max.x, p.y + d.y * (rect.max.x - p.x) / d.x)
    } else {
        Point2::new(rect.min.x, p.y + d.y * (rect.min.x - p.x) / d.x)
    };
    // Keep rounding from pushing the point back outside or just off a corner.
    q = rect.clamp(q);
    let eps = SNAP * rect.size();
    for (value, lo, hi, e) in [
        (&mut q.x, rect.min.x, rect.max.x, eps.x),
        (&mut q.y, rect.min.y, rect.max.y, eps.y),
    ] {
        if (*value - lo).abs() <= e {
            *value = lo;
        } else if (*value - hi).abs() <= e {
            *value = hi;
        }
    }
    q
}

/// Clip the segment `p0 -> p1` against the rectangle spanned by `u_bounds` and `v_bounds`.
///
/// Returns `None` when `p1` is already inside (nothing to clip) or when the
/// segment misses the rectangle entirely. Otherwise the result holds the
/// point where the segment leaves the rectangle and the wrap-around entry point
/// on the opposite edge.
pub fn clip_line(
    p0: Point2,
    p1: Point2,
    u_bounds: (f64, f64),
    v_bounds: (f64, f64),
) -> Option<ClipResult> {
    let rect = ParamRect::from_ranges(u_bounds, v_bounds);
    let mut a = p0;
    let mut b = p1;
    let mut code_a = region_code(a, &rect);
    let mut code_b = region_code(b, &rect);

    if code_b == INSIDE {
        return None;
    }

    loop {
        if code_a | code_b == INSIDE {
            break;
        }
        if code_a & code_b != INSIDE {
            return None;
        }
        if code_b != INSIDE {
            b = clip_to_edge(b, a, code_b, &rect);
            code_b = region_code(b, &rect);
        } else {
            a = clip_to_edge(a, b, code_a, &rect);
            code_a = region_code(a, &rect);
        }
    }

    let mut entry = b;
    if p1.x > rect.max.x && b.x == rect.max.x {
        entry.x = rect.min.x;
    } else if p1.x < rect.min.x && b.x == rect.min.x {
        entry.x = rect.max.x;
    }
    if p1.y > rect.max.y && b.y == rect.max.y {
        entry.y = rect.min.y;
    } else if p1.y < rect.min.y && b.y == rect.min.y {
        entry.y = rect.max.y;
    }

    Some(ClipResult { exit: b, entry })
}
