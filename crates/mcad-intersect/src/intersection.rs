//! Result types of an intersection trace.

use mcad_geometry::InterpolatedCurve;
use mcad_math::{DVec4, Point3, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use crate::loops::ParameterLoop;

/// One traced point: packed parameters `(u1, v1, u2, v2)` and the 3D location
/// on the first surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionPoint {
    pub coords: DVec4,
    pub location: Point3,
}

impl IntersectionPoint {
    pub fn first_params(&self) -> mcad_math::Point2 {
        self.coords.xy()
    }

    pub fn second_params(&self) -> mcad_math::Point2 {
        self.coords.zw()
    }
}

/// Whether the curve bounds a region in each surface's domain, first surface
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntersectionType {
    OpenOpen,
    ClosedOpen,
    OpenClosed,
    ClosedClosed,
}

impl IntersectionType {
    pub fn from_flags(first_closed: bool, second_closed: bool) -> Self {
        match (first_closed, second_closed) {
            (false, false) => Self::OpenOpen,
            (true, false) => Self::ClosedOpen,
            (false, true) => Self::OpenClosed,
            (true, true) => Self::ClosedClosed,
        }
    }

    pub fn first_closed(self) -> bool {
        matches!(self, Self::ClosedOpen | Self::ClosedClosed)
    }

    pub fn second_closed(self) -> bool {
        matches!(self, Self::OpenClosed | Self::ClosedClosed)
    }
}

/// A traced intersection curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intersection {
    pub points: Vec<IntersectionPoint>,
    /// Parameter loops on the first and second surface.
    pub loops: [ParameterLoop; 2],
    pub kind: IntersectionType,
    /// The 3D curve closed on itself.
    pub closed: bool,
    /// False when a Newton correction failed or the point cap was reached.
    pub converged: bool,
}

impl Intersection {
    /// Polyline length, including the closing edge of closed curves.
    pub fn length(&self) -> f64 {
        let open: f64 = self
            .points
            .windows(2)
            .map(|w| w[0].location.distance(w[1].location))
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(a), Some(b)) => open + a.location.distance(b.location),
            _ => open,
        }
    }

    /// The 3D points as an interpolating spline, closing it when the curve
    /// closed.
    pub fn to_interpolated_curve(&self) -> InterpolatedCurve {
        let mut knots: Vec<Point3> = self.points.iter().map(|p| p.location).collect();
        if self.closed {
            if let Some(&first) = knots.first() {
                knots.push(first);
            }
        }
        InterpolatedCurve::new(knots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_flags_roundtrip() {
        for a in [false, true] {
            for b in [false, true] {
                let t = IntersectionType::from_flags(a, b);
                assert_eq!(t.first_closed(), a);
                assert_eq!(t.second_closed(), b);
            }
        }
    }
}
