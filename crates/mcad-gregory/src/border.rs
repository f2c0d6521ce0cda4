//! Which edge of a bicubic patch borders the hole.

use mcad_core::{McadError, Result};
use mcad_geometry::BezierPatch;
use mcad_math::Point3;
use serde::{Deserialize, Serialize};

/// One of the four edges of a patch's control net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Border {
    /// Column `i = 0`.
    UMin,
    /// Column `i = 3`.
    UMax,
    /// Row `j = 0`.
    VMin,
    /// Row `j = 3`.
    VMax,
}

impl Border {
    pub const ALL: [Border; 4] = [Border::UMin, Border::UMax, Border::VMin, Border::VMax];

    /// Control point `k` along this edge, `depth` rows in from it.
    fn point(self, patch: &BezierPatch, k: usize, depth: usize) -> Point3 {
        match self {
            Border::UMin => patch.points[depth][k],
            Border::UMax => patch.points[3 - depth][k],
            Border::VMin => patch.points[k][depth],
            Border::VMax => patch.points[k][3 - depth],
        }
    }

    /// End points of the edge in index order.
    fn ends(self, patch: &BezierPatch) -> (Point3, Point3) {
        (self.point(patch, 0, 0), self.point(patch, 3, 0))
    }
}

/// A patch edge together with its direction: `reversed` edges are read from
/// index 3 down to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderEdge {
    pub border: Border,
    pub reversed: bool,
}

impl BorderEdge {
    /// The edge of `patch` running from corner `start` to corner `end`.
    ///
    /// Corners are compared exactly; neighbouring patches are expected to share
    /// the very same corner points. Fails when no edge connects the two.
    pub fn find(patch: &BezierPatch, start: Point3, end: Point3) -> Result<Self> {
        for border in Border::ALL {
            let (a, b) = border.ends(patch);
            if a == start && b == end {
                return Ok(Self {
                    border,
                    reversed: false,
                });
            }
            if a == end && b == start {
                return Ok(Self {
                    border,
                    reversed: true,
                });
            }
        }
        Err(McadError::Geometry(format!(
            "no patch edge runs from {start} to {end}"
        )))
    }

    /// Control points `depth` rows in from the edge, in edge direction.
    /// Depth 0 is the edge itself.
    pub fn row(&self, patch: &BezierPatch, depth: usize) -> [Point3; 4] {
        let mut row = [Point3::ZERO; 4];
        for (k, p) in row.iter_mut().enumerate() {
            let index = if self.reversed { 3 - k } else { k };
            *p = self.border.point(patch, index, depth);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcad_math::DVec3;

    fn patch() -> BezierPatch {
        let mut points = [[DVec3::ZERO; 4]; 4];
        for (i, column) in points.iter_mut().enumerate() {
            for (j, p) in column.iter_mut().enumerate() {
                *p = DVec3::new(i as f64, j as f64, (i * j) as f64 * 0.1);
            }
        }
        BezierPatch::new(points)
    }

    #[test]
    fn test_finds_edges_in_both_directions() {
        let p = patch();
        let [c00, c30, c03, c33] = p.corners();

        let e = BorderEdge::find(&p, c00, c30).unwrap();
        assert_eq!(e.border, Border::VMin);
        assert!(!e.reversed);

        let e = BorderEdge::find(&p, c33, c03).unwrap();
        assert_eq!(e.border, Border::VMax);
        assert!(e.reversed);

        let e = BorderEdge::find(&p, c03, c00).unwrap();
        assert_eq!(e.border, Border::UMin);
        assert!(e.reversed);
    }

    #[test]
    fn test_rows_follow_edge_direction() {
        let p = patch();
        let [_, c30, _, c33] = p.corners();
        let e = BorderEdge::find(&p, c33, c30).unwrap();
        assert_eq!(e.border, Border::UMax);
        let edge = e.row(&p, 0);
        assert_eq!(edge[0], c33);
        assert_eq!(edge[3], c30);
        let inner = e.row(&p, 1);
        assert_eq!(inner[0], p.points[2][3]);
        assert_eq!(inner[3], p.points[2][0]);
    }

    #[test]
    fn test_diagonal_corners_are_rejected() {
        let p = patch();
        let [c00, _, _, c33] = p.corners();
        assert!(matches!(
            BorderEdge::find(&p, c00, c33),
            Err(McadError::Geometry(_))
        ));
        assert!(BorderEdge::find(&p, c00, DVec3::splat(7.0)).is_err());
    }
}
