//! G1 filling of a triangular hole enclosed by three bicubic patches.

use mcad_core::Result;
use mcad_geometry::bezier::split_half;
use mcad_geometry::BezierPatch;
use mcad_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::border::BorderEdge;
use crate::filling::{d_field, g_field, BoundaryCurve, FillingData};
use crate::points::GregoryPoints;

/// The three pie slices of the hole, named by the patches they join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fill {
    B12,
    B23,
    B31,
}

impl Fill {
    pub const ALL: [Fill; 3] = [Fill::B12, Fill::B23, Fill::B31];

    fn index(self) -> usize {
        match self {
            Fill::B12 => 0,
            Fill::B23 => 1,
            Fill::B31 => 2,
        }
    }
}

/// One patch's side of the hole, split at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Side {
    edge: BorderEdge,
    /// Edge half and the row behind it, from the midpoint to the start corner.
    to_start: [[Point3; 4]; 2],
    /// Same towards the end corner.
    to_end: [[Point3; 4]; 2],
    curve: BoundaryCurve,
}

/// Fills the hole between patches `b1`, `b2`, `b3` meeting pairwise at the
/// corners `p12`, `p23`, `p31`.
///
/// Patch `b1` borders the hole along its edge from `p31` to `p12`, `b2` from
/// `p12` to `p23` and `b3` from `p23` to `p31`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GregoryFiller {
    patches: [BezierPatch; 3],
    corners: [Point3; 3],
    sides: [Side; 3],
    center: Point3,
}

impl GregoryFiller {
    /// Locate each patch's edge on the hole and build the three boundary
    /// curves with their common centre.
    ///
    /// Fails with a geometry error when a patch has no edge joining its two
    /// corners.
    #[instrument(skip_all)]
    pub fn new(
        b1: BezierPatch,
        b2: BezierPatch,
        b3: BezierPatch,
        corners: [Point3; 3],
    ) -> Result<Self> {
        let patches = [b1, b2, b3];
        let mut edges = Vec::with_capacity(3);
        for (k, patch) in patches.iter().enumerate() {
            let start = corners[(k + 2) % 3];
            let end = corners[k];
            let edge = BorderEdge::find(patch, start, end)?;
            debug!(patch = k + 1, ?edge, "hole edge");
            edges.push(edge);
        }

        // Edge midpoints, their continuation across the edge and the virtual
        // corners those tangents point at.
        let mut halves = Vec::with_capacity(3);
        let mut virtual_corners = [Point3::ZERO; 3];
        for (k, (patch, edge)) in patches.iter().zip(&edges).enumerate() {
            let (edge_first, edge_second) = split_half(&edge.row(patch, 0));
            let (inner_first, inner_second) = split_half(&edge.row(patch, 1));
            let mid = edge_first[3];
            let across = mid * 2.0 - inner_first[3];
            virtual_corners[k] = (across * 3.0 - mid) * 0.5;
            halves.push((edge_first, edge_second, inner_first, inner_second, mid, across));
        }
        let center = (virtual_corners[0] + virtual_corners[1] + virtual_corners[2]) / 3.0;
        debug!(?center, "hole centre");

        let mut sides = Vec::with_capacity(3);
        for (k, (edge_first, edge_second, inner_first, inner_second, mid, across)) in
            halves.into_iter().enumerate()
        {
            sides.push(Side {
                edge: edges[k],
                to_start: [reversed(edge_first), reversed(inner_first)],
                to_end: [edge_second, inner_second],
                curve: BoundaryCurve {
                    bottom: mid,
                    second: across,
                    third: (virtual_corners[k] * 2.0 + center) / 3.0,
                    fourth: center,
                },
            });
        }

        Ok(Self {
            patches,
            corners,
            sides: [sides[0], sides[1], sides[2]],
            center,
        })
    }

    pub fn patches(&self) -> &[BezierPatch; 3] {
        &self.patches
    }

    pub fn corners(&self) -> [Point3; 3] {
        self.corners
    }

    /// The point where the three boundary curves meet.
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Boundary curves of `b1`, `b2`, `b3`.
    pub fn boundary_curves(&self) -> [BoundaryCurve; 3] {
        [self.sides[0].curve, self.sides[1].curve, self.sides[2].curve]
    }

    /// Edges of `b1`, `b2`, `b3` lying on the hole.
    pub fn edges(&self) -> [BorderEdge; 3] {
        [self.sides[0].edge, self.sides[1].edge, self.sides[2].edge]
    }

    /// Boundary data, tangent fields and Gregory net of one slice.
    ///
    /// The slice between patches `a` and `b` (`b1` and `b2` for
    /// [`Fill::B12`]) is parametrized with the hole centre at `(0, 0)`, the
    /// shared corner at `(1, 1)`, the boundary curve of `a` along `v = 0` and
    /// that of `b` along `u = 0`. Its `u = 1` side is the half of `a`'s edge,
    /// its `v = 1` side the half of `b`'s edge.
    pub fn filling_data(&self, fill: Fill) -> FillingData {
        let k = fill.index();
        let (a, b, other) = (&self.sides[k], &self.sides[(k + 1) % 3], &self.sides[(k + 2) % 3]);
        let [edge_a, inner_a] = a.to_end;
        let [edge_b, inner_b] = b.to_start;

        let tangent = |s: &Side| s.curve.center_tangent();
        let g_a = g_field(
            (tangent(b) - tangent(other)) * 0.5,
            (edge_a[1] - edge_a[0]) * 3.0,
        );
        let g_b = g_field(
            (tangent(a) - tangent(other)) * 0.5,
            (edge_b[1] - edge_b[0]) * 3.0,
        );
        let c_a = a.curve.derivative();
        let c_b = b.curve.derivative();
        let d_a = d_field(&g_a, &c_a);
        let d_b = d_field(&g_b, &c_b);

        let curve_a = a.curve.from_center();
        let curve_b = b.curve.from_center();
        let mut boundary = [[Point3::ZERO; 4]; 4];
        for t in 0..4 {
            boundary[t][0] = curve_a[t];
            boundary[0][t] = curve_b[t];
            boundary[3][t] = edge_a[t];
            boundary[t][3] = edge_b[t];
        }

        let across = |edge: &[Point3; 4], inner: &[Point3; 4], t: usize| edge[t] * 2.0 - inner[t];
        let step = |p: Point3, d: Vector3| p + d / 3.0;
        let gregory = GregoryPoints {
            boundary,
            along_u: [
                step(curve_a[1], d_a[1]),
                step(curve_a[2], d_a[2]),
                across(&edge_b, &inner_b, 1),
                across(&edge_b, &inner_b, 2),
            ],
            along_v: [
                step(curve_b[1], d_b[1]),
                across(&edge_a, &inner_a, 1),
                step(curve_b[2], d_b[2]),
                across(&edge_a, &inner_a, 2),
            ],
        };

        FillingData {
            boundary: [a.curve, b.curve],
            edges: [edge_a, edge_b],
            g_field: [g_a, g_b],
            c_field: [c_a, c_b],
            d_field: [d_a, d_b],
            gregory,
        }
    }

    /// All three slices, in the order `B12`, `B23`, `B31`.
    #[instrument(skip(self))]
    pub fn fill_hole(&self) -> [FillingData; 3] {
        Fill::ALL.map(|fill| self.filling_data(fill))
    }
}

fn reversed(mut cp: [Point3; 4]) -> [Point3; 4] {
    cp.reverse();
    cp
}
