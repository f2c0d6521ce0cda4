//! Closed set of surface kinds for scenes that store surfaces by value.

use mcad_math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{
    BSplineSurface, BezierPatch, BezierSurface, Cursor, Cylinder, ParametricSurface, Torus,
};

/// Any surface the intersection engine understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SurfaceKind {
    Torus(Torus),
    Cylinder(Cylinder),
    BezierPatch(BezierPatch),
    BezierSurface(BezierSurface),
    BSpline(BSplineSurface),
    Cursor(Cursor),
}

impl SurfaceKind {
    fn inner(&self) -> &dyn ParametricSurface {
        match self {
            Self::Torus(s) => s,
            Self::Cylinder(s) => s,
            Self::BezierPatch(s) => s,
            Self::BezierSurface(s) => s,
            Self::BSpline(s) => s,
            Self::Cursor(s) => s,
        }
    }
}

impl ParametricSurface for SurfaceKind {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.inner().point_at(u, v)
    }

    fn tangent_u(&self, u: f64, v: f64) -> Vector3 {
        self.inner().tangent_u(u, v)
    }

    fn tangent_v(&self, u: f64, v: f64) -> Vector3 {
        self.inner().tangent_v(u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.inner().domain_u()
    }

    fn domain_v(&self) -> (f64, f64) {
        self.inner().domain_v()
    }

    fn wraps_u(&self) -> bool {
        self.inner().wraps_u()
    }

    fn wraps_v(&self) -> bool {
        self.inner().wraps_v()
    }

    fn is_degenerate(&self) -> bool {
        self.inner().is_degenerate()
    }
}

impl From<Torus> for SurfaceKind {
    fn from(s: Torus) -> Self {
        Self::Torus(s)
    }
}

impl From<Cylinder> for SurfaceKind {
    fn from(s: Cylinder) -> Self {
        Self::Cylinder(s)
    }
}

impl From<BezierPatch> for SurfaceKind {
    fn from(s: BezierPatch) -> Self {
        Self::BezierPatch(s)
    }
}

impl From<BezierSurface> for SurfaceKind {
    fn from(s: BezierSurface) -> Self {
        Self::BezierSurface(s)
    }
}

impl From<BSplineSurface> for SurfaceKind {
    fn from(s: BSplineSurface) -> Self {
        Self::BSpline(s)
    }
}

impl From<Cursor> for SurfaceKind {
    fn from(s: Cursor) -> Self {
        Self::Cursor(s)
    }
}
