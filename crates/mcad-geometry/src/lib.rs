//! Modeler geometry: parametric surfaces, Bezier and B-spline utilities.

pub mod bezier;
pub mod curve;
pub mod spline;
pub mod surface;

pub use curve::{BSplineCurve, Curve, InterpolatedCurve};
pub use surface::{
    fold_parameter, BSplineSurface, BezierPatch, BezierSurface, Cursor, Cylinder,
    ParametricSurface, SurfaceKind, Torus,
};
