//! Numeric support for the modeler: glam re-exports, parameter rectangles,
//! line clipping and a tridiagonal solver.

pub mod clip;
pub mod rect;
pub mod tridiagonal;

pub use glam::{dvec2, dvec3, dvec4, DMat2, DVec2, DVec3, DVec4, Vec4Swizzles};
pub use clip::{clip_line, ClipResult};
pub use rect::ParamRect;
pub use tridiagonal::solve_tridiagonal;

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
