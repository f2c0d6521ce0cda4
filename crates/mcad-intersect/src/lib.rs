//! Surface/surface intersection: seeding, curve tracing, parameter loops and
//! trimming masks.

pub mod curve;
pub mod intersection;
pub mod loops;
pub mod minimize;
pub mod raster;
pub mod seed;
pub mod tracer;

pub use curve::IntersectionCurve;
pub use intersection::{Intersection, IntersectionPoint, IntersectionType};
pub use loops::ParameterLoop;
pub use minimize::Minimization;
pub use raster::{rasterize, TrimMasks};
pub use tracer::IntersectionTracer;
