//! Gregory-patch filling of triangular holes between three bicubic Bezier
//! patches, G1 across the curves that split the hole.

pub mod border;
pub mod filler;
pub mod filling;
pub mod points;

pub use border::{Border, BorderEdge};
pub use filler::{Fill, GregoryFiller};
pub use filling::{BoundaryCurve, FillingData};
pub use points::GregoryPoints;
