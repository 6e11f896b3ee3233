//! CPU-side geometry for the sun layers: UV spheres, Catmull-Rom paths, and
//! tubes swept along them.

pub mod curve;
pub mod geometry;
pub mod sphere;
pub mod tube;

pub use curve::{CatmullRomCurve3, Curve, FrenetFrames};
pub use geometry::Geometry;
pub use sphere::sphere_geometry;
pub use tube::tube_geometry;
