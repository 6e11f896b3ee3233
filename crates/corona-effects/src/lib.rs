//! Procedural sun effects: the photosphere, corona shells, coronal loops and
//! heat halo, plus the controller that animates them.

pub mod loops;
pub mod sun;

pub use loops::{LoopShape, loop_path, surface_frame};
pub use sun::SunEffects;
