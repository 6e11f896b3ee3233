//! The Corona viewer: window, frame loop and screenshot output.

pub mod game_loop;
pub mod platform;
pub mod screenshot;
pub mod window;

pub use window::{AppError, run};
