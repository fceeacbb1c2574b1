//! Camera description consumed by the renderer.

pub mod camera;

pub use camera::{Camera, Projection};
#[cfg(feature = "gpu")]
pub use camera::CameraUniform;
