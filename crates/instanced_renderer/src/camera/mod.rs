//! Camera-facing GPU state.  The orbit camera itself lives in
//! `instanced_core::scene`.

pub mod uniform;

pub use instanced_core::scene::{Camera, Projection};
pub use uniform::{GpuScene, Lighting, SceneUniform};
