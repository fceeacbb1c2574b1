// instanced_core: bounding volumes, frustum math, camera and GPU context

pub mod bounds;
pub mod frustum;
pub mod scene;
pub mod time;

#[cfg(feature = "gpu")]
pub mod context;

pub use bounds::Aabb;
pub use frustum::{Frustum, Plane};
pub use scene::{Camera, Projection};
pub use time::{Time, TimeClock};

#[cfg(feature = "gpu")]
pub use context::{ContextError, EngineContext};
#[cfg(feature = "gpu")]
pub use scene::CameraUniform;

pub use glam;
