//! CPU-side instance data: records, the slot factory and the fixed-capacity
//! store the culling paths read from.

pub mod factory;
pub mod record;
pub mod store;

pub use factory::InstanceFactory;
pub use record::{GpuInstance, Instance, Material, ROTATION_EPSILON};
pub use store::{InstanceStore, MAX_INSTANCES};
