pub mod cull_pass;
pub mod instanced_pass;

pub use cull_pass::CullPass;
pub use instanced_pass::InstancedPass;
