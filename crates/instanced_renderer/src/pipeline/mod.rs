pub mod compute;
pub mod instanced;
pub mod layout;

pub use compute::{ComputePipeline, CULL_WORKGROUP_SIZE};
pub use instanced::{InstancedPipeline, DEPTH_FORMAT};
pub use layout::PipelineLayouts;
