use std::sync::Arc;

use wgpu::{CommandEncoder, Device, Queue, TextureView};

use crate::culling::{CullMode, GpuCuller};
use crate::graph::{FramePacket, RenderPass};
use crate::indirect::IndirectArgs;

/// Compute stage of a GPU-culled frame.
///
/// Inert unless the packet asks for [`CullMode::Gpu`]; the host paths never
/// touch the indirect buffer's counter through this pass.
pub struct CullPass {
    culler: GpuCuller,
    indirect: Arc<IndirectArgs>,
}

impl CullPass {
    pub fn new(culler: GpuCuller, indirect: Arc<IndirectArgs>) -> Self {
        Self { culler, indirect }
    }

    pub fn culler(&self) -> &GpuCuller {
        &self.culler
    }
}

impl RenderPass for CullPass {
    fn name(&self) -> &str {
        "Frustum Cull Pass"
    }

    fn prepare(&mut self, _device: &Device, queue: &Queue, packet: &FramePacket) {
        if packet.mode == CullMode::Gpu {
            self.culler.prepare(queue, &packet.frustum, packet.instance_count);
        }
    }

    fn execute(
        &mut self,
        _device: &Device,
        _queue: &Queue,
        encoder: &mut CommandEncoder,
        _color_view: &TextureView,
        _depth_view: Option<&TextureView>,
        packet: &FramePacket,
    ) {
        if packet.mode == CullMode::Gpu {
            self.culler.record(encoder, &self.indirect);
        }
    }
}
