/// Opaque instanced cube pass.
///
/// Clears color + depth, binds the scene uniform at group(0) and the
/// instance records + visible ids at group(1), then issues exactly one draw:
///
/// * [`DrawList::Host`] → ids are uploaded in `prepare`, then
///   `draw_indexed(.., 0..n)`;
/// * [`DrawList::Device`] → `draw_indexed_indirect` over the args the cull
///   pass just filled.
use std::sync::Arc;

use wgpu::{
    Color, CommandEncoder, Device, LoadOp, Operations, Queue, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, StoreOp, TextureView,
};

use crate::geometry::Mesh;
use crate::graph::{DrawList, FramePacket, RenderPass};
use crate::indirect::IndirectArgs;
use crate::pipeline::InstancedPipeline;
use crate::resources::InstanceBuffer;

pub struct InstancedPass {
    pipeline: InstancedPipeline,
    scene_bind_group: Arc<wgpu::BindGroup>,
    instances_bind_group: wgpu::BindGroup,
    mesh: Mesh,
    indirect: Arc<IndirectArgs>,
    /// Instances uploaded by the last host-side `prepare`.
    host_count: u32,
    pub clear_color: Color,
}

impl InstancedPass {
    pub fn new(
        device: &Device,
        pipeline: InstancedPipeline,
        scene_bind_group: Arc<wgpu::BindGroup>,
        instances: &InstanceBuffer,
        indirect: Arc<IndirectArgs>,
        mesh: Mesh,
    ) -> Self {
        let instances_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Instances Bind Group"),
            layout: &pipeline.layouts.instances,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: instances.instances.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: indirect.visible_ids.as_entire_binding() },
            ],
        });

        Self {
            pipeline,
            scene_bind_group,
            instances_bind_group,
            mesh,
            indirect,
            host_count: 0,
            clear_color: Color { r: 0.1, g: 0.2, b: 0.3, a: 1.0 },
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

impl RenderPass for InstancedPass {
    fn name(&self) -> &str {
        "Instanced Opaque Pass"
    }

    fn prepare(&mut self, _device: &Device, queue: &Queue, packet: &FramePacket) {
        if let DrawList::Host(ids) = &packet.draw {
            self.host_count = self.indirect.write_host(queue, ids);
        }
    }

    fn execute(
        &mut self,
        _device: &Device,
        _queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    ) {
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(self.name()),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations { load: LoadOp::Clear(self.clear_color), store: StoreOp::Store },
            })],
            depth_stencil_attachment: depth_view.map(|v| RenderPassDepthStencilAttachment {
                view: v,
                depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if let Some(vp) = &packet.viewport {
            rpass.set_viewport(vp.x as f32, vp.y as f32, vp.width as f32, vp.height as f32, 0.0, 1.0);
            rpass.set_scissor_rect(vp.x, vp.y, vp.width, vp.height);
        }

        rpass.set_pipeline(&self.pipeline.inner);
        rpass.set_bind_group(0, &*self.scene_bind_group, &[]);
        rpass.set_bind_group(1, &self.instances_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.mesh.index_buffer.slice(..), self.mesh.index_format);

        match &packet.draw {
            DrawList::Host(_) => {
                if self.host_count > 0 {
                    rpass.draw_indexed(0..self.mesh.index_count, 0, 0..self.host_count);
                }
            }
            DrawList::Device => rpass.draw_indexed_indirect(&self.indirect.args, 0),
        }
    }
}
