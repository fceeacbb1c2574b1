/// Compute-shader frustum culling.
///
/// Per frame, recorded into the frame's encoder in this order:
///
/// 1. `args` ← `template` (instance count back to zero),
/// 2. one dispatch of `ceil(n / 64)` workgroups over the world bounds.
///
/// Each invocation runs the positive-vertex test and, on success, reserves a
/// slot with `atomicAdd(&args.instance_count, 1)` and writes its index into
/// `visible_ids[slot]`.  The resulting set matches [`super::cpu::cull`]; the
/// order does not.
use std::sync::Arc;

use instanced_core::Frustum;

use crate::indirect::IndirectArgs;
use crate::instances::MAX_INSTANCES;
use crate::pipeline::{ComputePipeline, PipelineLayouts};
use crate::resources::{buffer, InstanceBuffer};

/// Uniform block of `cull.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullParams {
    pub planes: [[f32; 4]; 6],
    /// x: active instance count.
    pub counts: [u32; 4],
}

impl CullParams {
    /// Parameters for `instance_count` boxes, clamped to `MAX_INSTANCES`.
    pub fn new(frustum: &Frustum, instance_count: u32) -> Self {
        Self {
            planes: frustum.to_gpu_planes(),
            counts: [instance_count.min(MAX_INSTANCES as u32), 0, 0, 0],
        }
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.counts[0]
    }
}

pub struct GpuCuller {
    pipeline: ComputePipeline,
    params: CullParams,
    params_buffer: Arc<wgpu::Buffer>,
    bind_group: wgpu::BindGroup,
}

impl GpuCuller {
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        instances: &InstanceBuffer,
        indirect: &IndirectArgs,
    ) -> Self {
        let pipeline = ComputePipeline::cull(device, &layouts.cull);
        let params = CullParams::new(&Frustum::from_view_proj(&glam::Mat4::IDENTITY), 0);
        let params_buffer = buffer::create_uniform(device, "Cull Params", &params);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cull Bind Group"),
            layout: &layouts.cull,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: instances.bounds.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: indirect.args.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: indirect.visible_ids.as_entire_binding() },
            ],
        });

        Self { pipeline, params, params_buffer, bind_group }
    }

    /// Uploads this frame's planes and instance count.
    pub fn prepare(&mut self, queue: &wgpu::Queue, frustum: &Frustum, instance_count: u32) {
        self.params = CullParams::new(frustum, instance_count);
        buffer::update_uniform(queue, &self.params_buffer, &self.params);
    }

    pub fn params(&self) -> &CullParams {
        &self.params
    }

    /// Records the args reset and the cull dispatch.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, indirect: &IndirectArgs) {
        indirect.record_reset(encoder);

        let groups = self.pipeline.workgroups_for(self.params.instance_count());
        if groups == 0 {
            return;
        }

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Frustum Cull Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline.inner);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(groups, 1, 1);
    }
}
