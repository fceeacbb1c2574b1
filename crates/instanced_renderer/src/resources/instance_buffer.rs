/// Storage buffers mirroring the [`InstanceStore`] on the device.
///
/// Two fixed-size arrays, both sized for `MAX_INSTANCES`:
///
/// * `instances`: one [`GpuInstance`] per slot, read by the vertex shader
///   through the visible-id indirection.
/// * `bounds`: one [`GpuAabb`] per slot, read by the cull shader.
///
/// Only the active prefix is rewritten on upload; slots past it are never
/// read because both shaders are bounded by the active count.
use std::sync::Arc;

use instanced_core::Aabb;

use crate::instances::{GpuInstance, InstanceStore, MAX_INSTANCES};
use crate::resources::buffer;

/// World-space box as the cull shader sees it (`vec4` aligned).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuAabb {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl From<&Aabb> for GpuAabb {
    fn from(b: &Aabb) -> Self {
        Self { min: b.min.extend(0.0).to_array(), max: b.max.extend(0.0).to_array() }
    }
}

pub struct InstanceBuffer {
    pub instances: Arc<wgpu::Buffer>,
    pub bounds: Arc<wgpu::Buffer>,
    uploaded: usize,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device) -> Self {
        let instances = buffer::create_storage_zeroed(
            device,
            "Instance Buffer",
            (MAX_INSTANCES * std::mem::size_of::<GpuInstance>()) as wgpu::BufferAddress,
            wgpu::BufferUsages::empty(),
        );
        let bounds = buffer::create_storage_zeroed(
            device,
            "Instance Bounds Buffer",
            (MAX_INSTANCES * std::mem::size_of::<GpuAabb>()) as wgpu::BufferAddress,
            wgpu::BufferUsages::empty(),
        );
        Self { instances, bounds, uploaded: 0 }
    }

    /// Writes the active instances and their world bounds.
    pub fn upload(&mut self, queue: &wgpu::Queue, store: &InstanceStore) {
        debug_assert!(store.len() <= MAX_INSTANCES);
        let bounds: Vec<GpuAabb> = store.bounds().iter().map(GpuAabb::from).collect();
        buffer::update_slice(queue, &self.instances, 0, &store.gpu_instances());
        buffer::update_slice(queue, &self.bounds, 0, &bounds);
        self.uploaded = store.len();
    }

    /// Active count at the last upload.
    pub fn uploaded(&self) -> usize {
        self.uploaded
    }
}
