/// Shared `wgpu::BindGroupLayout` objects for the two built-in pipelines.
/// Centralising them here means the passes that create bind groups and the
/// pipelines that consume them can never disagree on a binding.
use std::sync::Arc;

/// All bind-group layouts used by the built-in pipelines.
#[derive(Clone)]
pub struct PipelineLayouts {
    /// group(0) of the draw pipeline: scene uniform (camera + light).
    pub scene: Arc<wgpu::BindGroupLayout>,
    /// group(1) of the draw pipeline: instance records and visible ids,
    /// both read-only storage.
    pub instances: Arc<wgpu::BindGroupLayout>,
    /// group(0) of the cull pipeline: params uniform, world bounds,
    /// indirect args (atomic) and visible ids (write).
    pub cull: Arc<wgpu::BindGroupLayout>,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let vf = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let vs = wgpu::ShaderStages::VERTEX;
        let cs = wgpu::ShaderStages::COMPUTE;

        let scene = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layout: Scene"),
            entries: &[uniform_entry(0, vf)],
        }));

        let instances = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layout: Instances"),
            entries: &[storage_entry(0, vs, true), storage_entry(1, vs, true)],
        }));

        let cull = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layout: Cull"),
            entries: &[
                uniform_entry(0, cs),
                storage_entry(1, cs, true),
                storage_entry(2, cs, false),
                storage_entry(3, cs, false),
            ],
        }));

        Self { scene, instances, cull }
    }
}
