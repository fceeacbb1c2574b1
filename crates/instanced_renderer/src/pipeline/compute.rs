use std::sync::Arc;

/// A compiled compute pipeline plus the workgroup width its shader declares.
///
/// Cheap to clone; the cull pass keeps one and dispatches
/// `ceil(n / workgroup_size)` groups per frame.
#[derive(Clone)]
pub struct ComputePipeline {
    pub inner: Arc<wgpu::ComputePipeline>,
    pub workgroup_size: u32,
}

/// Must match `@workgroup_size` in `cull.wgsl`.
pub const CULL_WORKGROUP_SIZE: u32 = 64;

impl ComputePipeline {
    /// Links `entry_point` of `module` against `bind_group_layouts`.
    pub fn new(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        entry_point: &str,
        workgroup_size: u32,
        label: &str,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Layout")),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            module,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self { inner: Arc::new(pipeline), workgroup_size }
    }

    /// The frustum-cull pipeline from `assets/shaders/cull.wgsl`.
    pub fn cull(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let module = device.create_shader_module(wgpu::include_wgsl!(
            "../../../../assets/shaders/cull.wgsl"
        ));
        Self::new(device, &module, &[layout], "cs_main", CULL_WORKGROUP_SIZE, "Frustum Cull")
    }

    /// Workgroups needed to cover `items` invocations.
    #[inline]
    pub fn workgroups_for(&self, items: u32) -> u32 {
        items.div_ceil(self.workgroup_size.max(1))
    }
}
