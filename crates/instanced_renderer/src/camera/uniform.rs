/// GPU-side scene resources: the uniform buffer and its bind group.
///
/// `GpuScene` owns the `wgpu::Buffer` holding the camera matrices plus the
/// single point light, and the bind group shaders bind at group(0).  It is
/// the bridge between the CPU [`Camera`] and the instanced pipeline.
use std::sync::Arc;

use glam::Vec3;
use instanced_core::scene::{Camera, CameraUniform};

use crate::resources::buffer;

/// Point light plus ambient term used by the instanced shader.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lighting {
    pub light_pos: Vec3,
    pub light_color: Vec3,
    pub ambient: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            light_pos: Vec3::new(0.0, 1.05, 0.0),
            light_color: Vec3::new(1.0, 1.0, 0.0),
            ambient: Vec3::new(0.0, 0.0, 0.2),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub camera: CameraUniform,
    pub light_pos: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
}

impl SceneUniform {
    pub fn new(camera: &Camera, lighting: &Lighting) -> Self {
        let mut uniform = Self {
            camera: CameraUniform::new(),
            light_pos: [0.0; 4],
            light_color: [0.0; 4],
            ambient: [0.0; 4],
        };
        uniform.update(camera, lighting);
        uniform
    }

    pub fn update(&mut self, camera: &Camera, lighting: &Lighting) {
        self.camera.update(camera);
        self.light_pos = lighting.light_pos.extend(1.0).to_array();
        self.light_color = lighting.light_color.extend(1.0).to_array();
        self.ambient = lighting.ambient.extend(0.0).to_array();
    }
}

pub struct GpuScene {
    pub uniform: SceneUniform,
    pub buffer: Arc<wgpu::Buffer>,
    pub bind_group: Arc<wgpu::BindGroup>,
}

impl GpuScene {
    /// Allocates the uniform buffer and its bind group.  `layout` must have
    /// a single `UNIFORM` buffer entry at binding 0.
    pub fn new(
        device: &wgpu::Device,
        camera: &Camera,
        lighting: &Lighting,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = SceneUniform::new(camera, lighting);
        let buf = buffer::create_uniform(device, "Scene Uniform Buffer", &uniform);

        let bind_group = Arc::new(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buf.as_entire_binding(),
            }],
        }));

        Self { uniform, buffer: buf, bind_group }
    }

    /// Syncs camera and light state to the GPU.  Call once per frame before
    /// any pass executes.
    pub fn sync(&mut self, queue: &wgpu::Queue, camera: &Camera, lighting: &Lighting) {
        self.uniform.update(camera, lighting);
        buffer::update_uniform(queue, &self.buffer, &self.uniform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_wgsl_sized() {
        // mat4 + 4 × vec4
        assert_eq!(std::mem::size_of::<SceneUniform>(), 128);
    }

    #[test]
    fn uniform_tracks_camera() {
        let cam = Camera::default();
        let u = SceneUniform::new(&cam, &Lighting::default());
        assert_eq!(u.camera.view_proj, cam.build_view_projection_matrix().to_cols_array_2d());
        assert_eq!(u.light_pos, [0.0, 1.05, 0.0, 1.0]);
    }
}
