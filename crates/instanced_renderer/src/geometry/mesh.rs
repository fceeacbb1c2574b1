/// A drawable GPU mesh: vertex/index buffers, the index count and the
/// object-space box every instance's world bounds are derived from.
///
/// Meshes are cheaply cloneable because the underlying buffers are `Arc`-
/// wrapped.  Creating a second handle to a mesh does **not** copy GPU memory.
use std::sync::Arc;

use instanced_core::Aabb;

use super::Vertex;
use crate::resources::buffer;

#[derive(Clone)]
pub struct Mesh {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
    /// Index format used when binding this mesh.
    pub index_format: wgpu::IndexFormat,
    pub local_bounds: Aabb,
}

impl Mesh {
    /// Uploads `vertices`/`indices`; the bounds are fitted to the vertices.
    pub fn from_data(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> Self {
        let local_bounds = Aabb::from_points(vertices.iter().map(|v| glam::Vec3::from(v.position)));
        Mesh {
            vertex_buffer: buffer::create_vertex(device, &format!("{label} VB"), vertices),
            index_buffer: buffer::create_index(device, &format!("{label} IB"), indices),
            index_count: indices.len() as u32,
            index_format: wgpu::IndexFormat::Uint16,
            local_bounds,
        }
    }

    /// Convenience constructor: unit cube centred at the origin.
    pub fn cube(device: &wgpu::Device) -> Self {
        super::primitives::cube(device)
    }
}
