/// Unit cube (edge length 1) centred at the origin.
///
/// Each face has its own 4 vertices so normals stay flat, and its own tint so
/// orientation is visible while instances orbit.  24 vertices, 36 indices,
/// counter-clockwise front faces.
use crate::geometry::{Mesh, Vertex};

pub fn cube_data() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, tangent u, tangent v, color) per face; u × v == normal
    const FACES: [([f32; 3], [f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.9, 0.3, 0.3]),   // front  (z+)
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.3, 0.9, 0.3]), // back   (z-)
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.3, 0.3, 0.9]),  // left   (x-)
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [0.9, 0.9, 0.3]),  // right  (x+)
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.9, 0.3, 0.9]),  // top    (y+)
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.3, 0.9, 0.9]),  // bottom (y-)
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v, color) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5f32, -0.5f32), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = std::array::from_fn(|k| normal[k] * 0.5 + u[k] * su + v[k] * sv);
            vertices.push(Vertex { position, normal, color });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    (vertices, indices)
}

pub fn cube(device: &wgpu::Device) -> Mesh {
    let (vertices, indices) = cube_data();
    Mesh::from_data(device, "Cube", &vertices, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use instanced_core::Aabb;

    #[test]
    fn cube_spans_half_unit() {
        let (vertices, indices) = cube_data();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        let b = Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position)));
        assert_eq!(b.min, Vec3::splat(-0.5));
        assert_eq!(b.max, Vec3::splat(0.5));
    }

    #[test]
    fn triangles_wind_counter_clockwise_outwards() {
        let (vertices, indices) = cube_data();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let n = Vec3::from(vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
