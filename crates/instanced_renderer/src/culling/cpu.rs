/// Host-side frustum culling.
///
/// Runs the same positive-vertex test as the compute shader and compacts the
/// survivors into a list of original slot indices.  The list is always in
/// ascending order, which makes it the reference the GPU set is compared to.
use instanced_core::{Aabb, Frustum};

/// Indices of the boxes that may be visible, ascending.
pub fn cull(frustum: &Frustum, bounds: &[Aabb]) -> Vec<u32> {
    let mut visible = Vec::with_capacity(bounds.len());
    cull_into(frustum, bounds, &mut visible);
    visible
}

/// Like [`cull`] but reuses `out` (cleared first).  Returns the visible count.
pub fn cull_into(frustum: &Frustum, bounds: &[Aabb], out: &mut Vec<u32>) -> usize {
    out.clear();
    out.extend(
        bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| frustum.intersects_aabb(b))
            .map(|(i, _)| i as u32),
    );
    out.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn half_space_frustum() -> Frustum {
        // sees x in [-10, 0] only
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(-10.0, 0.0, -10.0, 10.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    fn cube_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5))
    }

    #[test]
    fn survivors_are_ascending_and_exclude_positive_x() {
        let bounds = [cube_at(3.0), cube_at(-3.0), cube_at(0.0), cube_at(1.0), cube_at(-0.25)];
        assert_eq!(cull(&half_space_frustum(), &bounds), vec![1, 2, 4]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let bounds: Vec<Aabb> = (0..40).map(|i| cube_at(i as f32 * 0.5 - 10.0)).collect();
        let f = half_space_frustum();
        let first = cull(&f, &bounds);
        let mut again = vec![99; 3];
        assert_eq!(cull_into(&f, &bounds, &mut again), first.len());
        assert_eq!(again, first);
    }

    #[test]
    fn nothing_in_nothing_out() {
        assert!(cull(&half_space_frustum(), &[]).is_empty());
    }
}
