/// View-frustum planes and the conservative box test shared by the CPU and
/// GPU culling paths.
///
/// ## Algorithm
///
/// Given the combined `view_proj` matrix `M`, the six frustum planes can be
/// extracted analytically (Gribb-Hartmann method) by adding or subtracting
/// rows of `M`.  Each plane is stored as `(normal, d)` with the normal
/// pointing into the frustum, so `dot(normal, p) + d >= 0` for visible points.
///
/// For an AABB to be **completely outside** one plane it is sufficient to
/// show that its *positive vertex* (the corner farthest along the plane's
/// normal) has a negative signed distance.  If no such plane exists, the AABB
/// is treated as visible, which may keep a few boxes near the frustum corners
/// but never drops a visible one.
use glam::{Mat4, Vec3, Vec4};

use crate::bounds::Aabb;

// ── Plane ────────────────────────────────────────────────────────────────────

/// Plane equation `dot(normal, p) + d = 0`; positive side is "inside".
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    #[inline]
    pub fn from_vec4(v: Vec4) -> Self {
        Self { normal: v.truncate(), d: v.w }
    }

    /// Scales the equation so `normal` has unit length.  Planes with a
    /// (near) zero normal come from a degenerate matrix and are left as is.
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.normal.length();
        if len > 1e-6 {
            Self { normal: self.normal / len, d: self.d / len }
        } else {
            self
        }
    }

    /// Signed distance of `point`; negative means outside.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Corner of `aabb` that maximises `dot(normal, corner)`.
    #[inline]
    pub fn positive_vertex(&self, aabb: &Aabb) -> Vec3 {
        Vec3::new(
            if self.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
            if self.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
            if self.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
        )
    }

    /// `(nx, ny, nz, d)` as uploaded to the cull shader.
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }
}

// ── Frustum ───────────────────────────────────────────────────────────────────

/// Six inward-facing planes in world space, ordered left, right, bottom,
/// top, near, far.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Extracts the six frustum planes from `view_proj` (column-major).
    ///
    /// Works for perspective and orthographic projections alike.  The near
    /// plane is row 2 alone because wgpu clip depth is `[0, 1]`.
    pub fn from_view_proj(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d(); // m[col][row]

        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);

        let r0 = row(0);
        let r1 = row(1);
        let r2 = row(2);
        let r3 = row(3);

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ]
        .map(|p| Plane::from_vec4(p).normalized());

        Self { planes }
    }

    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Plane coefficients in the layout the cull shader expects.
    pub fn to_gpu_planes(&self) -> [[f32; 4]; 6] {
        self.planes.map(|p| p.to_array())
    }

    /// `true` iff `point` is on the inner side of (or on) every plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Returns `true` if the AABB **might** be visible (conservative, no
    /// false negatives).  Only a strictly negative distance rejects, so boxes
    /// touching or straddling a plane are kept.
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            if plane.signed_distance(plane.positive_vertex(aabb)) < 0.0 {
                return false; // completely outside this plane
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_3;

    fn perspective_looking_at_origin() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(FRAC_PI_3, 1.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    /// Orthographic view down -Z that only sees `x` in `[-10, 0]`.
    fn negative_x_half_space() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(-10.0, 0.0, -10.0, 10.0, 0.1, 100.0);
        Frustum::from_view_proj(&(proj * view))
    }

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::from_center_half_extents(center, Vec3::splat(0.5))
    }

    #[test]
    fn planes_are_normalized() {
        for p in perspective_looking_at_origin().planes() {
            assert!((p.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn interior_point_has_non_negative_distances() {
        let f = perspective_looking_at_origin();
        assert!(f.contains_point(Vec3::ZERO));
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -50.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 6.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -200.0)));
    }

    #[test]
    fn near_plane_matches_zero_to_one_depth() {
        let f = perspective_looking_at_origin();
        let near = f.planes()[Frustum::NEAR];
        // eye at z=5 looking down -Z, near distance 0.1
        assert!(near.signed_distance(Vec3::new(0.0, 0.0, 4.9)).abs() < 1e-4);
        assert!(near.signed_distance(Vec3::new(0.0, 0.0, 4.95)) < 0.0);
        assert!(near.signed_distance(Vec3::new(0.0, 0.0, 4.8)) > 0.0);
    }

    #[test]
    fn box_fully_inside_is_visible() {
        assert!(perspective_looking_at_origin().intersects_aabb(&unit_box_at(Vec3::ZERO)));
    }

    #[test]
    fn box_fully_outside_is_rejected() {
        let f = perspective_looking_at_origin();
        assert!(!f.intersects_aabb(&unit_box_at(Vec3::new(50.0, 0.0, 0.0))));
        assert!(!f.intersects_aabb(&unit_box_at(Vec3::new(0.0, 0.0, 20.0))));
    }

    #[test]
    fn straddling_box_is_kept() {
        let f = negative_x_half_space();
        assert!(f.intersects_aabb(&unit_box_at(Vec3::ZERO)));
        // touching the plane exactly counts as inside
        assert!(f.intersects_aabb(&Aabb::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))));
    }

    #[test]
    fn orthographic_excludes_positive_x_half_space() {
        let f = negative_x_half_space();
        assert!(!f.intersects_aabb(&unit_box_at(Vec3::new(1.5, 0.0, 0.0))));
        assert!(!f.intersects_aabb(&unit_box_at(Vec3::new(3.0, 2.0, -1.0))));
        assert!(f.intersects_aabb(&unit_box_at(Vec3::new(-1.5, 0.0, 0.0))));
        assert!(f.intersects_aabb(&unit_box_at(Vec3::new(-3.0, 2.0, -1.0))));
    }

    #[test]
    fn gpu_planes_mirror_plane_order() {
        let f = negative_x_half_space();
        let gpu = f.to_gpu_planes();
        assert_eq!(gpu[Frustum::RIGHT], f.planes()[Frustum::RIGHT].to_array());
        assert!((gpu[Frustum::RIGHT][0] + 1.0).abs() < 1e-6);
    }
}
