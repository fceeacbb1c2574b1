use glam::{Mat4, Vec3};

use instanced_core::Aabb;

/// Speeds at or below this magnitude are treated as "not animated".
pub const ROTATION_EPSILON: f32 = 1e-4;

/// Per-instance shading and animation parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub shininess: f32,
    /// Orbit speed around the world Y axis, radians per second.
    pub rotation_speed: f32,
    pub texture: u32,
    pub normal_map: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self { shininess: 0.0, rotation_speed: 0.0, texture: 0, normal_map: true }
    }
}

/// One drawable copy of the shared mesh.
///
/// `position` is the rest position and `angle` the accumulated rotation about
/// the world Y axis.  Both matrices are derived from them and recomputed on
/// every mutation, so they can never drift out of sync.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    position: Vec3,
    angle: f32,
    material: Material,
    model: Mat4,
    normal: Mat4,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, Material::default())
    }
}

impl Instance {
    pub fn new(position: Vec3, angle: f32, material: Material) -> Self {
        let mut inst = Self {
            position,
            angle: wrap_angle(angle),
            material,
            model: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
        };
        inst.recompute();
        inst
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current angle in `[0, 2π)`.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    /// Inverse-transpose of [`Instance::model`].
    #[inline]
    pub fn normal_matrix(&self) -> &Mat4 {
        &self.normal
    }

    /// Current world-space position of the instance origin.
    pub fn world_position(&self) -> Vec3 {
        self.model.transform_point3(Vec3::ZERO)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recompute();
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = wrap_angle(angle);
        self.recompute();
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        self.material.rotation_speed.abs() > ROTATION_EPSILON
    }

    /// Advances the angle by `dt * rotation_speed`.  Returns `false` (and
    /// leaves the transform untouched) for non-animated instances.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.is_animated() {
            return false;
        }
        self.set_angle(self.angle + dt * self.material.rotation_speed);
        true
    }

    /// World-space box of `local` under this instance's transform.
    pub fn world_bounds(&self, local: &Aabb) -> Aabb {
        local.transform(&self.model)
    }

    pub fn to_gpu(&self) -> GpuInstance {
        GpuInstance {
            model: self.model.to_cols_array_2d(),
            normal: self.normal.to_cols_array_2d(),
            params: [
                self.material.shininess,
                self.material.rotation_speed,
                self.material.texture as f32,
                if self.material.normal_map { 1.0 } else { 0.0 },
            ],
            pos_angle: self.position.extend(self.angle).to_array(),
        }
    }

    fn recompute(&mut self) {
        self.model = Mat4::from_rotation_y(self.angle) * Mat4::from_translation(self.position);
        self.normal = self.model.inverse().transpose();
    }
}

/// Folds `angle` into `[0, 2π)`.  `rem_euclid` rounds tiny negative inputs
/// up to exactly `TAU`, which is the same rotation as zero.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// GPU image of an [`Instance`]; matches `Instance` in `instanced.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuInstance {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// x shininess, y rotation speed, z texture id, w normal-map flag.
    pub params: [f32; 4],
    /// xyz rest position, w angle.
    pub pos_angle: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn spinning(speed: f32) -> Instance {
        Instance::new(
            Vec3::new(2.0, 0.0, 0.0),
            0.0,
            Material { rotation_speed: speed, ..Material::default() },
        )
    }

    #[test]
    fn gpu_layout_is_160_bytes() {
        assert_eq!(std::mem::size_of::<GpuInstance>(), 160);
    }

    #[test]
    fn normal_matrix_tracks_model() {
        let mut inst = spinning(1.0);
        inst.set_angle(0.7);
        inst.set_position(Vec3::new(1.0, 2.0, 3.0));
        let expected = inst.model().inverse().transpose();
        assert!(inst.normal_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn static_instance_never_moves() {
        let mut inst = spinning(0.0);
        let before = inst.clone();
        assert!(!inst.advance(1.0));
        assert_eq!(inst, before);
    }

    #[test]
    fn angle_wraps_into_full_turn() {
        let mut inst = spinning(PI);
        inst.advance(3.0);
        assert!((inst.angle() - PI).abs() < 1e-5);
        assert!(inst.angle() >= 0.0 && inst.angle() < TAU);

        inst.set_angle(-FRAC_PI_2);
        assert!((inst.angle() - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn tiny_negative_angle_wraps_to_zero() {
        let inst = Instance::new(Vec3::X, -1e-9, Material::default());
        assert!(inst.angle() >= 0.0 && inst.angle() < TAU, "angle {}", inst.angle());

        let mut inst = spinning(-1.0);
        inst.set_angle(-f32::EPSILON * 1e-3);
        assert!(inst.angle() < TAU);
        inst.advance(1e-9);
        assert!(inst.angle() >= 0.0 && inst.angle() < TAU);
    }

    #[test]
    fn orbit_keeps_radius() {
        let mut inst = spinning(FRAC_PI_2);
        inst.advance(1.0);
        let p = inst.world_position();
        assert!((p.x.hypot(p.z) - 2.0).abs() < 1e-5);
        // a quarter turn about +Y takes +X to -Z
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn gpu_record_carries_material_and_animation_state() {
        let inst = Instance::new(
            Vec3::new(1.0, 2.0, 3.0),
            0.5,
            Material { shininess: 64.0, rotation_speed: 2.0, texture: 1, normal_map: false },
        );
        let gpu = inst.to_gpu();
        assert_eq!(gpu.params, [64.0, 2.0, 1.0, 0.0]);
        assert_eq!(gpu.pos_angle, [1.0, 2.0, 3.0, 0.5]);
        assert_eq!(gpu.model, inst.model().to_cols_array_2d());
    }
}
