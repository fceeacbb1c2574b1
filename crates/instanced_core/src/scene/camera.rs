use glam::{Mat4, Vec3};

/// Projection used to build the clip-space matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective { fovy: f32, znear: f32, zfar: f32 },
    /// View-space box; `aspect` is ignored.
    Orthographic { left: f32, right: f32, bottom: f32, top: f32, znear: f32, zfar: f32 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fovy: std::f32::consts::FRAC_PI_3,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// Orbit camera: the eye sits on a sphere of radius `r` around the point of
/// interest, positioned by azimuth `phi` (in the x0z plane) and elevation
/// `theta` (from the x0z plane).
#[derive(Debug, Clone)]
pub struct Camera {
    // --- orbit parameters -------------------------------------------------
    pub poi: Vec3,
    pub r: f32,
    pub phi: f32,
    pub theta: f32,
    // --- projection parameters --------------------------------------------
    pub aspect: f32,
    pub projection: Projection,
}

/// Closest the eye may get to the point of interest.
pub const MIN_DISTANCE: f32 = 1.0;

impl Default for Camera {
    fn default() -> Self {
        Self {
            poi: Vec3::ZERO,
            r: 5.0,
            phi: -std::f32::consts::FRAC_PI_4,
            theta: std::f32::consts::FRAC_PI_4,
            aspect: 1.0,
            projection: Projection::default(),
        }
    }
}

fn spherical(phi: f32, theta: f32) -> Vec3 {
    Vec3::new(theta.cos() * phi.cos(), theta.sin(), theta.cos() * phi.sin())
}

impl Camera {
    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        self.poi + spherical(self.phi, self.theta) * self.r
    }

    /// Up vector perpendicular to the view direction; stays valid when
    /// looking straight down.
    pub fn up(&self) -> Vec3 {
        spherical(self.phi, self.theta + std::f32::consts::FRAC_PI_2)
    }

    /// Horizontal forward/right directions, used for panning the POI.
    pub fn directions(&self) -> (Vec3, Vec3) {
        let forward = -Vec3::new(self.phi.cos(), 0.0, self.phi.sin());
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        (forward, right)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.poi, self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fovy, znear, zfar } => {
                Mat4::perspective_rh(fovy, self.aspect, znear, zfar)
            }
            Projection::Orthographic { left, right, bottom, top, znear, zfar } => {
                Mat4::orthographic_rh(left, right, bottom, top, znear, zfar)
            }
        }
    }

    /// Build the combined view-projection matrix from the current parameters.
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Rotates around the POI; elevation is clamped to the poles.
    pub fn orbit(&mut self, d_phi: f32, d_theta: f32) {
        use std::f32::consts::FRAC_PI_2;
        self.phi += d_phi;
        self.theta = (self.theta + d_theta).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Moves the eye towards (positive) or away from the POI.
    pub fn zoom(&mut self, delta: f32) {
        self.r = (self.r - delta).max(MIN_DISTANCE);
    }

    /// Moves the POI in the horizontal plane.
    pub fn pan(&mut self, forward: f32, right: f32) {
        let (f, r) = self.directions();
        self.poi += f * forward + r * right;
    }
}

/// Uniform data uploaded once per frame: view-projection and eye position.
#[cfg(feature = "gpu")]
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

#[cfg(feature = "gpu")]
impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().to_cols_array_2d();
        self.eye = camera.eye().extend(1.0).to_array();
    }
}

#[cfg(feature = "gpu")]
impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frustum::Frustum;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn eye_lies_on_orbit_sphere() {
        let cam = Camera::default();
        assert!(((cam.eye() - cam.poi).length() - cam.r).abs() < 1e-5);
        let side = Camera { phi: 0.0, theta: 0.0, ..Camera::default() };
        assert!(side.eye().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn up_is_perpendicular_to_view_direction() {
        let cam = Camera::default();
        let dir = (cam.poi - cam.eye()).normalize();
        assert!(dir.dot(cam.up()).abs() < 1e-5);
    }

    #[test]
    fn default_camera_sees_its_point_of_interest() {
        let f = Frustum::from_view_proj(&Camera::default().build_view_projection_matrix());
        assert!(f.contains_point(Vec3::ZERO));
    }

    #[test]
    fn orbit_clamps_elevation_and_zoom_clamps_distance() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        assert_eq!(cam.theta, FRAC_PI_2);
        cam.zoom(100.0);
        assert_eq!(cam.r, MIN_DISTANCE);
    }

    #[test]
    fn pan_keeps_height() {
        let mut cam = Camera::default();
        cam.pan(1.0, 1.0);
        assert!(cam.poi.y.abs() < 1e-6);
        assert!(cam.poi.length() > 1.0);
    }
}
