//! Camera used to cull section rebuilds.

use dynlight_core::Frustum;
use glam::{Mat4, Vec3};

/// Perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 80.0, 0.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 0.05,
            far: 256.0,
        }
    }
}

impl Camera {
    /// Turn the camera around the Y axis to the given yaw, keeping it level.
    pub fn set_yaw(&mut self, yaw: f32) {
        let (sin, cos) = yaw.sin_cos();
        self.direction = Vec3::new(sin, -0.35, -cos).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.direction, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get the view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Extract frustum planes from the current camera state.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.view_projection_matrix())
    }
}
