use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};

use crate::scene::CameraPreset;

/// Orbit camera that always looks at `target`.
///
/// `yaw` is measured around +Y from the +X axis and `polar` from +Y, so a camera
/// on the +Z axis level with the target has `yaw = π/2` and `polar = π/2`.
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub polar: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,

    pub auto_rotate: bool,
    /// One unit is a full turn per minute.
    pub auto_rotate_speed: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub mouse_sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            distance: 20.0,
            yaw: 0.0,
            polar: 0.0,

            min_distance: 1.0,
            max_distance: 100.0,
            min_polar: 0.01,
            max_polar: std::f32::consts::PI - 0.01,

            auto_rotate: true,
            auto_rotate_speed: 0.0,

            fov: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,

            mouse_sensitivity: 0.005,
            zoom_speed: 1.0,
        };
        camera.apply_preset(&crate::scene::presets::HEART_CAMERA);
        camera
    }
}

impl Camera {
    pub fn apply_preset(&mut self, preset: &CameraPreset) {
        self.fov = preset.fov_degrees.to_radians();
        self.min_distance = preset.min_distance;
        self.max_distance = preset.max_distance;
        self.min_polar = preset.min_polar;
        self.max_polar = preset.max_polar;
        self.auto_rotate_speed = preset.auto_rotate_speed;
        self.look_from(preset.position, preset.target);
    }

    /// Places the camera at `position` looking at `target`, within the limits.
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        self.target = target;
        let offset = position - target;
        let distance = offset.length();

        if distance > f32::EPSILON {
            self.yaw = offset.z.atan2(offset.x);
            self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        }
        self.distance = distance;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.polar = self.polar.clamp(self.min_polar, self.max_polar);
        self.yaw = self.yaw.rem_euclid(TAU);
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.yaw.cos(),
                    cos_polar,
                    sin_polar * self.yaw.sin(),
                )
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Spins around the target while auto-rotate is on.
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate && self.auto_rotate_speed != 0.0 {
            self.yaw += self.auto_rotate_speed * TAU / 60.0 * dt;
            self.clamp();
        }
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        self.yaw += delta.x * self.mouse_sensitivity;
        self.polar -= delta.y * self.mouse_sensitivity;
        self.clamp();
    }

    pub fn process_scroll(&mut self, delta: f32) {
        self.distance -= delta * self.zoom_speed;
        self.clamp();
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding0: f32,
    pub camera_right: [f32; 3],
    pub _padding1: f32,
    pub camera_up: [f32; 3],
    pub _padding2: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position().to_array(),
            _padding0: 0.0,
            camera_right: camera.right().to_array(),
            _padding1: 0.0,
            camera_up: camera.up().to_array(),
            _padding2: 0.0,
        }
    }
}
