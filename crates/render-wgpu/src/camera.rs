use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use driftwood_render::RenderView;

/// Orbit camera around a fixed target, driven by mouse drag and scroll.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around +Y, measured from +Z towards +X.
    pub azimuth: f32,
    /// Angle down from +Y.
    pub polar: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Keeps the camera above the water.
    pub max_polar: f32,
    pub sensitivity: f32,
    pub zoom_step: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vec3::new(30.0, 30.0, 100.0), Vec3::new(0.0, 10.0, 0.0))
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`, with distance and angle limits applied.
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let mut camera = Self {
            target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            fov_degrees: 55.0,
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20_000.0,
            min_distance: 40.0,
            max_distance: 200.0,
            max_polar: PI * 0.495,
            sensitivity: 0.005,
            zoom_step: 0.1,
        };
        camera.clamp();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        let s = self.polar.sin();
        self.target
            + self.distance * Vec3::new(s * self.azimuth.sin(), self.polar.cos(), s * self.azimuth.cos())
    }

    /// Drag by a mouse delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * self.sensitivity;
        self.polar -= dy * self.sensitivity;
        self.clamp();
    }

    /// Scroll by `lines`; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance *= 1.0 - lines * self.zoom_step;
        self.clamp();
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov_degrees,
            near: self.near,
            far: self.far,
            aspect: self.aspect,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.render_view().view_projection()
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.polar = self.polar.clamp(0.01, self.max_polar);
    }
}
