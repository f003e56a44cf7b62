use glam::{Mat4, Vec3};

use crate::types::CameraUniform;

pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 2000.0;

/// Perspective camera that always looks at `target`
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            position: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, -1.0),
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Recompute the cached projection after changing fov/aspect/near/far
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Camera-space +X in world coordinates
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    /// Camera-space +Y in world coordinates
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or_zero()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let view = self.view_matrix();
        CameraUniform {
            view_proj: (self.projection * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            position: self.position.to_array(),
            _pad: 0.0,
        }
    }
}
