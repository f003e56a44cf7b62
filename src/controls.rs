//! Orbit camera controls with damping and auto-rotation.
//!
//! Pointer input only accumulates pending rotation/pan/zoom; `update` applies
//! it to the camera once per frame. With damping enabled the pending deltas
//! are applied a fraction at a time and decay geometrically, which gives the
//! camera its inertia.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::core::{Button, Controller};
use crate::math::Spherical;

pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;

/// What a drag currently does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    None,
    Rotate,
    Pan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 1.0 = one full orbit per minute
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
    state: DragState,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::new(0.0, 0.0, 0.0),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            state: DragState::None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Radians of azimuth pending application
    /// Forget any drag in progress, e.g. when another widget took the pointer
    pub fn release(&mut self) {
        self.state = DragState::None;
    }

    pub fn pending_theta(&self) -> f32 {
        self.spherical_delta.theta
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Multiply the orbit radius on the next update; <1 moves closer
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn auto_rotation_angle(&self, delta: f32) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed * delta
    }

    /// Pan in screen space by a pointer delta in pixels
    pub fn pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32, viewport_height: f32) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let height = viewport_height.max(1.0);

        self.pan_offset += camera.right() * (-2.0 * dx * target_distance / height);
        self.pan_offset += camera.up() * (2.0 * dy * target_distance / height);
    }

    /// Translate the pointer state of `input` into pending motion
    pub fn handle_input(
        &mut self,
        input: &dyn Controller,
        camera: &PerspectiveCamera,
        viewport_height: f32,
    ) {
        let modifier = input.is_down(Button::Shift) || input.is_down(Button::Control);
        self.state = if input.is_down(Button::MouseRight) || input.is_down(Button::MouseMiddle) {
            DragState::Pan
        } else if input.is_down(Button::MouseLeft) {
            if modifier {
                DragState::Pan
            } else {
                DragState::Rotate
            }
        } else {
            DragState::None
        };

        let (dx, dy) = input.pointer_delta();
        let height = viewport_height.max(1.0);
        match self.state {
            DragState::Rotate => {
                self.rotate_left(TAU * dx / height * self.rotate_speed);
                self.rotate_up(TAU * dy / height * self.rotate_speed);
            }
            DragState::Pan => self.pan(camera, dx, dy, height),
            DragState::None => {}
        }

        let scroll = input.scroll_delta();
        if scroll > 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if scroll < 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Apply pending motion (and auto-rotation) to the camera.
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, delta: f32) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vec3(offset);

        if self.auto_rotate && self.state == DragState::None {
            self.rotate_left(self.auto_rotation_angle(delta));
        }

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let previous = camera.position;
        camera.position = self.target + spherical.to_vec3();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::new(0.0, 0.0, 0.0);
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(camera.position) > 1e-12
    }
}
