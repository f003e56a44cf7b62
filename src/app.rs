//! The per-frame loop: clock, idle rotation, orbit controls, draw, reschedule.

use std::time::Instant;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::core::{Clock, Controller, FrameInfo, FrameStats, WindowContext};
use crate::error::Result;
use crate::params::{ControlParams, Panel};
use crate::scene::{NodeId, Scene};
use crate::scenes::SceneSetup;
use crate::viewport::{self, Sizes, SurfaceSize};

/// Turns the current state of an [`App`] into one presented frame
pub trait FrameTarget {
    fn draw(&mut self, app: &mut App) -> Result<()>;
}

/// Live scene state plus the loop bookkeeping around it
pub struct App {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub params: ControlParams,
    pub panel: Panel,
    pub animated: Vec<NodeId>,
    pub sizes: Sizes,
    pub clock: Clock,
    pub stats: FrameStats,
    pub show_ui: bool,
    pub title: &'static str,
}

impl App {
    pub fn new(setup: SceneSetup, sizes: Sizes, show_ui: bool) -> Self {
        Self {
            scene: setup.scene,
            camera: setup.camera,
            controls: setup.controls,
            params: setup.params,
            panel: setup.panel,
            animated: setup.animated,
            sizes,
            clock: Clock::new(),
            stats: FrameStats::new(),
            show_ui,
            title: setup.title,
        }
    }

    /// Run one frame. The next redraw is requested even if drawing failed;
    /// the caller decides whether the error is fatal.
    pub fn tick(
        &mut self,
        target: &mut dyn FrameTarget,
        window: &dyn WindowContext,
    ) -> Result<FrameInfo> {
        self.tick_at(Instant::now(), target, window)
    }

    pub fn tick_at(
        &mut self,
        now: Instant,
        target: &mut dyn FrameTarget,
        window: &dyn WindowContext,
    ) -> Result<FrameInfo> {
        self.stats.begin_at(now);
        let frame = self.clock.tick_at(now);

        self.animate(frame.time);
        self.controls.update(&mut self.camera, frame.delta);

        let drawn = target.draw(self);

        self.stats.end_at(Instant::now().max(now));
        window.request_redraw();

        drawn.map(|()| frame)
    }

    /// Idle rotation: absolute, so it never drifts from `speed * elapsed`
    pub fn animate(&mut self, elapsed: f32) {
        if !self.params.rotate_objects {
            return;
        }
        let angle = self.params.rotation_speed * elapsed;
        for &id in &self.animated {
            if let Some(node) = self.scene.node_mut(id) {
                node.rotation.y = angle;
            }
        }
    }

    /// Feed pointer state to the orbit controls
    pub fn handle_input(&mut self, input: &dyn Controller) {
        self.controls
            .handle_input(input, &self.camera, self.sizes.height);
    }

    /// The GUI owns the pointer: end any drag so auto-rotation resumes
    pub fn release_pointer(&mut self) {
        self.controls.release();
    }

    pub fn resize(&mut self, width: f32, height: f32, scale_factor: f64) -> Option<SurfaceSize> {
        viewport::on_resize(&mut self.sizes, &mut self.camera, width, height, scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::DragState;
    use crate::core::MockWindow;
    use crate::error::SceneLabError;
    use crate::scenes::{create_scene, MaterialChoice, SceneKind};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingTarget {
        draws: usize,
        fail: bool,
        rotations: Vec<f32>,
    }

    impl FrameTarget for RecordingTarget {
        fn draw(&mut self, app: &mut App) -> Result<()> {
            self.draws += 1;
            let first = app.animated[0];
            self.rotations.push(app.scene.node(first).unwrap().rotation.y);
            if self.fail {
                return Err(SceneLabError::Gpu("device lost".to_string()));
            }
            Ok(())
        }
    }

    fn materials_app() -> App {
        let setup = create_scene(SceneKind::Materials, MaterialChoice::Standard, 4.0 / 3.0);
        App::new(setup, Sizes::new(800.0, 600.0), true)
    }

    #[test]
    fn test_rotation_untouched_while_toggle_off() {
        let mut app = materials_app();
        let mut target = RecordingTarget::default();
        let window = MockWindow::new(800.0, 600.0);
        let start = app.clock.start();

        let sphere = app.animated[0];
        app.scene.node_mut(sphere).unwrap().rotation.y = 0.7;
        for ms in [16, 32, 48] {
            app.tick_at(start + Duration::from_millis(ms), &mut target, &window)
                .unwrap();
        }
        assert_eq!(target.rotations, vec![0.7, 0.7, 0.7]);
    }

    #[test]
    fn test_rotation_follows_speed_times_elapsed() {
        let mut app = materials_app();
        app.params.rotate_objects = true;
        app.params.rotation_speed = 0.5;
        let mut target = RecordingTarget::default();
        let window = MockWindow::new(800.0, 600.0);
        let start = app.clock.start();

        for ms in [100, 1000, 2500] {
            app.tick_at(start + Duration::from_millis(ms), &mut target, &window)
                .unwrap();
        }

        let expected = [0.05, 0.5, 1.25];
        for (got, want) in target.rotations.iter().zip(expected) {
            assert!((got - want).abs() < 1e-5, "{} != {}", got, want);
        }
        assert!(target.rotations.windows(2).all(|w| w[1] > w[0]));

        // every animated node gets the same absolute angle
        for &id in &app.animated {
            assert!((app.scene.node(id).unwrap().rotation.y - 1.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_each_tick_draws_once_and_reschedules() {
        let mut app = materials_app();
        let mut target = RecordingTarget::default();
        let window = MockWindow::new(800.0, 600.0);

        for _ in 0..5 {
            app.tick(&mut target, &window).unwrap();
        }
        assert_eq!(target.draws, 5);
        assert_eq!(window.redraw_call_count(), 5);
    }

    #[test]
    fn test_draw_failure_still_reschedules() {
        let mut app = materials_app();
        let mut target = RecordingTarget {
            fail: true,
            ..Default::default()
        };
        let window = MockWindow::new(800.0, 600.0);

        assert!(app.tick(&mut target, &window).is_err());
        assert_eq!(window.redraw_call_count(), 1);
    }

    #[test]
    fn test_auto_rotate_composes_with_idle_rotation() {
        let mut app = materials_app();
        app.controls.auto_rotate = true;
        app.controls.enable_damping = false;
        app.params.rotate_objects = true;
        let mut target = RecordingTarget::default();
        let window = MockWindow::new(800.0, 600.0);
        let before = app.camera.position;

        let frame = app
            .tick_at(app.clock.start() + Duration::from_secs(1), &mut target, &window)
            .unwrap();
        assert_eq!(frame.number, 1);
        assert!(app.camera.position.distance(before) > 1e-3);
        assert!((target.rotations[0] - 0.3).abs() < 1e-5);
    }

    struct LeftDrag;

    impl Controller for LeftDrag {
        fn is_down(&self, button: crate::core::Button) -> bool {
            button == crate::core::Button::MouseLeft
        }

        fn get_down_keys(&self) -> &[crate::core::Button] {
            &[crate::core::Button::MouseLeft]
        }

        fn pointer_delta(&self) -> (f32, f32) {
            (0.0, 0.0)
        }

        fn scroll_delta(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_releasing_the_pointer_resumes_auto_rotate() {
        let mut app = materials_app();
        app.controls.auto_rotate = true;
        app.controls.enable_damping = false;
        let mut target = RecordingTarget::default();
        let window = MockWindow::new(800.0, 600.0);
        let start = app.clock.start();

        app.handle_input(&LeftDrag);
        assert_eq!(app.controls.state(), DragState::Rotate);
        let before = app.camera.position;
        app.tick_at(start + Duration::from_millis(500), &mut target, &window)
            .unwrap();
        assert!(app.camera.position.distance(before) < 1e-5);

        // drag ended over the panel
        app.release_pointer();
        assert_eq!(app.controls.state(), DragState::None);
        let before = app.camera.position;
        app.tick_at(start + Duration::from_millis(1000), &mut target, &window)
            .unwrap();
        assert!(app.camera.position.distance(before) > 1e-3);
    }

    #[test]
    fn test_resize_updates_camera() {
        let mut app = materials_app();
        let surface = app.resize(1000.0, 500.0, 1.0).unwrap();
        assert_eq!(app.camera.aspect, 2.0);
        assert_eq!((surface.width, surface.height), (1000, 500));
    }
}
