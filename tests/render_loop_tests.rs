use std::cell::{Cell, RefCell};
use std::time::Duration;

use scene_lab::app::{App, FrameTarget};
use scene_lab::core::{Button, Controller, WindowContext, WindowDimensions};
use scene_lab::scenes::{create_scene, MaterialChoice, SceneKind};
use scene_lab::viewport::{DoubleClickDetector, FullscreenToggle, Sizes};
use scene_lab::Result;

/// Mock window for testing
struct TestWindow {
    width: f32,
    height: f32,
    scale: f64,
    fullscreen: Cell<bool>,
    redraws: RefCell<usize>,
}

impl TestWindow {
    fn new(width: f32, height: f32, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            fullscreen: Cell::new(false),
            redraws: RefCell::new(0),
        }
    }
}

impl WindowContext for TestWindow {
    fn dimensions(&self) -> WindowDimensions {
        WindowDimensions::new(self.width, self.height)
    }

    fn scale_factor(&self) -> f64 {
        self.scale
    }

    fn request_redraw(&self) {
        *self.redraws.borrow_mut() += 1;
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }
}

/// Counts frames and remembers the camera each one saw
#[derive(Default)]
struct CountingTarget {
    frames: usize,
    camera_positions: Vec<glam::Vec3>,
}

impl FrameTarget for CountingTarget {
    fn draw(&mut self, app: &mut App) -> Result<()> {
        self.frames += 1;
        self.camera_positions.push(app.camera.position);
        Ok(())
    }
}

struct Drag {
    buttons: Vec<Button>,
    delta: (f32, f32),
    scroll: f32,
}

impl Controller for Drag {
    fn is_down(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.buttons
    }

    fn pointer_delta(&self) -> (f32, f32) {
        self.delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll
    }
}

fn cube_app() -> App {
    let setup = create_scene(SceneKind::Cube, MaterialChoice::default(), 4.0 / 3.0);
    App::new(setup, Sizes::new(800.0, 600.0), false)
}

#[test]
fn test_cube_scene_orbits_on_its_own() {
    let mut app = cube_app();
    let mut target = CountingTarget::default();
    let window = TestWindow::new(800.0, 600.0, 1.0);
    let start = app.clock.start();

    for i in 1..=60 {
        app.tick_at(start + Duration::from_millis(16 * i), &mut target, &window)
            .unwrap();
    }

    assert_eq!(target.frames, 60);
    assert_eq!(*window.redraws.borrow(), 60);

    // distance to the target is preserved while the camera swings around it
    let first = target.camera_positions[0];
    let last = *target.camera_positions.last().unwrap();
    assert!((first.length() - last.length()).abs() < 1e-3);
    assert!(first.distance(last) > 1e-3);
}

#[test]
fn test_materials_scene_camera_rests_without_input() {
    let setup = create_scene(SceneKind::Materials, MaterialChoice::Standard, 4.0 / 3.0);
    let mut app = App::new(setup, Sizes::new(800.0, 600.0), false);
    let mut target = CountingTarget::default();
    let window = TestWindow::new(800.0, 600.0, 1.0);
    let before = app.camera.position;

    for _ in 0..10 {
        app.tick(&mut target, &window).unwrap();
    }
    assert!(app.camera.position.distance(before) < 1e-5);
}

#[test]
fn test_scroll_zooms_in() {
    let setup = create_scene(SceneKind::Materials, MaterialChoice::Standard, 4.0 / 3.0);
    let mut app = App::new(setup, Sizes::new(800.0, 600.0), false);
    app.controls.enable_damping = false;
    let mut target = CountingTarget::default();
    let window = TestWindow::new(800.0, 600.0, 1.0);

    let before = app.camera.position.length();
    app.handle_input(&Drag {
        buttons: vec![],
        delta: (0.0, 0.0),
        scroll: 100.0,
    });
    app.tick(&mut target, &window).unwrap();
    assert!(app.camera.position.length() < before);
}

#[test]
fn test_resize_then_tick_uses_new_aspect() {
    let mut app = cube_app();
    let window = TestWindow::new(1920.0, 1080.0, 3.0);
    let surface = app.resize(1920.0, 1080.0, window.scale_factor()).unwrap();

    // device ratio is capped at 2
    assert_eq!((surface.width, surface.height), (3840, 2160));
    assert!((app.camera.aspect - 16.0 / 9.0).abs() < 1e-6);

    // minimised windows leave everything alone
    assert!(app.resize(0.0, 0.0, 1.0).is_none());
    assert!((app.camera.aspect - 16.0 / 9.0).abs() < 1e-6);
}

#[test]
fn test_double_click_toggles_fullscreen_both_ways() {
    let window = TestWindow::new(800.0, 600.0, 1.0);
    let mut detector = DoubleClickDetector::new();
    let toggle = FullscreenToggle;
    let t0 = std::time::Instant::now();

    let mut click = |at: Duration| {
        if detector.register_press(t0 + at, (100.0, 100.0)) {
            toggle.on_double_click(&window);
        }
    };

    click(Duration::from_millis(0));
    click(Duration::from_millis(150));
    assert!(window.is_fullscreen());

    click(Duration::from_millis(2000));
    click(Duration::from_millis(2100));
    assert!(!window.is_fullscreen());
}
