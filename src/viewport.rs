//! Keeps the camera and drawing surface in step with the window, and turns
//! double-clicks into fullscreen toggles.

use std::time::{Duration, Instant};

use crate::camera::PerspectiveCamera;
use crate::core::WindowContext;

/// Device pixel ratios above this are not worth the fill-rate
pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(300);
/// Max pointer travel between the two presses, logical pixels
pub const DOUBLE_CLICK_DISTANCE: f32 = 4.0;

/// Latest known window size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizes {
    pub width: f32,
    pub height: f32,
}

impl Sizes {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Drawing buffer size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

pub fn pixel_ratio(reported: f64) -> f64 {
    reported.min(MAX_PIXEL_RATIO)
}

/// Apply a window resize. `width`/`height` are logical pixels.
///
/// Returns `None` for a zero-sized (minimised) window, leaving everything
/// untouched.
pub fn on_resize(
    sizes: &mut Sizes,
    camera: &mut PerspectiveCamera,
    width: f32,
    height: f32,
    scale_factor: f64,
) -> Option<SurfaceSize> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }

    sizes.width = width;
    sizes.height = height;

    camera.aspect = sizes.aspect();
    camera.update_projection_matrix();

    let ratio = pixel_ratio(scale_factor);
    Some(SurfaceSize {
        width: ((width as f64 * ratio).round() as u32).max(1),
        height: ((height as f64 * ratio).round() as u32).max(1),
    })
}

/// Flips the window between fullscreen and windowed
#[derive(Debug, Default, Clone, Copy)]
pub struct FullscreenToggle;

impl FullscreenToggle {
    /// Returns the fullscreen state after the transition
    pub fn on_double_click(&self, window: &dyn WindowContext) -> bool {
        let enter = !window.is_fullscreen();
        log::debug!("{} fullscreen", if enter { "Entering" } else { "Leaving" });
        window.set_fullscreen(enter);
        enter
    }
}

/// Pairs left presses into double-clicks
#[derive(Debug, Default, Clone)]
pub struct DoubleClickDetector {
    last_press: Option<(Instant, (f32, f32))>,
}

impl DoubleClickDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press at `position` (logical pixels). Returns true if it
    /// completes a double-click; the pair is then consumed.
    pub fn register_press(&mut self, at: Instant, position: (f32, f32)) -> bool {
        if let Some((previous_at, previous_pos)) = self.last_press {
            let quick = at.saturating_duration_since(previous_at) <= DOUBLE_CLICK_INTERVAL;
            let dx = position.0 - previous_pos.0;
            let dy = position.1 - previous_pos.1;
            let close = (dx * dx + dy * dy).sqrt() <= DOUBLE_CLICK_DISTANCE;
            if quick && close {
                self.last_press = None;
                return true;
            }
        }
        self.last_press = Some((at, position));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockWindow;

    #[test]
    fn test_aspect_follows_window_for_many_sizes() {
        let mut sizes = Sizes::new(800.0, 600.0);
        let mut camera = PerspectiveCamera::new(75.0, sizes.aspect());

        for (w, h) in [(1.0, 1.0), (800.0, 600.0), (1920.0, 1080.0), (300.0, 1200.0), (7.0, 3.0)] {
            on_resize(&mut sizes, &mut camera, w, h, 1.0);
            assert_eq!(camera.aspect, w / h);
            assert_eq!(sizes, Sizes::new(w, h));

            let expected = PerspectiveCamera::new(75.0, w / h).projection_matrix();
            assert_eq!(camera.projection_matrix(), expected);
        }
    }

    #[test]
    fn test_pixel_ratio_is_capped_at_two() {
        assert_eq!(pixel_ratio(1.0), 1.0);
        assert_eq!(pixel_ratio(1.5), 1.5);
        assert_eq!(pixel_ratio(2.0), 2.0);
        assert_eq!(pixel_ratio(3.0), 2.0);
    }

    #[test]
    fn test_surface_size_uses_capped_ratio() {
        let mut sizes = Sizes::new(1.0, 1.0);
        let mut camera = PerspectiveCamera::new(75.0, 1.0);

        let surface = on_resize(&mut sizes, &mut camera, 800.0, 600.0, 3.0);
        assert_eq!(surface, Some(SurfaceSize { width: 1600, height: 1200 }));

        let surface = on_resize(&mut sizes, &mut camera, 801.0, 601.0, 1.25);
        assert_eq!(surface, Some(SurfaceSize { width: 1001, height: 751 }));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut sizes = Sizes::new(1.0, 1.0);
        let mut camera = PerspectiveCamera::new(75.0, 1.0);

        let first = on_resize(&mut sizes, &mut camera, 1024.0, 768.0, 2.0);
        let snapshot = camera.clone();
        let second = on_resize(&mut sizes, &mut camera, 1024.0, 768.0, 2.0);
        assert_eq!(first, second);
        assert_eq!(camera, snapshot);
    }

    #[test]
    fn test_minimised_window_is_ignored() {
        let mut sizes = Sizes::new(800.0, 600.0);
        let mut camera = PerspectiveCamera::new(75.0, sizes.aspect());
        let before = camera.clone();

        assert_eq!(on_resize(&mut sizes, &mut camera, 0.0, 0.0, 1.0), None);
        assert_eq!(on_resize(&mut sizes, &mut camera, 800.0, 0.0, 1.0), None);
        assert_eq!(sizes, Sizes::new(800.0, 600.0));
        assert_eq!(camera, before);
    }

    #[test]
    fn test_double_click_alternates_fullscreen() {
        let window = MockWindow::new(800.0, 600.0);
        let toggle = FullscreenToggle;

        assert!(toggle.on_double_click(&window));
        assert!(!toggle.on_double_click(&window));
        assert!(toggle.on_double_click(&window));
        // exactly one transition per double-click
        assert_eq!(*window.fullscreen_calls.borrow(), vec![true, false, true]);
    }

    #[test]
    fn test_detector_pairs_quick_close_presses() {
        let mut detector = DoubleClickDetector::new();
        let t0 = Instant::now();

        assert!(!detector.register_press(t0, (100.0, 100.0)));
        assert!(detector.register_press(t0 + Duration::from_millis(200), (102.0, 101.0)));
        // the pair was consumed, a third press starts over
        assert!(!detector.register_press(t0 + Duration::from_millis(350), (102.0, 101.0)));
    }

    #[test]
    fn test_detector_rejects_slow_or_distant_presses() {
        let mut detector = DoubleClickDetector::new();
        let t0 = Instant::now();

        detector.register_press(t0, (0.0, 0.0));
        assert!(!detector.register_press(t0 + Duration::from_millis(301), (0.0, 0.0)));

        // the slow press became the new first press
        assert!(!detector.register_press(t0 + Duration::from_millis(400), (10.0, 0.0)));
        assert!(detector.register_press(t0 + Duration::from_millis(500), (10.0, 3.0)));
    }
}
