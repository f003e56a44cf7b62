/// Window dimensions in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowDimensions {
    pub width: f32,
    pub height: f32,
}

impl WindowDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Window abstraction - the parts of the OS window the render loop and
/// viewport responder talk to
pub trait WindowContext {
    /// Get window dimensions in logical pixels
    fn dimensions(&self) -> WindowDimensions;

    /// Device pixels per logical pixel as reported by the platform
    fn scale_factor(&self) -> f64;

    /// Request the window to redraw
    fn request_redraw(&self);

    fn is_fullscreen(&self) -> bool;

    fn set_fullscreen(&self, fullscreen: bool);
}


#[cfg(test)]
mod tests {
    use super::mock::MockWindow;
    use super::*;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920.0, 1080.0);
        assert_eq!(dims.width, 1920.0);
        assert_eq!(dims.height, 1080.0);
    }

    #[test]
    fn test_window_context_redraw() {
        let window = MockWindow::new(800.0, 600.0);

        assert_eq!(window.redraw_call_count(), 0);

        window.request_redraw();
        assert_eq!(window.redraw_call_count(), 1);

        window.request_redraw();
        window.request_redraw();
        assert_eq!(window.redraw_call_count(), 3);
    }

    #[test]
    fn test_window_context_fullscreen_state() {
        let window = MockWindow::new(640.0, 480.0);
        assert!(!window.is_fullscreen());

        window.set_fullscreen(true);
        assert!(window.is_fullscreen());
        assert_eq!(*window.fullscreen_calls.borrow(), vec![true]);
    }

    #[test]
    fn test_window_context_as_trait_object() {
        let window = MockWindow::new(1024.0, 768.0);
        let context: &dyn WindowContext = &window;
        assert_eq!(context.dimensions(), WindowDimensions::new(1024.0, 768.0));
        assert_eq!(context.scale_factor(), 1.0);
    }
}
