use std::sync::Arc;

use winit::window::{Fullscreen, Window as WinitWindow};

use crate::core::{WindowContext, WindowDimensions};

/// Wrapper around winit Window exposing the loop-facing operations
#[derive(Clone)]
pub struct Window {
    inner: Arc<WinitWindow>,
}

impl Window {
    pub fn new(window: Arc<WinitWindow>) -> Self {
        Self { inner: window }
    }

    pub fn inner(&self) -> &Arc<WinitWindow> {
        &self.inner
    }
}

impl WindowContext for Window {
    fn dimensions(&self) -> WindowDimensions {
        let size = self
            .inner
            .inner_size()
            .to_logical::<f32>(self.inner.scale_factor());
        WindowDimensions::new(size.width, size.height)
    }

    fn scale_factor(&self) -> f64 {
        self.inner.scale_factor()
    }

    fn request_redraw(&self) {
        self.inner.request_redraw();
    }

    fn is_fullscreen(&self) -> bool {
        self.inner.fullscreen().is_some()
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        self.inner
            .set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
    }
}
