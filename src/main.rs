use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowId},
};

use scene_lab::app::App;
use scene_lab::cli::Cli;
use scene_lab::core::{WindowContext, WinitController};
use scene_lab::renderer::Renderer;
use scene_lab::scenes::create_scene;
use scene_lab::viewport::{DoubleClickDetector, FullscreenToggle, Sizes, SurfaceSize};
use scene_lab::window::Window;

/// Window, GPU and scene state, created once the event loop resumes
struct Running {
    window: Window,
    renderer: Renderer,
    app: App,
}

struct Viewer {
    cli: Cli,
    running: Option<Running>,
    controller: WinitController,
    double_click: DoubleClickDetector,
    fullscreen: FullscreenToggle,
}

impl Viewer {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            running: None,
            controller: WinitController::new(),
            double_click: DoubleClickDetector::new(),
            fullscreen: FullscreenToggle,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let winit_window = Arc::new(
            event_loop.create_window(
                WinitWindow::default_attributes()
                    .with_title("scene-lab")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.cli.width,
                        self.cli.height,
                    )),
            )?,
        );
        let window = Window::new(winit_window.clone());

        let dims = window.dimensions();
        let aspect = dims.width / dims.height.max(1.0);
        let setup = create_scene(self.cli.scene, self.cli.material, aspect);
        let mut app = App::new(setup, Sizes::new(dims.width, dims.height), !self.cli.no_ui);
        winit_window.set_title(app.title);

        let size = app
            .resize(dims.width, dims.height, window.scale_factor())
            .unwrap_or(SurfaceSize {
                width: 1,
                height: 1,
            });
        let renderer = pollster::block_on(Renderer::new(
            winit_window,
            &app.scene,
            &self.cli.assets,
            size,
        ))?;

        Ok(Running {
            window,
            renderer,
            app,
        })
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => {
                self.controller
                    .set_scale_factor(running.window.scale_factor());
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                log::error!("Failed to start viewer: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        // Let egui handle the event first, but never swallow a release
        if running
            .renderer
            .handle_event(running.window.inner(), &event)
        {
            if let WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } = event
            {
                self.controller.process_event(&event);
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let dims = running.window.dimensions();
                let scale = running.window.scale_factor();
                self.controller.set_scale_factor(scale);
                if let Some(size) = running.app.resize(dims.width, dims.height, scale) {
                    running.renderer.resize(size);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.controller.process_event(&event);
                let position = self.controller.mouse_position().unwrap_or_default();
                if self.double_click.register_press(Instant::now(), position) {
                    self.fullscreen.on_double_click(&running.window);
                }
            }
            WindowEvent::RedrawRequested => {
                if running.renderer.wants_pointer() {
                    running.app.release_pointer();
                } else {
                    running.app.handle_input(&self.controller);
                }
                self.controller.reset_deltas();

                if let Err(e) = running.app.tick(&mut running.renderer, &running.window) {
                    log::error!("Render error: {}", e);
                    event_loop.exit();
                }
            }
            other => self.controller.process_event(&other),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let event_loop = EventLoop::new()?;
    let mut viewer = Viewer::new(cli);

    println!(
        "Scene Lab - drag to orbit, right-drag to pan, scroll to zoom, double-click for fullscreen, Escape to quit"
    );
    event_loop.run_app(&mut viewer)?;

    Ok(())
}
