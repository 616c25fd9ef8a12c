//! Standalone window backed by winit.
//!
//! The viewer owns the window, the [`AppContext`], the [`SceneRenderer`]
//! and the [`RenderLoop`], and forwards host events to them:
//! start-up builds everything and requests the assets, resize goes through
//! [`handle_resize`], every redraw runs one [`RenderLoop::tick`], and
//! pointer/keyboard input is turned into [`AppCommand`](crate::app::AppCommand)s
//! by the [`InputProcessor`].
//!
//! ```no_run
//! # use astrobloom::Viewer;
//! Viewer::builder()
//!     .with_options_path("astrobloom.toml")
//!     .build()
//!     .run()
//!     .expect("viewer failed");
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::app::{handle_resize, AppContext, LoopState, RenderLoop, SystemClock};
use crate::error::AppError;
use crate::gpu::render_context::RenderContext;
use crate::input::{InputEvent, InputProcessor};
use crate::options::Options;
use crate::renderer::SceneRenderer;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    options_path: Option<PathBuf>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            options_path: None,
            title: "astrobloom".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// File that option saves are written to.
    #[must_use]
    pub fn with_options_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options_path = Some(path.into());
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            options_path: self.options_path,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the astronaut, the particle field and the bloom.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    options_path: Option<PathBuf>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Viewer`] if the event loop cannot be created or
    /// exits with an error.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop =
            EventLoop::new().map_err(|e| AppError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            options: Some(self.options),
            options_path: self.options_path,
            title: self.title,
            state: None,
            input: InputProcessor::new(),
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| AppError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Everything created once the window exists.
struct Running {
    window: Arc<Window>,
    ctx: AppContext,
    renderer: SceneRenderer,
    render_loop: RenderLoop,
}

/// Internal winit application handler.
struct ViewerApp {
    options: Option<Options>,
    options_path: Option<PathBuf>,
    title: String,
    state: Option<Running>,
    input: InputProcessor,
}

impl ViewerApp {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, AppError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| AppError::Viewer(e.to_string()))?,
        );

        let inner = window.inner_size();
        let viewport = (inner.width.max(1), inner.height.max(1));
        let mut context = pollster::block_on(RenderContext::new(
            Arc::clone(&window),
            viewport,
        ))?;
        context.set_scale_factor(window.scale_factor());

        let options = self.options.take().unwrap_or_default();
        let mut ctx = AppContext::new(options, viewport, &mut rand::rng());
        if let Some(path) = self.options_path.take() {
            ctx = ctx.with_options_path(path);
        }
        ctx.start_loading()?;

        let renderer = SceneRenderer::new(context, ctx.scene(), ctx.camera())?;

        Ok(Running {
            window,
            ctx,
            renderer,
            render_loop: RenderLoop::new(SystemClock::new()),
        })
    }

    fn forward_input(&mut self, event: InputEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let Some(command) = self.input.handle_event(event) {
            state.ctx.execute(command);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("failed to start viewer: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(state) = &self.state {
                    state.render_loop.shutdown_handle().request_shutdown();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    let _ = handle_resize(
                        &mut state.ctx,
                        &mut state.renderer,
                        size.width,
                        size.height,
                    );
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(state) = self.state.as_mut() {
                    state.renderer.set_scale_factor(scale_factor);
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                match state.render_loop.tick(&mut state.ctx, &mut state.renderer)
                {
                    Ok(LoopState::Running) => state.window.request_redraw(),
                    Ok(LoopState::Terminated) => {}
                    Err(
                        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost,
                    ) => {
                        state.renderer.reconfigure();
                        state.window.request_redraw();
                    }
                    Err(e) => {
                        log::error!("render error: {e}");
                        state.window.request_redraw();
                    }
                }
            }

            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::ModifiersChanged(_) => {
                if let Some(input) = InputEvent::from_window_event(&event) {
                    self.forward_input(input);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                let key = format!("{code:?}");
                if let Some(command) = self
                    .input
                    .handle_key_press(&key, &state.ctx.options().keybindings)
                {
                    state.ctx.execute(command);
                }
            }

            _ => (),
        }
    }
}
