use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use kitsune_engine::input::{Key, KeyState};
use kitsune_engine::size::SizeSource;
use kitsune_engine::time::TimeSource;
use kitsune_engine::Engine;

use crate::gpu::{Gpu, GpuInit};
use crate::input::{HostInput, InputTracker};
use crate::panel::KeyboardPanel;
use crate::render::WindowSurface;
use crate::startup::Startup;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kitsune".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Opens the window and drives the engine until the window closes.
pub fn run(config: RuntimeConfig, gpu_init: GpuInit, startup: Startup) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut state = AppState::new(config, gpu_init, startup);

    event_loop
        .run_app(&mut state)
        .context("winit event loop terminated with error")?;

    match state.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// One open window and the experience running in it.
struct Session {
    // Dropped first: destroying the engine releases the renderer before the window goes.
    engine: Engine,
    panel: Option<Rc<RefCell<KeyboardPanel>>>,

    time: TimeSource,
    size: SizeSource,
    input: InputTracker,

    window: Arc<Window>,
}

impl Session {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit, startup: &Startup) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let gpu = pollster::block_on(Gpu::new(window.clone(), gpu_init)).context("GPU initialization failed")?;
        let mut surface = WindowSurface::new(gpu);

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        let mut size = SizeSource::new(logical.width, logical.height, scale);
        let mut time = TimeSource::new().with_max_delta(startup.config.time.max_delta);

        let panel = startup.panel();
        let engine = Engine::new(&mut surface, &mut time, &mut size, startup.options(panel.as_ref()))
            .context("failed to start the experience")?;

        if let Some(panel) = &panel {
            panel.borrow().log_bindings();
        }

        Ok(Self {
            engine,
            panel,
            time,
            size,
            input: InputTracker::default(),
            window,
        })
    }

    fn resize_to_window(&mut self) {
        let scale = self.window.scale_factor();
        let logical = self.window.inner_size().to_logical::<f64>(scale);
        self.size.resize(logical.width, logical.height, scale);
    }

    /// Runs one frame. Errors end the session.
    fn frame(&mut self) -> kitsune_engine::Result<()> {
        self.time.tick();
        self.engine.pump()
    }

    /// Routes translated input. Returns true when the user asked to quit.
    fn route(&mut self, input: HostInput) -> bool {
        match input {
            HostInput::Pointer(event) => {
                self.engine.react_to_pointer(&event);
                false
            }
            HostInput::Key {
                key,
                state: KeyState::Pressed,
                modifiers,
                repeat,
            } => {
                if key == Key::Escape {
                    return true;
                }
                if let (Some(panel), false) = (&self.panel, repeat) {
                    panel.borrow_mut().handle_key(key, modifiers);
                }
                false
            }
            HostInput::Key { .. } => false,
        }
    }
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    startup: Startup,

    session: Option<Session>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, startup: Startup) -> Self {
        Self {
            config,
            gpu_init,
            startup,
            session: None,
            exit_requested: false,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut session) = self.session.take() {
            session.engine.destroy();
        }
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.exit_requested {
            return;
        }

        match Session::open(event_loop, &self.config, self.gpu_init.clone(), &self.startup) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the experience animates every frame.
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.window.id() != window_id {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => session.resize_to_window(),

            WindowEvent::RedrawRequested => {
                if let Err(err) = session.frame() {
                    self.fail(event_loop, anyhow::Error::new(err).context("frame failed"));
                }
            }

            other => {
                let scale = session.window.scale_factor();
                if let Some(input) = session.input.translate(other, scale) {
                    if session.route(input) {
                        self.close(event_loop);
                    }
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut session) = self.session.take() {
            session.engine.destroy();
        }
    }
}
