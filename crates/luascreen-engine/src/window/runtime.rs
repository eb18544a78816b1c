use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::canvas::Canvas;
use crate::config::ScreenConfig;
use crate::core::{Display, DisplayEvent};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::{platform, InputState};
use crate::render::{CanvasBlitter, RenderCtx, RenderTarget};

/// How long `open` waits for the platform to hand out a window.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTUP_POLL: Duration = Duration::from_millis(10);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: PhysicalSize<u32>,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from(&ScreenConfig::default())
    }
}

impl From<&ScreenConfig> for RuntimeConfig {
    fn from(config: &ScreenConfig) -> Self {
        Self {
            title: config.window.title.clone(),
            initial_size: PhysicalSize::new(config.window.width, config.window.height),
            resizable: config.window.resizable,
            vsync: config.render.vsync,
        }
    }
}

/// A real window presenting through wgpu.
///
/// The script owns the frame loop: instead of handing control to winit, the
/// event loop is pumped on every `poll_events` call.
pub struct WindowDisplay {
    event_loop: EventLoop<()>,
    state: WindowState,
}

impl WindowDisplay {
    /// Creates the event loop, the window and the GPU surface.
    ///
    /// Blocks until the platform has created the window.
    pub fn open(config: RuntimeConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = WindowState::new(config);

        let deadline = Instant::now() + STARTUP_TIMEOUT;
        while state.gpu.is_none() {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(STARTUP_POLL), &mut state) {
                bail!("event loop exited during startup (code {code})");
            }
            if let Some(err) = state.init_error.take() {
                return Err(err);
            }
            if Instant::now() > deadline {
                bail!("timed out waiting for the window to be created");
            }
        }

        Ok(Self { event_loop, state })
    }
}

impl Display for WindowDisplay {
    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        let WindowState { window, gpu, blitter, .. } = &mut self.state;
        let (Some(window), Some(gpu)) = (window.as_ref(), gpu.as_mut()) else {
            return Ok(());
        };

        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized; nothing to present to.
            return Ok(());
        }

        let mut frame = match gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => bail!("surface is out of memory"),
                action => {
                    log::debug!("skipping frame after surface error: {action:?}");
                    return Ok(());
                }
            },
        };

        let rctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            (size.width, size.height),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            blitter.render(&rctx, &mut target, canvas);
        }

        window.pre_present_notify();
        gpu.submit(frame);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<DisplayEvent> {
        if self.state.window.is_some() {
            if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
                log::info!("event loop exited (code {code})");
                self.state.events.push(DisplayEvent::CloseRequested);
                self.state.shutdown();
            }
        }
        std::mem::take(&mut self.state.events)
    }

    fn is_open(&self) -> bool {
        self.state.window.is_some()
    }

    fn close(&mut self) {
        self.state.shutdown();
        // Let the platform process the window destruction.
        let _ = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        self.state.events.clear();
    }

    fn set_title(&mut self, title: &str) {
        self.state.config.title = title.to_string();
        if let Some(window) = self.state.window.as_ref() {
            window.set_title(title);
        }
    }
}

struct WindowState {
    config: RuntimeConfig,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    blitter: CanvasBlitter,
    input: InputState,
    events: Vec<DisplayEvent>,
    init_error: Option<anyhow::Error>,
    closed: bool,
}

impl WindowState {
    fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            blitter: CanvasBlitter::new(),
            input: InputState::default(),
            events: Vec::new(),
            init_error: None,
            closed: false,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), GpuInit::with_vsync(self.config.vsync)))
            .context("failed to initialize rendering")?;

        let size = window.inner_size();
        log::info!("opened window {:?} ({}x{})", self.config.title, size.width, size.height);

        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    /// Drops the surface before the window it renders to.
    fn shutdown(&mut self) {
        self.closed = true;
        self.gpu = None;
        self.window = None;
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.closed {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.init_error = Some(e);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        if let Some(ev) = platform::translate_window_event(&self.input, &event) {
            self.input.apply_event(&ev);
            self.events.push(DisplayEvent::Input(ev));
        }
        if let Some(text) = platform::key_text(&event) {
            self.events.push(DisplayEvent::Input(text));
        }

        match event {
            WindowEvent::CloseRequested => {
                self.events.push(DisplayEvent::CloseRequested);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
                log::debug!("window resized to {}x{}", new_size.width, new_size.height);
                self.events.push(DisplayEvent::Resized {
                    width: new_size.width,
                    height: new_size.height,
                });
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) {
                    gpu.resize(window.inner_size());
                }
            }

            _ => {}
        }
    }
}
