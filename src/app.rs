//! Windowed host.
//!
//! Creates a winit window, loads assets, builds the wgpu pipeline and feeds
//! window events into a [`RenderLoop`].

use std::path::PathBuf;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::assets::{AssetSet, CharacterAsset, LoadingProgress};
use crate::audio::AudioSink;
use crate::config::PortalConfig;
use crate::error::{AppError, RenderError};
use crate::gpu::WgpuPipeline;
use crate::input::{Input, Viewport};
use crate::render_loop::RenderLoop;
use crate::ui::UiFlags;

/// Entry point for running the portal in a window.
///
/// ```ignore
/// use void_portal::prelude::*;
///
/// PortalApp::responsive()
///     .with_asset_dir("assets")
///     .run()?;
/// ```
pub struct PortalApp {
    /// `None` picks tier defaults for the window's real size.
    config: Option<PortalConfig>,
    asset_dir: Option<PathBuf>,
    character: Option<CharacterAsset>,
    audio: Option<Box<dyn AudioSink>>,
    title: String,
}

impl PortalApp {
    /// Run with exactly this config, whatever the window size.
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::responsive()
        }
    }

    /// Run with [`PortalConfig::for_viewport`] defaults for the window once
    /// it exists.
    pub fn responsive() -> Self {
        Self {
            config: None,
            asset_dir: None,
            character: None,
            audio: None,
            title: "Void Portal".to_string(),
        }
    }

    /// Directory holding `metal.png`, `noise.png` and `smoke.png`.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    pub fn with_character(mut self, character: CharacterAsset) -> Self {
        self.character = Some(character);
        self
    }

    /// Ambient track sink. Without one the experience runs silent.
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// The explicit config, or tier defaults for `viewport`.
fn resolve_config(config: Option<PortalConfig>, viewport: Viewport) -> PortalConfig {
    config.unwrap_or_else(|| PortalConfig::for_viewport(viewport))
}

struct App {
    settings: Option<PortalApp>,
    window: Option<Arc<Window>>,
    render_loop: Option<RenderLoop<WgpuPipeline, UiFlags>>,
    input: Input,
    error: Option<AppError>,
}

impl App {
    fn new(settings: PortalApp) -> Self {
        Self {
            settings: Some(settings),
            window: None,
            render_loop: None,
            input: Input::default(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let Some(settings) = self.settings.take() else {
            return Ok(());
        };

        let window_attrs = Window::default_attributes()
            .with_title(settings.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height);
        self.input.set_viewport(viewport);

        let mut progress = LoadingProgress::new();
        let mut assets = match &settings.asset_dir {
            Some(dir) => AssetSet::load_dir(dir, &mut progress),
            None => AssetSet::empty(),
        };
        if let Some(character) = settings.character {
            assets = assets.with_character(character);
        }
        if let Some(sink) = settings.audio {
            assets = assets.with_audio(sink);
        }
        log::info!(
            "app: assets loaded {}/{} ({} failed)",
            progress.loaded(),
            progress.total(),
            progress.failed()
        );

        let config = resolve_config(settings.config, viewport);
        log::info!(
            "app: {}x{} ({:?}), {} particles",
            viewport.width,
            viewport.height,
            viewport.tier(),
            config.particle_count
        );

        let pipeline = pollster::block_on(WgpuPipeline::new(
            window.clone(),
            &assets,
            config.particle_count as usize,
        ))?;

        let mut render_loop = RenderLoop::new(config, viewport, pipeline, UiFlags::default());
        render_loop.assets_ready(assets);
        self.render_loop = Some(render_loop);

        window.request_redraw();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("app: startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(render_loop) = &mut self.render_loop else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        if let Some(action) = self.input.handle_event(&event) {
            render_loop.handle_action(action);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                let viewport = Viewport::new(physical_size.width, physical_size.height);
                self.input.set_viewport(viewport);
                render_loop.resize(viewport);
            }
            WindowEvent::CursorMoved { .. } => {
                if let Some(ndc) = self.input.cursor_ndc() {
                    render_loop.pointer_moved(ndc);
                }
            }
            WindowEvent::RedrawRequested => {
                match render_loop.tick() {
                    Ok(()) => {}
                    Err(RenderError::SurfaceLost) => render_loop.pipeline_mut().reconfigure(),
                    Err(RenderError::OutOfMemory) => {
                        log::error!("app: render backend out of memory");
                        event_loop.exit();
                    }
                    Err(e) => log::error!("app: {e}"),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
