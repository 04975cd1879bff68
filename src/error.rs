//! Error types for the portal.
//!
//! Nothing in the per-frame path is allowed to fail hard: missing assets and
//! denied audio playback degrade the experience instead of stopping it. The
//! types here cover the few operations that genuinely can fail (GPU setup,
//! window creation, asset decoding, configuration parsing).

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("Surface has no supported texture format")]
    NoSurfaceFormat,
}

/// Errors raised by the render pipeline while drawing a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface was lost or went out of date and must be reconfigured.
    #[error("Render surface lost")]
    SurfaceLost,
    /// The backend ran out of memory. Unrecoverable.
    #[error("Render backend out of memory")]
    OutOfMemory,
    /// Any other backend failure; the frame is skipped.
    #[error("Render error: {0}")]
    Other(String),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => RenderError::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Errors that can occur while loading an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Failed to decode an image file.
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// Failed to read a file from disk.
    #[error("Failed to read asset file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by an audio sink.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The platform refused to start playback (autoplay policy, no device).
    #[error("Audio playback denied: {0}")]
    PlaybackDenied(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for [`PortalConfig`](crate::PortalConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur when running the windowed experience.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}
