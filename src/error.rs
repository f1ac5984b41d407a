//! Error types
//!
//! Configuration problems are caught once at startup; nothing in the
//! simulation itself can fail.

use thiserror::Error;

/// Rejected game options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("play field {width}x{height} is too small; both sides must exceed {min} pixels")]
    FieldTooSmall { width: u32, height: u32, min: u32 },
    #[error("{requested} enemies requested but at most {max} can be drawn")]
    TooManyEnemies { requested: usize, max: usize },
    #[error("{which} radius {value} must be finite and positive")]
    InvalidRadius { which: &'static str, value: f32 },
    #[error("invalid options JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot read options file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while bringing up the GPU renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create canvas surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
}
