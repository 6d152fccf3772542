// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the frame pipeline

use crate::media::FrameDimensions;
use std::fmt;

/// Result type alias using PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while decoding, filtering or uploading a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Raw buffer length does not match the layout expected for its dimensions
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Frame processing requested before `init` or after `release`
    UninitializedPipeline,
    /// GPU operation issued off the thread owning the rendering context
    ContextAffinityViolation,
    /// Frame dimensions differ from the dimensions fixed at initialization.
    /// `actual` is the (width, height) pair as received, which may itself be invalid.
    DimensionMismatch {
        expected: FrameDimensions,
        actual: (u32, u32),
    },
    /// Zero, negative or odd frame dimensions
    InvalidDimensions { width: i64, height: i64 },
    /// Unknown processing mode value received at the boundary
    InvalidMode(i32),
    /// Adapter/device acquisition or readback failure
    Gpu(String),
    /// Malformed pipeline configuration
    Config(String),
}

impl PipelineError {
    /// Fatal errors indicate a threading contract violation by the host and
    /// must not be swallowed into a failure sentinel.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::ContextAffinityViolation)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::BufferSizeMismatch { expected, actual } => write!(
                f,
                "Buffer size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            PipelineError::UninitializedPipeline => write!(f, "Pipeline is not initialized"),
            PipelineError::ContextAffinityViolation => write!(
                f,
                "GPU operation invoked off the thread owning the rendering context"
            ),
            PipelineError::DimensionMismatch { expected, actual } => write!(
                f,
                "Dimension mismatch: expected {}, got {}x{}",
                expected, actual.0, actual.1
            ),
            PipelineError::InvalidDimensions { width, height } => {
                write!(f, "Invalid frame dimensions: {}x{}", width, height)
            }
            PipelineError::InvalidMode(mode) => write!(f, "Invalid processing mode: {}", mode),
            PipelineError::Gpu(msg) => write!(f, "GPU error: {}", msg),
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<wgpu::RequestAdapterError> for PipelineError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        PipelineError::Gpu(format!("Failed to find suitable GPU adapter: {}", err))
    }
}

impl From<wgpu::RequestDeviceError> for PipelineError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        PipelineError::Gpu(format!("Failed to create GPU device: {}", err))
    }
}

impl From<wgpu::BufferAsyncError> for PipelineError {
    fn from(err: wgpu::BufferAsyncError) -> Self {
        PipelineError::Gpu(format!("Failed to map buffer: {}", err))
    }
}
