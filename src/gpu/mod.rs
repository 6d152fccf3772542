// SPDX-License-Identifier: GPL-3.0-only

//! GPU texture management for processed frames.
//!
//! The pipeline only talks to the GPU through [`TextureResource`], created by a
//! [`RenderContext`]. Two implementations exist:
//!
//! - [`texture::WgpuContext`]: real textures on a wgpu device
//! - [`headless::HeadlessContext`]: CPU-backed stand-in with the same lifecycle
//!   and thread-affinity rules, for tests and hosts without a GPU

pub mod affinity;
pub mod headless;
pub mod texture;

use crate::errors::PipelineResult;
use crate::media::{ColorBuffer, FrameDimensions};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

pub use affinity::ContextThread;
pub use headless::{HeadlessContext, HeadlessTexture};
pub use texture::{WgpuContext, WgpuTexture};

/// Texture format of every frame texture
pub const FRAME_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Opaque, non-zero identifier of an allocated frame texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(NonZeroU32);

static NEXT_TEXTURE_HANDLE: AtomicU32 = AtomicU32::new(1);

impl TextureHandle {
    /// Allocate a fresh handle, unique for the lifetime of the process
    pub(crate) fn next() -> Self {
        loop {
            let raw = NEXT_TEXTURE_HANDLE.fetch_add(1, Ordering::Relaxed);
            if let Some(id) = NonZeroU32::new(raw) {
                return Self(id);
            }
        }
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Value handed across the native boundary (never the failure sentinel)
    pub fn as_raw(&self) -> i32 {
        (self.0.get() & i32::MAX as u32).max(1) as i32
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fixed-size RGBA texture owned by one pipeline
pub trait TextureResource {
    /// Dimensions fixed at creation
    fn dimensions(&self) -> FrameDimensions;

    /// Handle of the allocated texture, if any
    fn handle(&self) -> Option<TextureHandle>;

    /// Allocate the texture if it does not exist yet. Contents are undefined
    /// after allocation. Idempotent.
    fn ensure_allocated(&mut self) -> PipelineResult<TextureHandle>;

    /// Replace the entire texture contents with `frame`.
    ///
    /// `frame` must have exactly the texture's dimensions.
    fn upload(&mut self, frame: &ColorBuffer) -> PipelineResult<TextureHandle>;

    /// Free the texture. No-op when nothing is allocated.
    fn release(&mut self) -> PipelineResult<()>;
}

/// The rendering context textures are created in
pub trait RenderContext {
    type Texture: TextureResource;

    /// Create an unallocated texture bound to this context's thread
    fn create_texture(&self, dimensions: FrameDimensions, label: &str) -> Self::Texture;
}

/// Information about the created GPU device
#[derive(Debug, Clone)]
pub struct GpuDeviceInfo {
    /// Name of the GPU adapter
    pub adapter_name: String,
    /// Backend being used (Vulkan, Metal, DX12, etc.)
    pub backend: wgpu::Backend,
}

/// Create a wgpu device and queue for frame textures.
///
/// # Arguments
///
/// * `label` - A label for the device (for debugging)
pub async fn create_render_device(
    label: &str,
) -> PipelineResult<(Arc<wgpu::Device>, Arc<wgpu::Queue>, GpuDeviceInfo)> {
    info!(label = label, "Creating GPU device for frame textures");

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;

    let adapter_info = adapter.get_info();

    info!(
        adapter = %adapter_info.name,
        backend = ?adapter_info.backend,
        "GPU adapter selected"
    );

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        })
        .await?;

    debug!(label = label, "GPU device created");

    let info = GpuDeviceInfo {
        adapter_name: adapter_info.name.clone(),
        backend: adapter_info.backend,
    };

    Ok((Arc::new(device), Arc::new(queue), info))
}
