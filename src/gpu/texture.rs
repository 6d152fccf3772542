// SPDX-License-Identifier: GPL-3.0-only

//! Frame texture on a wgpu device
//!
//! The texture is allocated on first use and then overwritten in place with
//! `Queue::write_texture` for every frame. There is no double buffering: a
//! renderer sampling the texture while an upload is queued may observe either
//! frame.

use super::{
    ContextThread, FRAME_TEXTURE_FORMAT, GpuDeviceInfo, RenderContext, TextureHandle,
    TextureResource, create_render_device,
};
use crate::constants::RGBA_BYTES_PER_PIXEL;
use crate::errors::{PipelineError, PipelineResult};
use crate::media::{ColorBuffer, FrameDimensions};
use std::sync::Arc;
use tracing::{debug, info};

/// wgpu device and queue, bound to the thread that owns the rendering context
#[derive(Clone)]
pub struct WgpuContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    thread: ContextThread,
}

impl WgpuContext {
    /// Wrap a device/queue pair owned by the host renderer.
    ///
    /// Must be called on the rendering thread; that thread becomes the only
    /// one allowed to touch textures created from this context.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            thread: ContextThread::current(),
        }
    }

    /// Create a dedicated device and bind it to the calling thread
    pub fn new_blocking(label: &str) -> PipelineResult<(Self, GpuDeviceInfo)> {
        let (device, queue, info) = pollster::block_on(create_render_device(label))?;
        Ok((Self::new(device, queue), info))
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

impl RenderContext for WgpuContext {
    type Texture = WgpuTexture;

    fn create_texture(&self, dimensions: FrameDimensions, label: &str) -> WgpuTexture {
        WgpuTexture {
            device: Arc::clone(&self.device),
            queue: Arc::clone(&self.queue),
            thread: self.thread,
            label: label.to_string(),
            dimensions,
            allocation: None,
        }
    }
}

struct Allocation {
    handle: TextureHandle,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Fixed-size RGBA8 texture, allocated lazily
pub struct WgpuTexture {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    thread: ContextThread,
    label: String,
    dimensions: FrameDimensions,
    allocation: Option<Allocation>,
}

impl WgpuTexture {
    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.dimensions.width(),
            height: self.dimensions.height(),
            depth_or_array_layers: 1,
        }
    }

    /// Texture for binding in the host's render pass
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.allocation.as_ref().map(|a| &a.texture)
    }

    pub fn view(&self) -> Option<&wgpu::TextureView> {
        self.allocation.as_ref().map(|a| &a.view)
    }

    /// Linear-filtered sampler matching the texture
    pub fn sampler(&self) -> Option<&wgpu::Sampler> {
        self.allocation.as_ref().map(|a| &a.sampler)
    }

    /// Copy the texture back to the CPU.
    ///
    /// Blocks on the device until the copy completes; meant for diagnostics and
    /// tests, not the per-frame path.
    pub async fn read_back(&self) -> PipelineResult<ColorBuffer> {
        self.thread.ensure_current("read_back")?;
        let allocation = self
            .allocation
            .as_ref()
            .ok_or(PipelineError::UninitializedPipeline)?;

        let width = self.dimensions.width();
        let height = self.dimensions.height();
        let unpadded_bytes_per_row = width * RGBA_BYTES_PER_PIXEL as u32;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_readback_buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &allocation.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: None,
                },
            },
            self.extent(),
        );
        self.queue.submit(Some(encoder.finish()));

        let padded = read_buffer_async(&self.device, &staging_buffer).await?;

        // Strip row padding
        let mut rgba = Vec::with_capacity(self.dimensions.rgba_len());
        for row in 0..height as usize {
            let start = row * padded_bytes_per_row as usize;
            rgba.extend_from_slice(&padded[start..start + unpadded_bytes_per_row as usize]);
        }

        ColorBuffer::from_vec(self.dimensions, rgba)
    }
}

impl TextureResource for WgpuTexture {
    fn dimensions(&self) -> FrameDimensions {
        self.dimensions
    }

    fn handle(&self) -> Option<TextureHandle> {
        self.allocation.as_ref().map(|a| a.handle)
    }

    fn ensure_allocated(&mut self) -> PipelineResult<TextureHandle> {
        self.thread.ensure_current("ensure_allocated")?;

        if let Some(allocation) = &self.allocation {
            return Ok(allocation.handle);
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size: self.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("frame_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let handle = TextureHandle::next();
        info!(
            label = %self.label,
            %handle,
            dimensions = %self.dimensions,
            "Allocated frame texture"
        );

        self.allocation = Some(Allocation {
            handle,
            texture,
            view,
            sampler,
        });
        Ok(handle)
    }

    fn upload(&mut self, frame: &ColorBuffer) -> PipelineResult<TextureHandle> {
        self.thread.ensure_current("upload")?;

        if frame.dimensions() != self.dimensions {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dimensions,
                actual: (frame.width(), frame.height()),
            });
        }

        let handle = self.ensure_allocated()?;
        let Some(allocation) = self.allocation.as_ref() else {
            return Err(PipelineError::UninitializedPipeline);
        };

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &allocation.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.dimensions.width() * RGBA_BYTES_PER_PIXEL as u32),
                rows_per_image: Some(self.dimensions.height()),
            },
            self.extent(),
        );

        Ok(handle)
    }

    fn release(&mut self) -> PipelineResult<()> {
        self.thread.ensure_current("release")?;

        if let Some(allocation) = self.allocation.take() {
            allocation.texture.destroy();
            debug!(label = %self.label, handle = %allocation.handle, "Destroyed frame texture");
        }
        Ok(())
    }
}

/// Map a MAP_READ buffer, wait for the device and copy its contents out
async fn read_buffer_async(device: &wgpu::Device, buffer: &wgpu::Buffer) -> PipelineResult<Vec<u8>> {
    let slice = buffer.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();

    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| PipelineError::Gpu(format!("Device poll failed: {:?}", e)))?;

    receiver
        .await
        .map_err(|_| PipelineError::Gpu("Failed to receive buffer mapping".to_string()))??;

    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Option<WgpuContext> {
        // These tests require a GPU, so they may be skipped in CI
        match WgpuContext::new_blocking("texture_test") {
            Ok((ctx, _)) => Some(ctx),
            Err(e) => {
                println!("Skipping test (no GPU): {}", e);
                None
            }
        }
    }

    #[tokio::test]
    async fn test_upload_and_read_back() {
        let Some(ctx) = context() else { return };
        let dims = FrameDimensions::new(70, 4).unwrap();
        let mut texture = ctx.create_texture(dims, "test");
        assert!(texture.handle().is_none());

        let frame = ColorBuffer::filled(dims, [10, 20, 30, 255]);
        let handle = texture.upload(&frame).unwrap();
        assert_eq!(texture.handle(), Some(handle));

        let back = texture.read_back().await.unwrap();
        assert_eq!(back, frame);

        texture.release().unwrap();
        assert!(texture.handle().is_none());
        texture.release().unwrap();
    }

    #[tokio::test]
    async fn test_upload_keeps_handle() {
        let Some(ctx) = context() else { return };
        let dims = FrameDimensions::new(4, 4).unwrap();
        let mut texture = ctx.create_texture(dims, "test");
        assert!(texture.view().is_none());

        let first = texture.ensure_allocated().unwrap();
        assert!(texture.texture().is_some());
        assert!(texture.view().is_some());
        assert!(texture.sampler().is_some());
        let second = texture
            .upload(&ColorBuffer::filled(dims, [0, 0, 0, 255]))
            .unwrap();
        assert_eq!(first, second);
    }
}
