// SPDX-License-Identifier: GPL-3.0-only

//! CPU-backed texture with the same contract as a GPU texture.
//!
//! Keeps the last uploaded pixels so callers can inspect what a renderer
//! would sample.

use super::{ContextThread, RenderContext, TextureHandle, TextureResource};
use crate::errors::{PipelineError, PipelineResult};
use crate::media::{ColorBuffer, FrameDimensions};
use tracing::debug;

/// Rendering context without a GPU, bound to the thread that created it
#[derive(Debug, Clone, Copy)]
pub struct HeadlessContext {
    thread: ContextThread,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self {
            thread: ContextThread::current(),
        }
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for HeadlessContext {
    type Texture = HeadlessTexture;

    fn create_texture(&self, dimensions: FrameDimensions, label: &str) -> HeadlessTexture {
        HeadlessTexture {
            label: label.to_string(),
            dimensions,
            thread: self.thread,
            allocation: None,
            upload_count: 0,
        }
    }
}

#[derive(Debug)]
struct Allocation {
    handle: TextureHandle,
    pixels: Vec<u8>,
}

#[derive(Debug)]
pub struct HeadlessTexture {
    label: String,
    dimensions: FrameDimensions,
    thread: ContextThread,
    allocation: Option<Allocation>,
    upload_count: u64,
}

impl HeadlessTexture {
    /// Current texture contents, if allocated
    pub fn contents(&self) -> Option<ColorBuffer> {
        let allocation = self.allocation.as_ref()?;
        ColorBuffer::from_vec(self.dimensions, allocation.pixels.clone()).ok()
    }

    pub fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    /// Number of uploads since creation
    pub fn upload_count(&self) -> u64 {
        self.upload_count
    }
}

impl TextureResource for HeadlessTexture {
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

        let handle = TextureHandle::next();
        debug!(
            label = %self.label,
            %handle,
            dimensions = %self.dimensions,
            "Allocating headless texture"
        );
        self.allocation = Some(Allocation {
            handle,
            pixels: vec![0; self.dimensions.rgba_len()],
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
        if let Some(allocation) = self.allocation.as_mut() {
            allocation.pixels.copy_from_slice(frame.as_bytes());
        }
        self.upload_count += 1;
        Ok(handle)
    }

    fn release(&mut self) -> PipelineResult<()> {
        self.thread.ensure_current("release")?;

        if let Some(allocation) = self.allocation.take() {
            debug!(label = %self.label, handle = %allocation.handle, "Released headless texture");
        }
        Ok(())
    }
}
