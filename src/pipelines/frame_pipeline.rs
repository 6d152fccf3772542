// SPDX-License-Identifier: GPL-3.0-only

//! Frame pipeline lifecycle and per-frame routing
//!
//! States: `Uninitialized → Initialized → Released`. Dimensions are fixed by
//! the first `init` and the texture is only allocated by the first upload.

use super::stats::PipelineStats;
use crate::config::PipelineConfig;
use crate::constants::ProcessingMode;
use crate::errors::{PipelineError, PipelineResult};
use crate::gpu::{RenderContext, TextureHandle, TextureResource};
use crate::media::{self, FrameDimensions, RawFrame};
use tracing::{debug, info, trace, warn};

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Initialized,
    Released,
}

enum Lifecycle<T> {
    Uninitialized,
    Initialized {
        dimensions: FrameDimensions,
        texture: T,
    },
    Released,
}

/// Decodes, optionally edge-filters and uploads camera frames into one texture
pub struct FramePipeline<C: RenderContext> {
    context: C,
    config: PipelineConfig,
    lifecycle: Lifecycle<C::Texture>,
    stats: PipelineStats,
}

impl<C: RenderContext> FramePipeline<C> {
    pub fn new(context: C, config: PipelineConfig) -> Self {
        Self {
            context,
            config,
            lifecycle: Lifecycle::Uninitialized,
            stats: PipelineStats::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        match self.lifecycle {
            Lifecycle::Uninitialized => PipelineState::Uninitialized,
            Lifecycle::Initialized { .. } => PipelineState::Initialized,
            Lifecycle::Released => PipelineState::Released,
        }
    }

    /// Dimensions fixed at initialization
    pub fn dimensions(&self) -> Option<FrameDimensions> {
        match &self.lifecycle {
            Lifecycle::Initialized { dimensions, .. } => Some(*dimensions),
            _ => None,
        }
    }

    /// The owned texture, while initialized
    pub fn texture(&self) -> Option<&C::Texture> {
        match &self.lifecycle {
            Lifecycle::Initialized { texture, .. } => Some(texture),
            _ => None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Fix the frame dimensions. The texture itself is allocated on first upload.
    ///
    /// A second call while initialized is ignored, even with other dimensions.
    /// After `release` this starts a fresh lifecycle.
    pub fn init(&mut self, width: u32, height: u32) -> PipelineResult<()> {
        if let Lifecycle::Initialized { dimensions, .. } = &self.lifecycle {
            if dimensions.width() != width || dimensions.height() != height {
                warn!(
                    current = %dimensions,
                    requested_width = width,
                    requested_height = height,
                    "Pipeline already initialized, keeping initial dimensions"
                );
            }
            return Ok(());
        }

        let dimensions = FrameDimensions::new(width, height)?;
        let texture = self
            .context
            .create_texture(dimensions, &self.config.texture_label);

        info!(
            %dimensions,
            chroma_order = ?self.config.chroma_order,
            "Frame pipeline initialized"
        );

        self.lifecycle = Lifecycle::Initialized {
            dimensions,
            texture,
        };
        self.stats = PipelineStats::default();
        Ok(())
    }

    /// Run one frame through decode, optional edge detection and upload.
    ///
    /// On failure the texture keeps the last successfully uploaded frame.
    /// `timestamp_ns` is recorded in the statistics only.
    pub fn process_frame(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        mode: ProcessingMode,
        timestamp_ns: i64,
    ) -> PipelineResult<TextureHandle> {
        match self.run_frame(data, width, height, mode) {
            Ok(handle) => {
                self.stats.frames_processed += 1;
                self.stats.last_timestamp_ns = Some(timestamp_ns);
                if let Some(fps) = self.stats.fps.record(timestamp_ns) {
                    debug!(fps, "Frame rate");
                }
                trace!(%handle, ?mode, timestamp_ns, "Frame uploaded");
                Ok(handle)
            }
            Err(err) => {
                self.stats.frames_failed += 1;
                warn!(error = %err, ?mode, timestamp_ns, "Frame dropped");
                Err(err)
            }
        }
    }

    fn run_frame(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        mode: ProcessingMode,
    ) -> PipelineResult<TextureHandle> {
        let Lifecycle::Initialized {
            dimensions,
            texture,
        } = &mut self.lifecycle
        else {
            return Err(PipelineError::UninitializedPipeline);
        };

        if dimensions.width() != width || dimensions.height() != height {
            return Err(PipelineError::DimensionMismatch {
                expected: *dimensions,
                actual: (width, height),
            });
        }

        let raw = RawFrame::new(data, *dimensions, self.config.chroma_order);
        let mut color = media::decode_frame(&raw, self.config.allow_luma_only)?;

        if mode == ProcessingMode::EdgeDetect {
            color = media::detect_edges(&color, self.config.edge_thresholds);
        }

        texture.ensure_allocated()?;
        texture.upload(&color)
    }

    /// Release the texture. No-op unless initialized.
    pub fn release(&mut self) -> PipelineResult<()> {
        if let Lifecycle::Initialized { texture, .. } = &mut self.lifecycle {
            texture.release()?;
            info!(
                frames_processed = self.stats.frames_processed,
                frames_failed = self.stats.frames_failed,
                "Frame pipeline released"
            );
            self.lifecycle = Lifecycle::Released;
        }
        Ok(())
    }
}
