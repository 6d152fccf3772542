// SPDX-License-Identifier: GPL-3.0-only

//! Primitive-typed entry points for the host application.
//!
//! The host's native layer owns one [`FrameBridge`] and forwards its three
//! calls here after marshaling the Java/Kotlin values. Everything arriving
//! from the host is validated before it reaches the pipeline.

use crate::config::PipelineConfig;
use crate::constants::{FAILURE_HANDLE, ProcessingMode};
use crate::errors::{PipelineError, PipelineResult};
use crate::gpu::{RenderContext, TextureHandle};
use crate::media::FrameDimensions;
use crate::pipelines::FramePipeline;
use tracing::{error, warn};

pub struct FrameBridge<C: RenderContext> {
    pipeline: FramePipeline<C>,
    last_error: Option<PipelineError>,
}

impl<C: RenderContext> FrameBridge<C> {
    pub fn new(context: C, config: PipelineConfig) -> Self {
        Self {
            pipeline: FramePipeline::new(context, config),
            last_error: None,
        }
    }

    pub fn pipeline(&self) -> &FramePipeline<C> {
        &self.pipeline
    }

    /// Error behind the most recent failure sentinel
    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    /// Fix the frame dimensions. Invalid dimensions are logged and ignored,
    /// leaving the pipeline uninitialized.
    pub fn init(&mut self, width: i32, height: i32) {
        let result = FrameDimensions::from_raw(width, height)
            .and_then(|dims| self.pipeline.init(dims.width(), dims.height()));
        self.record(result);
    }

    /// Process one frame. Returns the texture handle, or `FAILURE_HANDLE`.
    ///
    /// # Panics
    ///
    /// Panics when called off the rendering context thread. That is a
    /// threading bug in the host, not a per-frame failure.
    pub fn process_frame(
        &mut self,
        buffer: &[u8],
        width: i32,
        height: i32,
        timestamp_ns: i64,
        mode: i32,
    ) -> i32 {
        let result = self.ingest(buffer, width, height, timestamp_ns, mode);
        self.record(result).map_or(FAILURE_HANDLE, |handle| handle.as_raw())
    }

    fn ingest(
        &mut self,
        buffer: &[u8],
        width: i32,
        height: i32,
        timestamp_ns: i64,
        mode: i32,
    ) -> PipelineResult<TextureHandle> {
        let mode = ProcessingMode::from_raw(mode).ok_or(PipelineError::InvalidMode(mode))?;
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(PipelineError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        };
        self.pipeline
            .process_frame(buffer, width, height, mode, timestamp_ns)
    }

    /// Release the texture. Safe to call repeatedly.
    ///
    /// # Panics
    ///
    /// Panics when called off the rendering context thread.
    pub fn release(&mut self) {
        let result = self.pipeline.release();
        self.record(result);
    }

    fn record<T>(&mut self, result: PipelineResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) if err.is_fatal() => {
                error!(error = %err, "Fatal pipeline usage error");
                panic!("{}", err);
            }
            Err(err) => {
                warn!(error = %err, "Pipeline call failed");
                self.last_error = Some(err);
                None
            }
        }
    }
}
