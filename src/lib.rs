// SPDX-License-Identifier: GPL-3.0-only

//! Edge Viewer - camera frame processing for live preview
//!
//! Takes raw two-plane YUV 4:2:0 camera frames, converts them to RGBA,
//! optionally replaces them with a Canny edge map, and uploads the result
//! into a GPU texture the host renders from.
//!
//! # Architecture
//!
//! - [`media`]: Frame buffers, YUV→RGBA decoding and edge detection (pure CPU)
//! - [`gpu`]: Texture resources (wgpu or headless) and rendering context affinity
//! - [`pipelines`]: The frame pipeline lifecycle tying the stages together
//! - [`bridge`]: Primitive-typed entry points for the host's native layer
//! - [`config`]: Pipeline configuration
//!
//! # Example
//!
//! ```
//! use edge_viewer::{FrameBridge, HeadlessContext, PipelineConfig};
//!
//! let mut bridge = FrameBridge::new(HeadlessContext::new(), PipelineConfig::default());
//! bridge.init(4, 4);
//! let handle = bridge.process_frame(&[128; 24], 4, 4, 0, 1);
//! assert_ne!(handle, 0);
//! bridge.release();
//! ```

pub mod bridge;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gpu;
pub mod media;
pub mod pipelines;

// Re-export commonly used types
pub use bridge::FrameBridge;
pub use config::PipelineConfig;
pub use constants::ProcessingMode;
pub use errors::{PipelineError, PipelineResult};
pub use gpu::{HeadlessContext, RenderContext, TextureHandle, TextureResource, WgpuContext};
pub use media::{ColorBuffer, FrameDimensions};
pub use pipelines::{FramePipeline, PipelineState};
