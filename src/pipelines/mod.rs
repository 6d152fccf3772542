// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame processing pipeline
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │ Camera Frame │ ──▶ │  FramePipeline    │ ──▶ │  Frame texture   │
//! │   (NV21)     │     │  - YUV→RGBA       │     │  (RGBA8, reused) │
//! │              │     │  - Canny (opt.)   │     │                  │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//! ```
//!
//! Everything runs synchronously on the caller's thread, which must be the
//! thread owning the rendering context.

pub mod frame_pipeline;
pub mod stats;

pub use frame_pipeline::{FramePipeline, PipelineState};
pub use stats::{FpsCounter, PipelineStats};
