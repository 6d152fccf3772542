// SPDX-License-Identifier: GPL-3.0-only

//! Frame buffers and CPU-side image processing
//!
//! Camera frames arrive as two-plane YUV 4:2:0 (NV21 by default), which must be
//! converted to RGBA before they can be uploaded to a texture:
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌───────────────┐
//! │  RawFrame    │ ──▶ │  decoder      │ ──▶ │  ColorBuffer  │
//! │  (NV21/NV12) │     │  YUV→RGBA     │     │  (RGBA8)      │
//! └──────────────┘     └───────────────┘     └───────┬───────┘
//!                                                    │ EdgeDetect
//!                                            ┌───────▼───────┐
//!                                            │  edge_filter  │
//!                                            │  Canny        │
//!                                            └───────────────┘
//! ```
//!
//! Both stages are pure functions and never touch the GPU.

pub mod decoder;
pub mod edge_filter;
pub mod frame;

pub use decoder::decode_frame;
pub use edge_filter::{EdgeThresholds, detect_edges};
pub use frame::{ChromaOrder, ColorBuffer, FrameDimensions, FrameLayout, RawFrame};
